//! Core types and the time-accounting engine for Timbro.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage is reached through the [`store::TimesheetStore`] trait; every
//! computation in [`minutes`], [`merge`] and [`summary`] is pure.

// Native `async fn` in traits; the returned futures are `Send` by signature.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod day;
pub mod error;
pub mod export;
pub mod merge;
pub mod minutes;
pub mod reference;
pub mod service;
pub mod store;
pub mod summary;
pub mod ticket;

pub use error::{Error, Result};
