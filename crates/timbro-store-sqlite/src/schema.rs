//! SQL schema for the Timbro SQLite store.
//!
//! Every table holds one JSON document per key. Dates are `YYYY-MM-DD`
//! text, so lexical order is calendar order.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per employee and day (`dipendenti/{employee}/ore/{date}`).
CREATE TABLE IF NOT EXISTS day_records (
    employee_id TEXT NOT NULL,   -- display name with spaces replaced by '_'
    date        TEXT NOT NULL,
    document    TEXT NOT NULL,
    PRIMARY KEY (employee_id, date)
);

-- The `Data` collection: rosters, catalogs, apartment groups.
CREATE TABLE IF NOT EXISTS reference_data (
    doc_id   TEXT PRIMARY KEY,
    document TEXT NOT NULL
);

-- BnB tickets (`Bigliettini/{date}`), one row per BnB.
CREATE TABLE IF NOT EXISTS tickets (
    date     TEXT NOT NULL,
    bnb_key  TEXT NOT NULL,      -- BnB name with '.' replaced by '_'
    document TEXT NOT NULL,
    PRIMARY KEY (date, bnb_key)
);

PRAGMA user_version = 1;
";
