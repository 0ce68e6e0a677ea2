//! SQL schema for the vigil SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The two record kinds live in separate tables so listing one never has to
/// filter out the other. Timestamps are ISO 8601 UTC text.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Exactly one current-state row per tracked bundle identifier.
CREATE TABLE IF NOT EXISTS apps (
    bundle_id        TEXT PRIMARY KEY,
    catalog_id       INTEGER NOT NULL,
    name             TEXT NOT NULL,
    version          TEXT NOT NULL,
    release_date     TEXT NOT NULL,
    release_notes    TEXT NOT NULL,
    developer        TEXT NOT NULL,
    min_os_version   TEXT NOT NULL,
    file_size_bytes  INTEGER NOT NULL,
    price            REAL NOT NULL,
    currency         TEXT NOT NULL,
    last_checked     TEXT NOT NULL,
    first_discovered TEXT NOT NULL
);

-- Change history is strictly append-only.
-- No UPDATE is ever issued against this table; rows are deleted only
-- together with their app row, in a single transaction.
CREATE TABLE IF NOT EXISTS changes (
    change_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    bundle_id     TEXT NOT NULL,
    catalog_id    INTEGER NOT NULL,
    name          TEXT NOT NULL,
    old_version   TEXT NOT NULL,
    new_version   TEXT NOT NULL,
    detected_at   TEXT NOT NULL,
    release_notes TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS changes_bundle_idx   ON changes(bundle_id);
CREATE INDEX IF NOT EXISTS changes_detected_idx ON changes(detected_at);

PRAGMA user_version = 1;
";
