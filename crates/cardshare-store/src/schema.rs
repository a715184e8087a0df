//! SQL schema for the SQLite tier.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS entries (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,   -- JSON text written by the repository
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
