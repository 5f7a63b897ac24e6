//! SQL schema for the registro SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never deleted; deleted_at is the soft-delete tombstone.
CREATE TABLE IF NOT EXISTS persons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT    NOT NULL CHECK (kind IN ('natural', 'juridical')),
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT    NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS natural_person_details (
    person_id         INTEGER NOT NULL UNIQUE REFERENCES persons(id),
    curp              TEXT    NOT NULL UNIQUE,
    rfc               TEXT    NOT NULL,
    name              TEXT    NOT NULL,
    first_last_name   TEXT    NOT NULL,
    second_last_name  TEXT,
    date_of_birth     TEXT,              -- YYYY-MM-DD
    created_at        TEXT    NOT NULL,
    full_name         TEXT    NOT NULL,  -- upper-cased name parts; written by the store
    name_folded       TEXT    NOT NULL   -- lower-cased name, matched by the name filter
);

CREATE TABLE IF NOT EXISTS juridical_person_details (
    person_id           INTEGER NOT NULL UNIQUE REFERENCES persons(id),
    rfc                 TEXT    NOT NULL,
    legal_name          TEXT    NOT NULL,
    incorporation_date  TEXT,            -- YYYY-MM-DD
    created_at          TEXT    NOT NULL,
    legal_name_folded   TEXT    NOT NULL
);

-- Every person read except the delete path goes through this view.
CREATE VIEW IF NOT EXISTS live_persons AS
    SELECT * FROM persons WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT    NOT NULL UNIQUE,
    email       TEXT    NOT NULL UNIQUE,
    name        TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS roles (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL UNIQUE,
    description  TEXT,
    permissions  TEXT    NOT NULL DEFAULT '[]',   -- JSON array of permission names
    created_at   TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_kind_idx   ON persons(kind);
CREATE INDEX IF NOT EXISTS persons_active_idx ON persons(active);

PRAGMA user_version = 1;
";
