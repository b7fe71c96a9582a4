//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS habits (
    habit_id        TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    description     TEXT,
    emoji           TEXT,
    frequency       TEXT NOT NULL DEFAULT '{\"kind\":\"daily\"}',
    reminder_time   TEXT,            -- HH:MM or NULL
    current_streak  INTEGER NOT NULL DEFAULT 0,
    longest_streak  INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at      TEXT NOT NULL
);

-- One row per (habit, calendar day); the primary key is the invariant.
CREATE TABLE IF NOT EXISTS completions (
    habit_id      TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    day           TEXT NOT NULL,     -- YYYY-MM-DD in the reference zone
    note          TEXT,
    completed_at  TEXT,
    PRIMARY KEY (habit_id, day)
);

CREATE INDEX IF NOT EXISTS habits_created_idx ON habits(created_at);

PRAGMA user_version = 1;
";
