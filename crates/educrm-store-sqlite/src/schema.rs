//! SQL schema for the EduCRM SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS prospects (
    prospect_id     TEXT PRIMARY KEY,
    student_name    TEXT NOT NULL,
    grade           TEXT NOT NULL,
    parent_name     TEXT NOT NULL,
    phone           TEXT NOT NULL,
    email           TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'Lead',
    observation     TEXT,
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at      TEXT NOT NULL,
    last_contact_ms INTEGER          -- epoch milliseconds of last status change
);

CREATE TABLE IF NOT EXISTS class_sections (
    section_id     TEXT PRIMARY KEY,
    series         TEXT NOT NULL,
    label          TEXT NOT NULL,
    enrolled_count INTEGER NOT NULL DEFAULT 0 CHECK (enrolled_count >= 0),
    total_seats    INTEGER NOT NULL,
    period         TEXT              -- 'Manhã' | 'Tarde' | NULL
);

-- Strictly append-only (see triggers below). Entries outlive deleted
-- prospects, so prospect_id is not a foreign key.
CREATE TABLE IF NOT EXISTS status_history (
    entry_id        TEXT PRIMARY KEY,
    prospect_id     TEXT NOT NULL,
    previous_status TEXT,
    new_status      TEXT NOT NULL,
    changed_at      TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS status_history_no_update
BEFORE UPDATE ON status_history
BEGIN
    SELECT RAISE(ABORT, 'status_history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS status_history_no_delete
BEFORE DELETE ON status_history
BEGIN
    SELECT RAISE(ABORT, 'status_history is append-only');
END;

CREATE INDEX IF NOT EXISTS prospects_created_idx ON prospects(created_at);
CREATE INDEX IF NOT EXISTS history_prospect_idx  ON status_history(prospect_id, changed_at);
CREATE INDEX IF NOT EXISTS sections_order_idx    ON class_sections(series, label);

PRAGMA user_version = 1;
";
