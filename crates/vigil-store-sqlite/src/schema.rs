//! SQL schema for the vigil SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS incidents (
    incident_id     TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    title           TEXT NOT NULL,
    status          INTEGER NOT NULL,            -- IncidentStatus wire value
    status_version  INTEGER NOT NULL DEFAULT 0,  -- optimistic-concurrency token
    detected_at     TEXT NOT NULL,               -- ISO 8601 UTC
    closed_at       TEXT                         -- set iff status is closed
);

-- Status changes are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS status_changes (
    record_id       TEXT PRIMARY KEY,
    incident_id     TEXT NOT NULL REFERENCES incidents(incident_id),
    actor_id        TEXT NOT NULL,
    recorded_at     TEXT NOT NULL,
    previous_status INTEGER NOT NULL,
    new_status      INTEGER NOT NULL,
    comment         TEXT
);

-- Latest-write-wins acknowledgement marks; one row per (incident, user).
CREATE TABLE IF NOT EXISTS seen_marks (
    incident_id     TEXT NOT NULL REFERENCES incidents(incident_id),
    user_id         TEXT NOT NULL,
    seen_at_version INTEGER NOT NULL,
    seen_at         TEXT NOT NULL,
    PRIMARY KEY (incident_id, user_id)
);

CREATE INDEX IF NOT EXISTS incidents_org_idx           ON incidents(organization_id);
CREATE INDEX IF NOT EXISTS status_changes_incident_idx ON status_changes(incident_id, recorded_at);

PRAGMA user_version = 1;
";
