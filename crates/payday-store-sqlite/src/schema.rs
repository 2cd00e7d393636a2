//! SQL schema for the Payday SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Rows are never physically removed on the normal mutation path;
/// `deleted_at` is the only deletion marker. `version` columns back the
/// optimistic-concurrency check on updates.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    employee_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    deleted_at  TEXT             -- ISO 8601 UTC or NULL
);

CREATE TABLE IF NOT EXISTS companies (
    company_id   TEXT PRIMARY KEY,
    company_name TEXT NOT NULL,
    deleted_at   TEXT,
    version      INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS contracts (
    contract_id TEXT PRIMARY KEY,
    job         TEXT NOT NULL,
    start_date  TEXT NOT NULL,   -- ISO 8601 date
    end_date    TEXT,            -- ISO 8601 date or NULL (open-ended)
    employee_id TEXT NOT NULL REFERENCES employees(employee_id),
    company_id  TEXT NOT NULL REFERENCES companies(company_id),
    created_at  TEXT NOT NULL,
    deleted_at  TEXT,
    version     INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS contracts_deleted_idx ON contracts(deleted_at);
CREATE INDEX IF NOT EXISTS contracts_company_idx ON contracts(company_id);
CREATE INDEX IF NOT EXISTS contracts_start_idx   ON contracts(start_date);

PRAGMA user_version = 1;
";
