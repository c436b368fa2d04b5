//! Version-tracked schema migrations. Each migration runs inside its own transaction and
//! already-applied versions are skipped.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::errors::{LedgerError, Result};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "users, transactions, budgets",
    sql: include_str!("v001_schema.sql"),
}];

/// Applies all pending migrations and returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| migration_error(format!("failed to create schema_version table: {e}")))?;

    let current = current_version(conn)?;
    let mut applied = 0;
    for migration in MIGRATIONS {
        if migration.version <= current {
            debug!(version = migration.version, "migration already applied");
            continue;
        }
        info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        apply(conn, migration)?;
        applied += 1;
    }
    Ok(applied)
}

/// Highest applied migration version, or 0 if none.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_error(format!("failed to read schema_version: {e}")))
}

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| migration_error(format!("v{}: cannot begin: {e}", migration.version)))?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(format!("v{} failed: {e}", migration.version)))?;
    tx.execute(
        "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, datetime('now'), ?2)",
        params![migration.version, migration.description],
    )
    .map_err(|e| migration_error(format!("v{}: cannot record version: {e}", migration.version)))?;
    tx.commit()
        .map_err(|e| migration_error(format!("v{}: cannot commit: {e}", migration.version)))
}

fn migration_error(message: String) -> LedgerError {
    LedgerError::Migration { message }
}
