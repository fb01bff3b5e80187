//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use promptos_core::error::PromptosError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), PromptosError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| PromptosError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| PromptosError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: prompt_logs");
    }

    Ok(())
}

/// Version 1: prompt log table.
fn apply_v1(conn: &Connection) -> Result<(), PromptosError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prompt_logs (
            id          TEXT PRIMARY KEY NOT NULL,
            prompt      TEXT NOT NULL,
            success     INTEGER NOT NULL CHECK (success IN (0, 1)),
            message     TEXT NOT NULL,
            speak       INTEGER NOT NULL DEFAULT 0,
            status      TEXT NOT NULL DEFAULT 'executed',
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_prompt_logs_created_at
            ON prompt_logs (created_at DESC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'prompt_logs');
        ",
    )
    .map_err(|e| PromptosError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}
