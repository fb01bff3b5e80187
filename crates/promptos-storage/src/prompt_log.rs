//! The prompt log: every executed prompt with the result it produced.
//!
//! Backed by one SQLite connection. Entries are append-only and read back
//! newest first.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use uuid::Uuid;

use promptos_core::error::PromptosError;
use promptos_core::types::CommandResult;

use crate::migrations;

/// Status stored for every logged prompt.
pub const STATUS_EXECUTED: &str = "executed";

/// One row of the prompt log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptLogEntry {
    pub id: Uuid,
    pub prompt: String,
    pub result: CommandResult,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Map a rusqlite failure to a storage error with some context.
fn sql(context: &'static str) -> impl Fn(rusqlite::Error) -> PromptosError {
    move |e| PromptosError::Storage(format!("{}: {}", context, e))
}

/// SQLite-backed prompt log.
pub struct PromptLog {
    conn: Mutex<Connection>,
}

impl PromptLog {
    /// Open the log file at `path`, creating it and its directory on first
    /// use.
    pub fn open(path: &Path) -> Result<Self, PromptosError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(sql("Failed to open prompt log"))?;
        // Readers (`/logs`) never wait on the writer.
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(sql("Failed to enable WAL"))?;
        tracing::info!(path = %path.display(), journal_mode = %mode, "Prompt log opened");
        Self::from_connection(conn)
    }

    /// A log that lives only as long as the value.
    pub fn in_memory() -> Result<Self, PromptosError> {
        let conn = Connection::open_in_memory().map_err(sql("Failed to open prompt log"))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PromptosError> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PromptosError> {
        self.conn
            .lock()
            .map_err(|_| PromptosError::Storage("Prompt log lock poisoned".to_string()))
    }

    /// Append a prompt and its result.
    pub fn insert(
        &self,
        prompt: &str,
        result: &CommandResult,
    ) -> Result<PromptLogEntry, PromptosError> {
        let entry = PromptLogEntry {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            result: result.clone(),
            status: STATUS_EXECUTED.to_string(),
            created_at: Utc::now(),
        };

        self.conn()?
            .execute(
                "INSERT INTO prompt_logs (id, prompt, success, message, speak, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.id.to_string(),
                    entry.prompt,
                    entry.result.success,
                    entry.result.message,
                    entry.result.speak,
                    entry.status,
                    entry.created_at.timestamp_millis(),
                ],
            )
            .map_err(sql("Failed to log prompt"))?;

        tracing::debug!(id = %entry.id, success = entry.result.success, "Prompt logged");
        Ok(entry)
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: u64) -> Result<Vec<PromptLogEntry>, PromptosError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, prompt, success, message, speak, status, created_at
                 FROM prompt_logs
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1",
            )
            .map_err(sql("Failed to read prompt log"))?;

        let rows = stmt
            .query_map(params![limit as i64], read_row)
            .map_err(sql("Failed to read prompt log"))?;

        let entries: Result<Vec<_>, _> = rows
            .map(|row| row.map_err(sql("Corrupt prompt log row"))?)
            .collect();
        entries
    }

    /// Number of prompts ever logged.
    pub fn count(&self) -> Result<u64, PromptosError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM prompt_logs", [], |row| row.get(0))
            .map_err(sql("Failed to count prompt log"))?;
        Ok(count as u64)
    }
}

impl std::fmt::Debug for PromptLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptLog").finish_non_exhaustive()
    }
}

/// Decode one row; column errors surface through rusqlite, value errors as
/// storage errors.
fn read_row(row: &Row<'_>) -> rusqlite::Result<Result<PromptLogEntry, PromptosError>> {
    let id: String = row.get(0)?;
    let millis: i64 = row.get(6)?;
    let result = CommandResult {
        success: row.get(2)?,
        message: row.get(3)?,
        speak: row.get(4)?,
    };
    let prompt: String = row.get(1)?;
    let status: String = row.get(5)?;

    let entry = Uuid::parse_str(&id)
        .map_err(|e| PromptosError::Storage(format!("Invalid entry id {}: {}", id, e)))
        .and_then(|id| {
            let created_at = Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| PromptosError::Storage(format!("Invalid timestamp: {}", millis)))?;
            Ok(PromptLogEntry {
                id,
                prompt,
                result,
                status,
                created_at,
            })
        });
    Ok(entry)
}
