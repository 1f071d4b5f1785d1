use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::PathBuf;
use tokio::task;
use tracing::debug;

use super::{SessionState, SessionSummary, Storage};

/// SQLite-based session storage
pub struct SqliteStorage {
    /// Path to the SQLite database file
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new SQLite storage at the given path
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        // Create parent directories if they don't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let storage = Self { db_path };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Create storage using default location (~/.hooksmith/sessions.db)
    pub fn default_location() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        let db_path = PathBuf::from(home).join(".hooksmith").join("sessions.db");
        Self::new(db_path)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("failed to open database: {}", self.db_path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                agent TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                error TEXT,
                data TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create sessions table")?;

        // Index for listing sessions by status
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status)",
            [],
        )
        .context("failed to create status index")?;

        // Index for listing sessions by updated_at
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at)",
            [],
        )
        .context("failed to create updated_at index")?;

        debug!(path = %self.db_path.display(), "initialized SQLite storage");

        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn save(&self, session: &SessionState) -> Result<()> {
        let session = session.clone();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;

            // Serialize full session data as JSON
            let data = serde_json::to_string(&session)?;

            conn.execute(
                "INSERT OR REPLACE INTO sessions (id, agent, status, created_at, updated_at, error, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    session.id,
                    session.agent,
                    session.status.to_string(),
                    session.created_at.to_rfc3339(),
                    session.updated_at.to_rfc3339(),
                    session.error,
                    data,
                ],
            )?;

            debug!(id = %session.id, "saved session");

            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<SessionState>> {
        let id = id.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;

            let mut stmt = conn.prepare("SELECT data FROM sessions WHERE id = ?1")?;

            let result = stmt.query_row([&id], |row| {
                let data: String = row.get(0)?;
                Ok(data)
            });

            match result {
                Ok(data) => {
                    let session: SessionState = serde_json::from_str(&data)?;
                    debug!(id = %session.id, "loaded session");
                    Ok(Some(session))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn list(&self) -> Result<Vec<SessionSummary>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;

            let mut stmt = conn.prepare(
                "SELECT id, agent, status, created_at, updated_at, error
                 FROM sessions
                 ORDER BY updated_at DESC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, agent, status, created_at, updated_at, error)| -> Result<SessionSummary> {
                    Ok(SessionSummary {
                        status: status
                            .parse()
                            .with_context(|| format!("corrupt status for session {}", id))?,
                        id,
                        agent,
                        created_at,
                        updated_at,
                        error,
                    })
                })
                .collect()
        })
        .await
        .context("spawn_blocking failed")?
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute("DELETE FROM sessions WHERE id = ?1", [&id])?;
            debug!(id = %id, "deleted session");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("spawn_blocking failed")??;

        Ok(())
    }
}
