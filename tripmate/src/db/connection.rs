use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

pub struct Database {
    pub(crate) db: Arc<libsql::Database>,
    pub(crate) busy_timeout_ms: u64,
    pub(crate) journal_mode: String,
    pub(crate) synchronous: String,
    // An in-memory database only lives as long as its connection, so every
    // caller shares one.
    pub(crate) shared: Option<Connection>,
}

impl Database {
    /// Open (creating if needed) the local database and bring its schema up to
    /// the current version.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let in_memory = config.url == ":memory:";
        let db = if in_memory {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };
        let shared = if in_memory { Some(db.connect()?) } else { None };

        let database = Self {
            db: Arc::new(db),
            shared,
            busy_timeout_ms: config.busy_timeout_ms,
            journal_mode: normalize_journal_mode(&config.journal_mode).to_string(),
            synchronous: normalize_synchronous(&config.synchronous).to_string(),
        };
        database.configure_database().await?;
        database.open().await?;

        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        if let Some(conn) = &self.shared {
            return Ok(conn.clone());
        }
        Ok(self.db.connect()?)
    }

    /// Idempotent: creates collections and indexes on first use only.
    pub async fn open(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::init_schema(&conn).await
    }

    async fn configure_database(&self) -> Result<()> {
        let conn = self.connect()?;

        let busy_timeout_sql = format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms);
        if let Err(error) = conn.execute_batch(&busy_timeout_sql).await {
            tracing::warn!(
                busy_timeout_ms = self.busy_timeout_ms,
                error = %error,
                "Failed to set SQLite busy_timeout"
            );
        }

        let journal_sql = format!("PRAGMA journal_mode = {}", self.journal_mode);
        if let Err(error) = conn.execute_batch(&journal_sql).await {
            tracing::warn!(
                mode = %self.journal_mode,
                error = %error,
                "Failed to set SQLite journal_mode"
            );
        }

        let synchronous_sql = format!("PRAGMA synchronous = {}", self.synchronous);
        if let Err(error) = conn.execute_batch(&synchronous_sql).await {
            tracing::warn!(
                mode = %self.synchronous,
                error = %error,
                "Failed to set SQLite synchronous pragma"
            );
        }

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode.clone(),
            synchronous: self.synchronous.clone(),
            shared: self.shared.clone(),
        }
    }
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "WAL" => "WAL",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "NORMAL" => "NORMAL",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_journal_mode() {
        assert_eq!(normalize_journal_mode("delete"), "DELETE");
        assert_eq!(normalize_journal_mode(" wal "), "WAL");
        assert_eq!(normalize_journal_mode("bogus"), "WAL");
    }

    #[test]
    fn test_normalize_synchronous() {
        assert_eq!(normalize_synchronous("full"), "FULL");
        assert_eq!(normalize_synchronous(""), "NORMAL");
    }
}
