use crate::error::Result;
use chrono::Utc;
use libsql::Connection;

const SCHEMA_VERSION_KEY: &str = "schema_version";

pub struct MetadataRepository;

impl MetadataRepository {
    pub async fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let mut rows = conn
            .query("SELECT value FROM tripmate_meta WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub async fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO tripmate_meta (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            [key, value, &now],
        )
        .await?;
        Ok(())
    }

    /// Recorded schema version, `0` for a freshly created database.
    pub async fn get_schema_version(conn: &Connection) -> Result<u32> {
        match Self::get(conn, SCHEMA_VERSION_KEY).await? {
            Some(s) => Ok(s.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %s, "Unparsable schema_version in metadata, treating as 0");
                0
            })),
            None => Ok(0),
        }
    }

    pub async fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
        Self::set(conn, SCHEMA_VERSION_KEY, &version.to_string()).await
    }
}
