use libsql::Connection;

use crate::error::{PlannerError, Result};

use super::MetadataRepository;

pub const SCHEMA_VERSION: u32 = 1;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tripmate_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .await?;

    let current = MetadataRepository::get_schema_version(conn).await?;
    if current > SCHEMA_VERSION {
        return Err(PlannerError::Schema(format!(
            "database schema version {current} is newer than supported version {SCHEMA_VERSION}"
        )));
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    tracing::info!(from = current, to = SCHEMA_VERSION, "Upgrading database schema");
    upgrade_to_v1(conn).await?;
    MetadataRepository::set_schema_version(conn, SCHEMA_VERSION).await?;

    Ok(())
}

async fn upgrade_to_v1(conn: &Connection) -> Result<()> {
    // cost and time_estimate are declared without a type so SQLite keeps
    // whatever the model returned (REAL or TEXT) as-is.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            country TEXT,
            start_date TEXT,
            end_date TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trips_name ON trips(name);

        CREATE TABLE IF NOT EXISTS daily_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL,
            date TEXT,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            FOREIGN KEY (trip_id) REFERENCES trips(id)
        );

        CREATE INDEX IF NOT EXISTS idx_daily_plans_trip_id ON daily_plans(trip_id);

        CREATE TABLE IF NOT EXISTS trip_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            daily_plan_id INTEGER NOT NULL,
            name TEXT,
            item_type TEXT,
            cost,
            time_estimate,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (daily_plan_id) REFERENCES daily_plans(id)
        );

        CREATE INDEX IF NOT EXISTS idx_trip_items_daily_plan_id ON trip_items(daily_plan_id);
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    async fn memory_conn() -> Connection {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        db.connect().unwrap()
    }

    async fn table_count(conn: &Connection) -> i64 {
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('trips', 'daily_plans', 'trip_items')",
                (),
            )
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }

    #[tokio::test]
    async fn test_init_schema_creates_collections_and_indexes() {
        let conn = memory_conn().await;
        init_schema(&conn).await.unwrap();

        assert_eq!(table_count(&conn).await, 3);

        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
                (),
            )
            .await
            .unwrap();
        let mut indexes = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            indexes.push(row.get::<String>(0).unwrap());
        }
        assert_eq!(
            indexes,
            vec![
                "idx_daily_plans_trip_id",
                "idx_trip_items_daily_plan_id",
                "idx_trips_name"
            ]
        );
        assert_eq!(
            MetadataRepository::get_schema_version(&conn).await.unwrap(),
            SCHEMA_VERSION
        );
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let conn = memory_conn().await;
        init_schema(&conn).await.unwrap();
        conn.execute(
            "INSERT INTO trips (name, created_at) VALUES ('kept', '2025-01-01T00:00:00Z')",
            (),
        )
        .await
        .unwrap();

        init_schema(&conn).await.unwrap();

        let mut rows = conn.query("SELECT COUNT(*) FROM trips", ()).await.unwrap();
        let count = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_newer_schema_version_is_refused() {
        let conn = memory_conn().await;
        init_schema(&conn).await.unwrap();
        MetadataRepository::set_schema_version(&conn, SCHEMA_VERSION + 1)
            .await
            .unwrap();

        let result = init_schema(&conn).await;
        assert!(matches!(result, Err(PlannerError::Schema(_))));
    }
}
