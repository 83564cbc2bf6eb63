use chrono::Utc;
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{DailyPlan, DailyPlanDraft};

use super::parse_timestamp;

pub struct DailyPlanRepository;

impl DailyPlanRepository {
    /// Insert a daily plan owned by `trip_id`. Missing notes are stored empty.
    pub async fn create(conn: &Connection, trip_id: i64, plan: &DailyPlanDraft) -> Result<i64> {
        conn.execute(
            r#"
            INSERT INTO daily_plans (trip_id, date, notes, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                trip_id,
                plan.date.clone(),
                plan.notes.clone().unwrap_or_default(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    pub async fn list_by_trip_id(conn: &Connection, trip_id: i64) -> Result<Vec<DailyPlan>> {
        let mut rows = conn
            .query(
                "SELECT id, trip_id, date, notes, created_at FROM daily_plans WHERE trip_id = ?1 ORDER BY id",
                params![trip_id],
            )
            .await?;

        let mut plans = Vec::new();
        while let Some(row) = rows.next().await? {
            plans.push(DailyPlan {
                id: row.get(0)?,
                trip_id: row.get(1)?,
                date: row.get(2)?,
                notes: row.get::<Option<String>>(3)?.unwrap_or_default(),
                created_at: parse_timestamp(&row.get::<String>(4)?),
            });
        }

        Ok(plans)
    }
}
