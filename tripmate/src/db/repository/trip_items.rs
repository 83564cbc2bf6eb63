use chrono::Utc;
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{ItemMeasure, ItemType, TripItem, TripItemDraft};

use super::parse_timestamp;

pub struct TripItemRepository;

impl TripItemRepository {
    pub async fn create(
        conn: &Connection,
        daily_plan_id: i64,
        item: &TripItemDraft,
    ) -> Result<i64> {
        let cost = item
            .cost
            .as_ref()
            .map(ItemMeasure::to_sql_value)
            .unwrap_or(libsql::Value::Null);
        let time_estimate = item
            .time_estimate
            .as_ref()
            .map(ItemMeasure::to_sql_value)
            .unwrap_or(libsql::Value::Null);

        conn.execute(
            r#"
            INSERT INTO trip_items (
                daily_plan_id, name, item_type, cost, time_estimate, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                daily_plan_id,
                item.name.clone(),
                item.item_type.as_ref().map(|t| t.as_str().to_string()),
                cost,
                time_estimate,
                item.notes.clone(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    pub async fn list_by_daily_plan_id(
        conn: &Connection,
        daily_plan_id: i64,
    ) -> Result<Vec<TripItem>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, daily_plan_id, name, item_type, cost, time_estimate, notes, created_at
                FROM trip_items
                WHERE daily_plan_id = ?1
                ORDER BY id
                "#,
                params![daily_plan_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(TripItem {
                id: row.get(0)?,
                daily_plan_id: row.get(1)?,
                name: row.get(2)?,
                item_type: row.get::<Option<String>>(3)?.map(|t| ItemType::parse(&t)),
                cost: ItemMeasure::from_sql_value(row.get_value(4)?),
                time_estimate: ItemMeasure::from_sql_value(row.get_value(5)?),
                notes: row.get(6)?,
                created_at: parse_timestamp(&row.get::<String>(7)?),
            });
        }

        Ok(items)
    }
}
