use chrono::Utc;
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Trip, TripDraft};

use super::parse_timestamp;

pub struct TripRepository;

impl TripRepository {
    /// Insert a trip and return its newly issued id.
    pub async fn create(conn: &Connection, trip: &TripDraft) -> Result<i64> {
        conn.execute(
            r#"
            INSERT INTO trips (name, country, start_date, end_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                trip.name.clone(),
                trip.country.clone(),
                trip.start_date.clone(),
                trip.end_date.clone(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    pub async fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Trip>> {
        let mut rows = conn
            .query(
                "SELECT id, name, country, start_date, end_date, created_at FROM trips WHERE id = ?1",
                params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_trip(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(conn: &Connection) -> Result<Vec<Trip>> {
        let mut rows = conn
            .query(
                "SELECT id, name, country, start_date, end_date, created_at FROM trips ORDER BY id",
                (),
            )
            .await?;

        let mut trips = Vec::new();
        while let Some(row) = rows.next().await? {
            trips.push(Self::row_to_trip(&row)?);
        }

        Ok(trips)
    }

    pub async fn find_by_name(conn: &Connection, name: &str) -> Result<Vec<Trip>> {
        let mut rows = conn
            .query(
                "SELECT id, name, country, start_date, end_date, created_at FROM trips WHERE name = ?1 ORDER BY id",
                params![name],
            )
            .await?;

        let mut trips = Vec::new();
        while let Some(row) = rows.next().await? {
            trips.push(Self::row_to_trip(&row)?);
        }

        Ok(trips)
    }

    fn row_to_trip(row: &libsql::Row) -> Result<Trip> {
        Ok(Trip {
            id: row.get(0)?,
            name: row.get(1)?,
            country: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            created_at: parse_timestamp(&row.get::<String>(5)?),
        })
    }
}
