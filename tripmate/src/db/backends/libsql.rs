use async_trait::async_trait;

use crate::db::connection::Database;
use crate::db::repository::{DailyPlanRepository, TripItemRepository, TripRepository};
use crate::db::traits::TripStore;
use crate::error::Result;
use crate::models::{DailyPlan, DailyPlanDetail, Trip, TripDetail, TripItem, TripPlan};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl TripStore for LibSqlBackend {
    async fn open(&self) -> Result<()> {
        self.db.open().await
    }

    async fn commit_trip(&self, plan: &TripPlan) -> Result<i64> {
        let conn = self.db.connect()?;
        // Dropping the transaction on an early return rolls everything back.
        let tx = conn.transaction().await?;

        let trip_id = TripRepository::create(&tx, &plan.trip).await?;
        for daily_plan in &plan.daily_plans {
            let daily_plan_id = DailyPlanRepository::create(&tx, trip_id, daily_plan).await?;
            for item in daily_plan.items() {
                TripItemRepository::create(&tx, daily_plan_id, item).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            trip_id,
            daily_plans = plan.daily_plans.len(),
            items = plan.item_count(),
            "Trip committed"
        );
        Ok(trip_id)
    }

    async fn list_trips(&self) -> Result<Vec<Trip>> {
        let conn = self.db.connect()?;
        TripRepository::list_all(&conn).await
    }

    async fn find_trips_by_name(&self, name: &str) -> Result<Vec<Trip>> {
        let conn = self.db.connect()?;
        TripRepository::find_by_name(&conn, name).await
    }

    async fn get_trip(&self, id: i64) -> Result<Option<Trip>> {
        let conn = self.db.connect()?;
        TripRepository::get_by_id(&conn, id).await
    }

    async fn list_daily_plans(&self, trip_id: i64) -> Result<Vec<DailyPlan>> {
        let conn = self.db.connect()?;
        DailyPlanRepository::list_by_trip_id(&conn, trip_id).await
    }

    async fn list_trip_items(&self, daily_plan_id: i64) -> Result<Vec<TripItem>> {
        let conn = self.db.connect()?;
        TripItemRepository::list_by_daily_plan_id(&conn, daily_plan_id).await
    }

    async fn get_trip_detail(&self, id: i64) -> Result<Option<TripDetail>> {
        let conn = self.db.connect()?;
        let Some(trip) = TripRepository::get_by_id(&conn, id).await? else {
            return Ok(None);
        };

        let plans = DailyPlanRepository::list_by_trip_id(&conn, id).await?;
        let mut days = Vec::with_capacity(plans.len());
        for plan in plans {
            let items = TripItemRepository::list_by_daily_plan_id(&conn, plan.id).await?;
            days.push(DailyPlanDetail { plan, items });
        }

        Ok(Some(TripDetail { trip, days }))
    }
}
