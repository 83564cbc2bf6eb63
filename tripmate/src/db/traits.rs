use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DailyPlan, Trip, TripDetail, TripItem, TripPlan};

/// Persistence operations for saved trips.
///
/// Records are only ever created; nothing here updates or deletes.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Idempotent schema setup. Safe to call on an already-open store.
    async fn open(&self) -> Result<()>;

    /// Write a trip with its daily plans and items in one transaction and
    /// return the new trip id. On failure nothing is written.
    async fn commit_trip(&self, plan: &TripPlan) -> Result<i64>;

    /// All trips in insertion order.
    async fn list_trips(&self) -> Result<Vec<Trip>>;

    async fn find_trips_by_name(&self, name: &str) -> Result<Vec<Trip>>;
    async fn get_trip(&self, id: i64) -> Result<Option<Trip>>;
    async fn list_daily_plans(&self, trip_id: i64) -> Result<Vec<DailyPlan>>;
    async fn list_trip_items(&self, daily_plan_id: i64) -> Result<Vec<TripItem>>;

    /// A trip with all of its plans and items, or `None` if the id is unknown.
    async fn get_trip_detail(&self, id: i64) -> Result<Option<TripDetail>>;
}
