//! TripStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::domain::{Driver, RideFare, Trip, TripStatus};

/// Interface for trip persistence.
///
/// Implementations must apply `update_trip` atomically per trip id so that
/// duplicate deliveries racing on the same trip cannot lose an update.
///
/// Implementations:
/// - `InMemoryTripStore`: process-local map, used by the trip service and tests
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Create a new trip in `pending` for `user_id` with the selected fare.
    async fn create_trip(&self, user_id: &str, fare: RideFare) -> Result<Trip>;

    /// Fetch a trip by id. Missing trips are `StorageError::NotFound`.
    async fn get_trip_by_id(&self, id: &str) -> Result<Trip>;

    /// Move a trip to `status`, attaching `driver` when given.
    ///
    /// Re-applying the state the trip already has (same status, same driver)
    /// succeeds without change. Non-monotonic transitions fail with
    /// `StorageError::InvalidTransition`.
    async fn update_trip(&self, id: &str, status: TripStatus, driver: Option<Driver>)
        -> Result<()>;
}
