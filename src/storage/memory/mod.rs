//! In-memory trip store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Result, StorageError, TripStore};
use crate::domain::{Driver, RideFare, Trip, TripStatus};

/// Trip store backed by a `HashMap` behind a single `RwLock`.
///
/// Every update takes the write lock for its whole read-check-write, which
/// gives the per-trip single-writer semantics the handlers rely on.
#[derive(Default)]
pub struct InMemoryTripStore {
    trips: RwLock<HashMap<String, Trip>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed trip. Fails if the id is taken.
    pub async fn insert(&self, trip: Trip) -> Result<()> {
        let mut trips = self.trips.write().await;
        if trips.contains_key(&trip.id) {
            return Err(StorageError::AlreadyExists { id: trip.id });
        }
        trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.trips.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trips.read().await.is_empty()
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn create_trip(&self, user_id: &str, fare: RideFare) -> Result<Trip> {
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            status: TripStatus::Pending,
            selected_fare: fare,
            driver: None,
        };
        self.insert(trip.clone()).await?;
        debug!(trip_id = %trip.id, user_id = %user_id, "Created trip");
        Ok(trip)
    }

    async fn get_trip_by_id(&self, id: &str) -> Result<Trip> {
        self.trips
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    async fn update_trip(
        &self,
        id: &str,
        status: TripStatus,
        driver: Option<Driver>,
    ) -> Result<()> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;

        let invalid = || StorageError::InvalidTransition {
            id: id.to_string(),
            from: trip.status,
            to: status,
        };

        if !trip.status.can_transition_to(status) {
            return Err(invalid());
        }

        if trip.status == status {
            // Redelivery: only a no-op if it names the same driver.
            let same_driver = match (&trip.driver, &driver) {
                (Some(current), Some(new)) => current.id == new.id,
                (_, None) => true,
                (None, Some(_)) => false,
            };
            if !same_driver {
                return Err(invalid());
            }
            debug!(trip_id = %id, status = %status, "Trip already in requested state");
            return Ok(());
        }

        trip.status = status;
        if driver.is_some() {
            trip.driver = driver;
        }
        debug!(trip_id = %id, status = %status, "Updated trip");
        Ok(())
    }
}
