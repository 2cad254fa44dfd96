//! Lifecycle steps run for each driver decision.
//!
//! Rider-facing events carry the trip wrapped as `{"trip": {...}}`
//! (`TripEventData`), never a bare trip object.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::TripEventError;
use crate::bus::topology::{
    PAYMENT_CMD_CREATE_SESSION, TRIP_EVENT_DRIVER_ASSIGNED, TRIP_EVENT_DRIVER_NOT_INTERESTED,
};
use crate::bus::{BusError, Publisher};
use crate::domain::{Driver, PaymentSessionRequest, Trip, TripEventData, TripStatus};
use crate::envelope::Envelope;
use crate::storage::TripStore;

/// Applies driver decisions to trips and publishes the resulting messages.
///
/// Each step is awaited before the next starts, so downstream consumers see
/// `driver_assigned` before the payment command for the same trip.
pub struct TripLifecycle {
    store: Arc<dyn TripStore>,
    publisher: Arc<dyn Publisher>,
}

impl TripLifecycle {
    pub fn new(store: Arc<dyn TripStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    /// A driver accepted the trip.
    ///
    /// Marks the trip accepted with `driver`, tells the rider, then asks the
    /// payment service for a checkout session. Returns the trip as stored
    /// after the update.
    #[tracing::instrument(name = "trip.accepted", skip_all, fields(%trip_id, driver_id = %driver.id))]
    pub async fn handle_trip_accepted(
        &self,
        trip_id: &str,
        driver: &Driver,
    ) -> Result<Trip, TripEventError> {
        let trip = self.store.get_trip_by_id(trip_id).await?;

        self.store
            .update_trip(&trip.id, TripStatus::Accepted, Some(driver.clone()))
            .await?;

        // Publish what the store holds, not what we asked for.
        let trip = self.store.get_trip_by_id(trip_id).await?;

        self.publish(
            &trip.id,
            TRIP_EVENT_DRIVER_ASSIGNED,
            &trip.user_id,
            &TripEventData { trip: trip.clone() },
        )
        .await?;

        let request = PaymentSessionRequest::for_trip(&trip, &driver.id);
        self.publish(&trip.id, PAYMENT_CMD_CREATE_SESSION, &trip.user_id, &request).await?;

        info!(
            user_id = %trip.user_id,
            amount = request.amount,
            "Driver assigned and payment session requested"
        );
        Ok(trip)
    }

    /// The offered driver declined. The trip itself is left unchanged.
    #[tracing::instrument(name = "trip.declined", skip_all, fields(%trip_id, %rider_id))]
    pub async fn handle_trip_declined(
        &self,
        trip_id: &str,
        rider_id: &str,
    ) -> Result<Trip, TripEventError> {
        let trip = self.store.get_trip_by_id(trip_id).await?;

        self.publish(
            &trip.id,
            TRIP_EVENT_DRIVER_NOT_INTERESTED,
            rider_id,
            &TripEventData { trip: trip.clone() },
        )
        .await?;

        info!("Rider notified that the driver is not interested");
        Ok(trip)
    }

    async fn publish<T: Serialize>(
        &self,
        trip_id: &str,
        routing_key: &str,
        owner_id: &str,
        payload: &T,
    ) -> Result<(), TripEventError> {
        let publish_error = |source: BusError| TripEventError::Publish {
            trip_id: trip_id.to_string(),
            routing_key: routing_key.to_string(),
            source,
        };

        let envelope =
            Envelope::encode(owner_id, payload).map_err(|e| publish_error(BusError::from(e)))?;
        self.publisher
            .publish(routing_key, &envelope)
            .await
            .map_err(publish_error)?;

        debug!(%routing_key, %owner_id, "Published trip message");
        Ok(())
    }
}
