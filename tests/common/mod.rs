//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tripline::bus::topology::{DEFAULT_EXCHANGE, DRIVER_TRIP_RESPONSE_QUEUE};
use tripline::bus::channel::DEFAULT_HISTORY_LIMIT;
use tripline::bus::{ChannelBroker, MessageBroker, Topology};
use tripline::domain::{Driver, DriverTripResponse, RideFare, Trip};
use tripline::envelope::Envelope;
use tripline::handlers::trip::{TripEventRouter, TripLifecycle};
use tripline::storage::{InMemoryTripStore, TripStore};

/// How long tests wait for the consumer to settle deliveries.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// A trip service wired to an in-process broker.
pub struct TripService {
    pub bus: Arc<ChannelBroker>,
    pub store: Arc<InMemoryTripStore>,
}

impl TripService {
    /// Start with the production topology.
    pub async fn start() -> Self {
        Self::start_with(Topology::trip_service(DEFAULT_EXCHANGE)).await
    }

    /// Start with a custom topology. It must declare `driver_trip_response`.
    pub async fn start_with(topology: Topology) -> Self {
        let bus = Arc::new(ChannelBroker::with_history(topology, DEFAULT_HISTORY_LIMIT));
        let store = Arc::new(InMemoryTripStore::new());
        let lifecycle = Arc::new(TripLifecycle::new(store.clone(), bus.clone()));

        bus.consume(
            DRIVER_TRIP_RESPONSE_QUEUE,
            Arc::new(TripEventRouter::new(lifecycle)),
        )
        .await
        .expect("consumer should start");

        Self { bus, store }
    }

    pub async fn create_trip(&self, user_id: &str, cents: u64) -> Trip {
        self.store
            .create_trip(user_id, fare(user_id, cents))
            .await
            .expect("trip should be created")
    }

    /// Publish a driver decision the way the driver service does.
    pub async fn send_decision(
        &self,
        routing_key: &str,
        trip_id: &str,
        rider_id: &str,
        driver: Option<Driver>,
    ) {
        let payload = DriverTripResponse {
            trip_id: trip_id.to_string(),
            rider_id: rider_id.to_string(),
            driver,
        };
        let envelope = Envelope::encode(rider_id, &payload).expect("payload should encode");
        self.bus
            .publish_raw(routing_key, envelope.to_vec().expect("envelope should encode"))
            .await
            .expect("publish should succeed");
    }
}

pub fn fare(user_id: &str, cents: u64) -> RideFare {
    RideFare {
        id: format!("fare-{}", user_id),
        user_id: user_id.to_string(),
        package_slug: "sedan".to_string(),
        total_price_in_cents: cents,
    }
}

pub fn driver(id: &str) -> Driver {
    Driver {
        id: id.to_string(),
        name: format!("Driver {}", id),
        profile_picture: format!("https://example.com/{}.png", id),
        car_plate: "TRIP-42".to_string(),
        package_slug: "sedan".to_string(),
    }
}
