//! trip-service: trip lifecycle coordinator
//!
//! Consumes driver decisions from the `driver_trip_response` queue and
//! drives each trip through its lifecycle, publishing rider notifications
//! and payment-session commands on the `trip` exchange.
//!
//! ## Configuration
//! - TRIPLINE_CONFIG / --config: YAML configuration file
//! - TRIPLINE__MESSAGING__AMQP__URL: broker URL (or legacy RABBITMQ_URI)
//! - TRIPLINE__MESSAGING__TYPE: `amqp` (default) or `channel`
//! - TRIPLINE_LOG: tracing filter, defaults to `info`

use std::sync::Arc;

use tracing::{error, info};

use tripline::bus::topology::DRIVER_TRIP_RESPONSE_QUEUE;
use tripline::bus::{init_broker, MessageBroker, Publisher, Topology};
use tripline::config::Config;
use tripline::domain::RideFare;
use tripline::handlers::trip::{TripEventRouter, TripLifecycle};
use tripline::storage::{InMemoryTripStore, TripStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tripline::utils::bootstrap::init_tracing();

    let config_path = tripline::utils::bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting trip-service");

    let topology = Topology::trip_service(config.messaging.amqp.exchange.clone());
    let broker = init_broker(&config.messaging, topology).await?;

    let store = Arc::new(InMemoryTripStore::new());
    if config.trip_service.seed_demo_trip {
        let fare = RideFare {
            id: "demo-fare".to_string(),
            user_id: "demo-rider".to_string(),
            package_slug: "sedan".to_string(),
            total_price_in_cents: 1500,
        };
        let trip = store.create_trip("demo-rider", fare).await?;
        info!(trip_id = %trip.id, "Seeded demo trip");
    }

    let publisher: Arc<dyn Publisher> = Arc::new(broker.clone());
    let lifecycle = Arc::new(TripLifecycle::new(store, publisher));
    let router = Arc::new(TripEventRouter::new(lifecycle));

    broker.consume(DRIVER_TRIP_RESPONSE_QUEUE, router).await?;
    info!(queue = DRIVER_TRIP_RESPONSE_QUEUE, "Consuming driver decisions");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down trip-service");
    broker.close().await;

    Ok(())
}
