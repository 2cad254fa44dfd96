//! Test utilities and fixtures shared by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::bus::{Delivery, HandlerError, MessageHandler};
use crate::domain::{Driver, RideFare};

/// Handler that records every delivery and fails for chosen routing keys.
#[derive(Default)]
pub struct RecordingHandler {
    count: Arc<AtomicUsize>,
    received: Arc<RwLock<Vec<Delivery>>>,
    failing_keys: HashSet<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every delivery with `routing_key`.
    pub fn failing_on(mut self, routing_key: &str) -> Self {
        self.failing_keys.insert(routing_key.to_string());
        self
    }

    pub fn count(&self) -> Arc<AtomicUsize> {
        self.count.clone()
    }

    pub fn received(&self) -> Arc<RwLock<Vec<Delivery>>> {
        self.received.clone()
    }
}

impl MessageHandler for RecordingHandler {
    fn handle(&self, delivery: Arc<Delivery>) -> BoxFuture<'static, Result<(), HandlerError>> {
        let count = self.count.clone();
        let received = self.received.clone();
        let fail = self.failing_keys.contains(&delivery.routing_key);
        Box::pin(async move {
            count.fetch_add(1, Ordering::SeqCst);
            received.write().await.push((*delivery).clone());
            if fail {
                let message = format!("rejected {}", delivery.routing_key);
                return Err(HandlerError::from(message));
            }
            Ok(())
        })
    }
}

pub fn sample_fare(user_id: &str, cents: u64) -> RideFare {
    RideFare {
        id: format!("fare-{}", user_id),
        user_id: user_id.to_string(),
        package_slug: "sedan".to_string(),
        total_price_in_cents: cents,
    }
}

pub fn sample_driver(id: &str) -> Driver {
    Driver {
        id: id.to_string(),
        name: format!("Driver {}", id),
        profile_picture: String::new(),
        car_plate: "ABC-123".to_string(),
        package_slug: "sedan".to_string(),
    }
}
