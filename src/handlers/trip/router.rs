//! Routing-key dispatch for driver decisions.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::warn;

use super::{TripEventError, TripEventKind, TripLifecycle};
use crate::bus::{Delivery, HandlerError, MessageHandler};
use crate::domain::DriverTripResponse;
use crate::envelope::Envelope;

/// What the router did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A lifecycle handler ran to completion.
    Handled(TripEventKind),
    /// The routing key is not a trip event. Acked without side effects.
    Ignored,
}

/// Consumer for the `driver_trip_response` queue.
pub struct TripEventRouter {
    lifecycle: Arc<TripLifecycle>,
}

impl TripEventRouter {
    pub fn new(lifecycle: Arc<TripLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Decode a delivery and run the matching lifecycle handler.
    ///
    /// The envelope and the decision payload are decoded before the routing
    /// key is looked at, so malformed JSON fails regardless of its key.
    /// Payloads of other driver events decode with empty fields and are
    /// ignored.
    pub async fn route(&self, delivery: &Delivery) -> Result<RouteOutcome, TripEventError> {
        let envelope = Envelope::from_slice(&delivery.body)?;
        let response: DriverTripResponse = envelope.decode()?;

        let Some(kind) = TripEventKind::from_routing_key(&delivery.routing_key) else {
            warn!(
                routing_key = %delivery.routing_key,
                trip_id = %response.trip_id,
                "Unknown trip event"
            );
            return Ok(RouteOutcome::Ignored);
        };

        match kind {
            TripEventKind::TripAccepted => {
                let driver = response
                    .driver
                    .as_ref()
                    .ok_or_else(|| TripEventError::MissingDriver {
                        trip_id: response.trip_id.clone(),
                    })?;
                self.lifecycle
                    .handle_trip_accepted(&response.trip_id, driver)
                    .await?;
            }
            TripEventKind::TripDeclined => {
                self.lifecycle
                    .handle_trip_declined(&response.trip_id, &response.rider_id)
                    .await?;
            }
        }

        Ok(RouteOutcome::Handled(kind))
    }
}

impl MessageHandler for TripEventRouter {
    fn handle(&self, delivery: Arc<Delivery>) -> BoxFuture<'static, Result<(), HandlerError>> {
        let router = Self {
            lifecycle: self.lifecycle.clone(),
        };

        Box::pin(async move {
            match router.route(&delivery).await {
                Ok(_) => Ok(()),
                Err(e) => Err(HandlerError::from(e)),
            }
        })
    }
}
