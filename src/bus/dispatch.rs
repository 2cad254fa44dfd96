//! The ack/nack gate.
//!
//! Every transport hands each delivery to `settle` exactly once and applies
//! the returned disposition. No other code path acknowledges or rejects.

use std::sync::Arc;

use tracing::{debug, error};

use super::{Delivery, MessageHandler};

/// What the transport must tell the broker about a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Processed; remove from the queue.
    Ack,
    /// Failed; reject without requeue (dead-lettered if configured).
    Nack,
}

/// Run `handler` on `delivery` and map the outcome to a disposition.
///
/// Failures are logged here with the routing key so the message body is
/// never the only clue.
pub async fn settle(handler: &dyn MessageHandler, delivery: Arc<Delivery>) -> Disposition {
    let routing_key = delivery.routing_key.clone();
    let redelivered = delivery.redelivered;

    match handler.handle(delivery).await {
        Ok(()) => {
            debug!(routing_key = %routing_key, "Delivery handled, acking");
            Disposition::Ack
        }
        Err(e) => {
            error!(
                routing_key = %routing_key,
                redelivered,
                error = %e,
                "Failed to handle delivery, rejecting without requeue"
            );
            Disposition::Nack
        }
    }
}
