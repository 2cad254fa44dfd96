//! Trip lifecycle coordination.
//!
//! Driver decisions arrive on the `driver_trip_response` queue. The router
//! decodes each delivery and hands it to the lifecycle, which updates the
//! trip through the store and fans out the follow-on messages:
//!
//! - accept: `trip.event.driver_assigned`, then `payment.cmd.create_session`
//! - decline: `trip.event.driver_not_interested`
//!
//! Any error nacks the delivery. Publishes that already went out are not
//! rolled back.

pub mod lifecycle;
pub mod router;

pub use lifecycle::TripLifecycle;
pub use router::{RouteOutcome, TripEventRouter};

use crate::bus::topology::{DRIVER_CMD_TRIP_ACCEPT, DRIVER_CMD_TRIP_DECLINE};
use crate::bus::BusError;
use crate::envelope::CodecError;
use crate::storage::StorageError;

/// Driver decisions the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEventKind {
    TripAccepted,
    TripDeclined,
}

impl TripEventKind {
    /// Map a routing key to a known event. `None` for anything else.
    pub fn from_routing_key(routing_key: &str) -> Option<Self> {
        match routing_key {
            DRIVER_CMD_TRIP_ACCEPT => Some(Self::TripAccepted),
            DRIVER_CMD_TRIP_DECLINE => Some(Self::TripDeclined),
            _ => None,
        }
    }

    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::TripAccepted => DRIVER_CMD_TRIP_ACCEPT,
            Self::TripDeclined => DRIVER_CMD_TRIP_DECLINE,
        }
    }
}

/// Errors that fail a trip event (and nack its delivery).
#[derive(Debug, thiserror::Error)]
pub enum TripEventError {
    #[error("Failed to decode trip event: {0}")]
    Decode(#[from] CodecError),

    #[error("Trip not found: {trip_id}")]
    NotFound { trip_id: String },

    #[error("Accept for trip {trip_id} carries no driver")]
    MissingDriver { trip_id: String },

    #[error("Trip store error for trip {trip_id}: {source}")]
    Storage {
        trip_id: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to publish {routing_key} for trip {trip_id}: {source}")]
    Publish {
        trip_id: String,
        routing_key: String,
        #[source]
        source: BusError,
    },
}

impl From<StorageError> for TripEventError {
    fn from(err: StorageError) -> Self {
        let trip_id = match &err {
            StorageError::NotFound { id } => {
                return TripEventError::NotFound {
                    trip_id: id.clone(),
                }
            }
            StorageError::AlreadyExists { id } | StorageError::InvalidTransition { id, .. } => {
                id.clone()
            }
        };
        TripEventError::Storage {
            trip_id,
            source: err,
        }
    }
}
