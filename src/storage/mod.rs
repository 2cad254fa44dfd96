//! Trip state storage.
//!
//! The store exclusively owns trip mutation. Handlers read through
//! `get_trip_by_id` and write through `update_trip`, then re-read.

pub mod memory;
pub mod trip_store;

pub use memory::InMemoryTripStore;
pub use trip_store::TripStore;

use crate::domain::TripStatus;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Trip not found: id={id}")]
    NotFound { id: String },

    #[error("Trip already exists: id={id}")]
    AlreadyExists { id: String },

    #[error("Invalid transition for trip {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TripStatus,
        to: TripStatus,
    },
}
