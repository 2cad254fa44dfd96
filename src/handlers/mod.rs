//! Message handlers for the trip service.

pub mod trip;
