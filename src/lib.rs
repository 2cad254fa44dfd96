//! Tripline - trip lifecycle coordination for a ride-hailing backend.
//!
//! Consumes driver decisions from RabbitMQ, moves trips through their
//! lifecycle, and publishes rider notifications and payment commands.

pub mod bus;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod handlers;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod test_utils;
