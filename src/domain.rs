//! Trip aggregate and the wire payloads exchanged about it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Currency used for every payment session.
pub const PAYMENT_CURRENCY: &str = "USD";

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Created, waiting for a driver decision.
    #[default]
    Pending,
    /// A driver accepted the trip.
    Accepted,
    /// The offered driver declined.
    Declined,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Accepted => "accepted",
            TripStatus::Declined => "declined",
        }
    }

    /// Whether `self -> next` is allowed. Staying in the same state is
    /// allowed so that redelivered events stay harmless.
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        matches!(
            (self, next),
            (TripStatus::Pending, TripStatus::Accepted)
                | (TripStatus::Pending, TripStatus::Declined)
        ) || *self == next
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priced package option selected for a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideFare {
    pub id: String,
    pub user_id: String,
    pub package_slug: String,
    pub total_price_in_cents: u64,
}

/// Driver as reported by the driver service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub profile_picture: String,
    pub car_plate: String,
    pub package_slug: String,
}

/// The aggregate under coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub user_id: String,
    pub status: TripStatus,
    pub selected_fare: RideFare,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
}

/// Driver decision published by the driver service.
///
/// Every field defaults when absent, so other driver events sharing the
/// queue still decode and can be ignored by routing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTripResponse {
    #[serde(default)]
    pub trip_id: String,
    #[serde(default)]
    pub rider_id: String,
    #[serde(default)]
    pub driver: Option<Driver>,
}

/// Body of the rider-facing trip events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripEventData {
    pub trip: Trip,
}

/// Command asking the payment service to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionRequest {
    pub trip_id: String,
    pub user_id: String,
    pub driver_id: String,
    /// Integer cents.
    pub amount: u64,
    pub currency: String,
}

impl PaymentSessionRequest {
    /// Build the session request for an accepted trip.
    pub fn for_trip(trip: &Trip, driver_id: &str) -> Self {
        Self {
            trip_id: trip.id.clone(),
            user_id: trip.user_id.clone(),
            driver_id: driver_id.to_string(),
            amount: trip.selected_fare.total_price_in_cents,
            currency: PAYMENT_CURRENCY.to_string(),
        }
    }
}
