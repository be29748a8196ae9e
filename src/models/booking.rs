use serde::{Deserialize, Serialize};

use crate::models::flight::{null_as_default, StatusLabel};

/// Form-encoded body of the booking submission (`POST /`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDraft {
    pub passenger_name: String,
    pub email: String,
    pub flight_id: String,
    pub seat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_ref: String,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StatusLabel,
    #[serde(default)]
    pub flight_id: Option<i64>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub departure_airport_code: Option<String>,
    #[serde(default)]
    pub arrival_airport_code: Option<String>,
    // Only present on the reference + last name lookup
    #[serde(default)]
    pub flights: Vec<BookedFlight>,
}

/// A flight leg on a booking found for check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedFlight {
    pub id: i64,
    #[serde(default)]
    pub departure_airport_code: Option<String>,
    #[serde(default)]
    pub arrival_airport_code: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StatusLabel,
    #[serde(default)]
    pub seat_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinRequest {
    pub flight_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckinResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
