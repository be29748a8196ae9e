use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};

use crate::utils::format::status_name;

// Flight Status Enum, numbered as the backend stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(i32)]
pub enum FlightStatus {
    Planned = 1,
    Departed = 2,
    Arrived = 3,
    Canceled = 4,
    Delayed = 5,
}

impl FlightStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Status as it arrives on the wire: flights carry the numeric code, some
/// booking endpoints send a ready-made label such as "Booked".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusLabel {
    Code(i32),
    Text(String),
}

impl Default for StatusLabel {
    fn default() -> Self {
        StatusLabel::Text(String::new())
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Code(code) => f.write_str(&status_name(*code)),
            StatusLabel::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    #[serde(default)]
    pub plane_id: Option<i64>,
    #[serde(rename = "departure_airport")]
    pub departure_airport_id: i64,
    #[serde(rename = "arrival_airport")]
    pub arrival_airport_id: i64,
    // Either time may be missing or null on a flight still being scheduled
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StatusLabel,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Reads an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /flights/search`. Field names are what the backend expects;
/// `plane_id` and `arrival_time` are always sent as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSearchRequest {
    pub plane_id: Option<i64>,
    pub departure_airport: i64,
    pub arrival_airport: i64,
    pub departure_time: String,
    pub arrival_time: Option<String>,
    pub status: i32,
}

impl FlightSearchRequest {
    pub fn planned(departure_airport: i64, arrival_airport: i64, departure_time: String) -> Self {
        FlightSearchRequest {
            plane_id: None,
            departure_airport,
            arrival_airport,
            departure_time,
            arrival_time: None,
            status: FlightStatus::Planned.code(),
        }
    }
}
