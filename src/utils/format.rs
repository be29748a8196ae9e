//! Conversions from raw API fields into the strings shown on the page.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

use crate::models::airport::Airport;
use crate::models::flight::FlightStatus;

pub const INVALID_DATE: &str = "Invalid Date";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Renders timestamps in en-US conventions.
///
/// Timestamps without an offset are wall-clock values and are displayed as given.
/// Timestamps carrying an offset are converted to `display_offset` first.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    display_offset: FixedOffset,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::utc()
    }
}

impl Formatter {
    pub fn new(display_offset: FixedOffset) -> Self {
        Formatter { display_offset }
    }

    pub fn utc() -> Self {
        Formatter {
            display_offset: Utc.fix(),
        }
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    /// `"Jun 15, 2025, 08:00 AM"`; seconds are dropped, not rounded.
    pub fn format_date_time(&self, timestamp: &str) -> String {
        self.parse(timestamp)
            .map(|t| t.format("%b %-d, %Y, %I:%M %p").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }

    /// `"6/15/2025"`
    pub fn format_date(&self, timestamp: &str) -> String {
        self.parse(timestamp)
            .map(|t| t.format("%-m/%-d/%Y").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }

    /// `"08:00 AM"`
    pub fn format_time(&self, timestamp: &str) -> String {
        self.parse(timestamp)
            .map(|t| t.format("%I:%M %p").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }

    fn parse(&self, timestamp: &str) -> Option<NaiveDateTime> {
        let timestamp = timestamp.trim();
        if let Ok(aware) = DateTime::parse_from_rfc3339(timestamp) {
            return Some(aware.with_timezone(&self.display_offset).naive_local());
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        {
            return Some(naive);
        }
        NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// Total over every integer: codes outside the five known statuses are "Unknown".
pub fn status_name(code: i32) -> String {
    FlightStatus::from_repr(code)
        .map(|status| status.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// In-memory airport cache, filled once from `GET /airports`.
#[derive(Debug, Default, Clone)]
pub struct AirportDirectory {
    airports: HashMap<i64, Airport>,
    order: Vec<i64>,
}

impl AirportDirectory {
    pub fn new(airports: Vec<Airport>) -> Self {
        let mut directory = AirportDirectory::default();
        directory.replace(airports);
        directory
    }

    pub fn replace(&mut self, airports: Vec<Airport>) {
        self.airports.clear();
        self.order.clear();
        for airport in airports {
            if !self.airports.contains_key(&airport.id) {
                self.order.push(airport.id);
            }
            self.airports.insert(airport.id, airport);
        }
    }

    pub fn get(&self, id: i64) -> Option<&Airport> {
        self.airports.get(&id)
    }

    /// Airports in the order the backend listed them.
    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.order.iter().filter_map(|id| self.airports.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `"Kyiv (KBP)"`, or `"Airport 7"` when the id is not cached.
    pub fn label(&self, id: i64) -> String {
        match self.airports.get(&id) {
            Some(airport) => format!("{} ({})", airport.city, airport.code),
            None => format!("Airport {}", id),
        }
    }
}
