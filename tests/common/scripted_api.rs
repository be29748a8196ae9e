#![allow(dead_code)]

//! In-process [`FlightApi`] whose responses are scripted per call, with a delay
//! each, for driving request races under a paused tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use flight_booking_client::{
    models::{
        airport::Airport,
        booking::{BookedFlight, Booking, BookingDraft, CheckinRequest, CheckinResponse},
        flight::{Flight, FlightSearchRequest, StatusLabel},
        user::{AuthResponse, User, UserLoginRequest, UserRegistrationRequest},
    },
    services::{gateway::FlightApi, seat_service::SeatSource},
    utils::error::{ClientError, ClientResult},
};

pub fn flight(id: i64) -> Flight {
    Flight {
        id,
        plane_id: Some(1),
        departure_airport_id: 1,
        arrival_airport_id: 2,
        departure_time: Some("2025-06-15 08:00:00".into()),
        arrival_time: Some("2025-06-15 10:30:00".into()),
        status: StatusLabel::Code(1),
        price: None,
    }
}

/// Booking found by reference, with one leg per flight id, seat "3A".
pub fn booking_with_legs(flight_ids: &[i64]) -> Booking {
    Booking {
        id: 7,
        booking_ref: "ABC123".into(),
        seat_number: "3A".into(),
        status: StatusLabel::default(),
        flight_id: None,
        departure_time: None,
        departure_airport_code: None,
        arrival_airport_code: None,
        flights: flight_ids
            .iter()
            .map(|&id| BookedFlight {
                id,
                departure_airport_code: Some("KBP".into()),
                arrival_airport_code: Some("LHR".into()),
                departure_time: Some("2025-06-15 08:00:00".into()),
                status: StatusLabel::Code(1),
                seat_number: "3A".into(),
            })
            .collect(),
    }
}

fn rejected(message: String) -> ClientError {
    ClientError::Server {
        status: 400,
        message,
    }
}

fn not_scripted() -> ClientError {
    ClientError::Server {
        status: 501,
        message: "not scripted".into(),
    }
}

#[derive(Default)]
pub struct ScriptedApi {
    searches: Mutex<VecDeque<(Duration, Vec<Flight>)>>,
    bookings: Mutex<VecDeque<(Duration, Result<String, String>)>>,
    lookups: Mutex<VecDeque<(Duration, Result<Booking, String>)>>,
    checkins: Mutex<VecDeque<(Duration, Result<(), String>)>>,
    pub search_calls: AtomicUsize,
    pub booking_calls: AtomicUsize,
    pub checkin_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_search(self, delay: Duration, flights: Vec<Flight>) -> Self {
        self.searches.lock().unwrap().push_back((delay, flights));
        self
    }

    pub fn then_book(self, delay: Duration, reply: Result<&str, &str>) -> Self {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.bookings.lock().unwrap().push_back((delay, reply));
        self
    }

    pub fn then_lookup(self, delay: Duration, reply: Result<Booking, &str>) -> Self {
        let reply = reply.map_err(str::to_string);
        self.lookups.lock().unwrap().push_back((delay, reply));
        self
    }

    pub fn then_checkin(self, delay: Duration, reply: Result<(), &str>) -> Self {
        let reply = reply.map_err(str::to_string);
        self.checkins.lock().unwrap().push_back((delay, reply));
        self
    }
}

#[async_trait]
impl FlightApi for ScriptedApi {
    async fn list_airports(&self) -> ClientResult<Vec<Airport>> {
        Ok(vec![
            Airport::new(1, "KBP", "Kyiv", "Boryspil"),
            Airport::new(2, "LHR", "London", "Heathrow"),
        ])
    }

    async fn search_flights(&self, _request: &FlightSearchRequest) -> ClientResult<Vec<Flight>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.searches.lock().unwrap().pop_front();
        let (delay, flights) = next.ok_or_else(not_scripted)?;
        tokio::time::sleep(delay).await;
        Ok(flights)
    }

    async fn login(&self, _request: &UserLoginRequest) -> ClientResult<AuthResponse> {
        Err(not_scripted())
    }

    async fn register(&self, _request: &UserRegistrationRequest) -> ClientResult<AuthResponse> {
        Err(not_scripted())
    }

    async fn fetch_profile(&self, _token: &str) -> ClientResult<User> {
        Err(not_scripted())
    }

    async fn list_bookings(&self, _token: &str) -> ClientResult<Vec<Booking>> {
        Err(not_scripted())
    }

    async fn book_flight(&self, _draft: &BookingDraft) -> ClientResult<String> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.bookings.lock().unwrap().pop_front();
        let (delay, reply) = next.ok_or_else(not_scripted)?;
        tokio::time::sleep(delay).await;
        reply.map_err(rejected)
    }

    async fn find_booking(&self, _booking_ref: &str, _last_name: &str) -> ClientResult<Booking> {
        let next = self.lookups.lock().unwrap().pop_front();
        let (delay, reply) = next.ok_or_else(not_scripted)?;
        tokio::time::sleep(delay).await;
        reply.map_err(rejected)
    }

    async fn complete_checkin(&self, _request: &CheckinRequest) -> ClientResult<CheckinResponse> {
        self.checkin_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.checkins.lock().unwrap().pop_front();
        let (delay, reply) = next.ok_or_else(not_scripted)?;
        tokio::time::sleep(delay).await;
        reply.map_err(rejected)?;
        Ok(CheckinResponse {
            success: Some(true),
            message: None,
        })
    }
}

/// Seat list that arrives after `delay`, or fails with `failure`.
pub struct SlowSeats {
    pub delay: Duration,
    pub seats: Vec<String>,
    pub failure: Option<String>,
}

#[async_trait]
impl SeatSource for SlowSeats {
    async fn available_seats(&self, _flight_id: i64) -> ClientResult<Vec<String>> {
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            Some(message) => Err(ClientError::Server {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(self.seats.clone()),
        }
    }
}
