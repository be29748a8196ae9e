//! REST client for the flight booking backend.
//!
//! Every call is a fresh round-trip: nothing is cached and nothing is retried.
//! Failures come back as [`ClientError::Server`] when the backend answered with a
//! non-2xx status, or as `Transport`/`Decode` when the response never arrived or
//! could not be read.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::airport::Airport;
use crate::models::booking::{Booking, BookingDraft, CheckinRequest, CheckinResponse};
use crate::models::flight::{Flight, FlightSearchRequest};
use crate::models::user::{AuthResponse, User, UserLoginRequest, UserRegistrationRequest};
use crate::utils::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// The fixed endpoint set the booking UI talks to.
#[async_trait]
pub trait FlightApi: Send + Sync {
    async fn list_airports(&self) -> ClientResult<Vec<Airport>>;

    async fn search_flights(&self, request: &FlightSearchRequest) -> ClientResult<Vec<Flight>>;

    async fn login(&self, request: &UserLoginRequest) -> ClientResult<AuthResponse>;

    async fn register(&self, request: &UserRegistrationRequest) -> ClientResult<AuthResponse>;

    async fn fetch_profile(&self, token: &str) -> ClientResult<User>;

    async fn list_bookings(&self, token: &str) -> ClientResult<Vec<Booking>>;

    /// Returns the backend's plain-text confirmation.
    async fn book_flight(&self, draft: &BookingDraft) -> ClientResult<String>;

    async fn find_booking(&self, booking_ref: &str, last_name: &str) -> ClientResult<Booking>;

    async fn complete_checkin(&self, request: &CheckinRequest) -> ClientResult<CheckinResponse>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`FlightApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        HttpGateway {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Read the body once so a bad payload is a Decode error, not a Transport one
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        fallback: &str,
    ) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body, fallback));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn server_error(status: u16, body: &str, fallback: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    ClientError::Server { status, message }
}

#[async_trait]
impl FlightApi for HttpGateway {
    async fn list_airports(&self) -> ClientResult<Vec<Airport>> {
        tracing::debug!("GET /airports");
        let response = self.client.get(self.url("/airports")).send().await?;
        Self::read_json(response, "Failed to load airports").await
    }

    async fn search_flights(&self, request: &FlightSearchRequest) -> ClientResult<Vec<Flight>> {
        tracing::debug!(
            departure = request.departure_airport,
            arrival = request.arrival_airport,
            departure_time = %request.departure_time,
            "POST /flights/search"
        );
        let response = self
            .client
            .post(self.url("/flights/search"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response, "Server error occurred").await
    }

    async fn login(&self, request: &UserLoginRequest) -> ClientResult<AuthResponse> {
        tracing::debug!("POST /auth/login");
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response, "Login failed").await
    }

    async fn register(&self, request: &UserRegistrationRequest) -> ClientResult<AuthResponse> {
        tracing::debug!("POST /auth/register");
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response, "Registration failed").await
    }

    async fn fetch_profile(&self, token: &str) -> ClientResult<User> {
        tracing::debug!("GET /auth/me");
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, "Failed to fetch user profile").await
    }

    async fn list_bookings(&self, token: &str) -> ClientResult<Vec<Booking>> {
        tracing::debug!("GET /bookings");
        let response = self
            .client
            .get(self.url("/bookings"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, "Failed to load bookings").await
    }

    async fn book_flight(&self, draft: &BookingDraft) -> ClientResult<String> {
        tracing::debug!(flight_id = %draft.flight_id, seat = %draft.seat, "POST / (booking form)");
        let response = self.client.post(self.url("/")).form(draft).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            let message = if text.trim().is_empty() {
                "Booking failed".to_string()
            } else {
                text
            };
            Err(ClientError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn find_booking(&self, booking_ref: &str, last_name: &str) -> ClientResult<Booking> {
        tracing::debug!(booking_ref, "GET /bookings/{{ref}}");
        let path = format!("/bookings/{}", urlencoding::encode(booking_ref));
        let response = self
            .client
            .get(self.url(&path))
            .query(&[("last_name", last_name)])
            .send()
            .await?;
        Self::read_json(response, "Booking not found").await
    }

    async fn complete_checkin(&self, request: &CheckinRequest) -> ClientResult<CheckinResponse> {
        tracing::debug!(flight_id = request.flight_id, "POST /checkin");
        let response = self
            .client
            .post(self.url("/checkin"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response, "Check-in failed").await
    }
}
