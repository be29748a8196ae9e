//! Raw form values as the page hands them over, and their validation.
//!
//! Validation never touches the network: a form that fails here is answered
//! with [`ClientError::Validation`] and the request is not sent.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use validator::Validate;

use crate::models::booking::BookingDraft;
use crate::models::flight::FlightSearchRequest;
use crate::models::user::{UserLoginRequest, UserRegistrationRequest};
use crate::utils::error::{ClientError, ClientResult};

pub const SELECT_BOTH_AIRPORTS: &str = "Please select both departure and arrival airports";
pub const AIRPORTS_MUST_DIFFER: &str = "Departure and arrival airports must be different";
pub const INVALID_DATE_FORMAT: &str = "Invalid date format. Please use YYYY-MM-DD";

// Wire format expected by /flights/search
const SEARCH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_TIME_INPUTS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

#[derive(Debug, Clone, Default, Validate)]
pub struct SearchForm {
    #[validate(length(min = 1, message = "Please select both departure and arrival airports"))]
    pub departure: String,
    #[validate(length(min = 1, message = "Please select both departure and arrival airports"))]
    pub arrival: String,
    pub date: String,
}

impl SearchForm {
    pub fn new(departure: &str, arrival: &str, date: &str) -> Self {
        SearchForm {
            departure: trimmed(departure),
            arrival: trimmed(arrival),
            date: trimmed(date),
        }
    }

    /// `input_offset` is the zone the user typed a date-time input in.
    pub fn to_request(&self, input_offset: FixedOffset) -> ClientResult<FlightSearchRequest> {
        self.validate()
            .map_err(|e| ClientError::from_validation(&e, &["departure", "arrival"]))?;

        let departure = parse_airport_id(&self.departure)?;
        let arrival = parse_airport_id(&self.arrival)?;
        if departure == arrival {
            return Err(ClientError::Validation(AIRPORTS_MUST_DIFFER.into()));
        }
        let departure_time = parse_search_date(&self.date, input_offset)?
            .format(SEARCH_TIME_FORMAT)
            .to_string();

        Ok(FlightSearchRequest::planned(departure, arrival, departure_time))
    }
}

// Selector value; an empty or zero value means nothing was chosen
fn parse_airport_id(value: &str) -> ClientResult<i64> {
    match value.parse::<i64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ClientError::Validation(SELECT_BOTH_AIRPORTS.into())),
    }
}

/// A bare date means midnight and is sent as that calendar date. A date-time
/// input is local to `input_offset` and is converted to UTC.
pub fn parse_search_date(value: &str, input_offset: FixedOffset) -> ClientResult<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }
    DATE_TIME_INPUTS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(|local| local.and_local_timezone(input_offset).single())
        .map(|aware| aware.naive_utc())
        .ok_or_else(|| ClientError::Validation(INVALID_DATE_FORMAT.into()))
}

#[derive(Debug, Clone, Default, Validate)]
pub struct BookingForm {
    #[validate(length(min = 1, message = "Please enter the passenger name"))]
    pub passenger_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "No flight selected"))]
    pub flight_id: String,
    #[validate(length(min = 1, message = "Please select a seat"))]
    pub seat: String,
}

impl BookingForm {
    pub fn new(passenger_name: &str, email: &str, flight_id: &str, seat: &str) -> Self {
        BookingForm {
            passenger_name: trimmed(passenger_name),
            email: trimmed(email),
            flight_id: trimmed(flight_id),
            seat: trimmed(seat),
        }
    }

    pub fn to_draft(&self) -> ClientResult<BookingDraft> {
        self.validate().map_err(|e| {
            ClientError::from_validation(&e, &["passenger_name", "email", "seat", "flight_id"])
        })?;
        Ok(BookingDraft {
            passenger_name: self.passenger_name.clone(),
            email: self.email.clone(),
            flight_id: self.flight_id.clone(),
            seat: self.seat.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please enter both email and password"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter both email and password"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        LoginForm {
            email: trimmed(email),
            password: password.to_string(),
        }
    }

    pub fn to_request(&self) -> ClientResult<UserLoginRequest> {
        self.validate()
            .map_err(|e| ClientError::from_validation(&e, &["email", "password"]))?;
        Ok(UserLoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    pub password: String,
}

impl RegisterForm {
    pub fn new(full_name: &str, email: &str, phone: &str, password: &str) -> Self {
        RegisterForm {
            full_name: trimmed(full_name),
            email: trimmed(email),
            phone: trimmed(phone),
            password: password.to_string(),
        }
    }

    pub fn to_request(&self) -> ClientResult<UserRegistrationRequest> {
        self.validate().map_err(|e| {
            ClientError::from_validation(&e, &["full_name", "email", "password"])
        })?;
        Ok(UserRegistrationRequest {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct CheckinLookupForm {
    #[validate(length(min = 1, message = "Please enter both booking reference and last name"))]
    pub booking_ref: String,
    #[validate(length(min = 1, message = "Please enter both booking reference and last name"))]
    pub last_name: String,
}

impl CheckinLookupForm {
    pub fn new(booking_ref: &str, last_name: &str) -> Self {
        CheckinLookupForm {
            booking_ref: trimmed(booking_ref),
            last_name: trimmed(last_name),
        }
    }

    pub fn check(&self) -> ClientResult<()> {
        self.validate()
            .map_err(|e| ClientError::from_validation(&e, &["booking_ref", "last_name"]))
    }
}
