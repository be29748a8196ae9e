//! Fragment builders: data in, HTML plus clickable actions out.
//!
//! Every builder returns the complete content of its region. Callers replace the
//! region with it, so rendering the same data twice yields the same page.

use rust_decimal::Decimal;

use crate::controller::state::SeatListState;
use crate::models::booking::{BookedFlight, Booking};
use crate::models::flight::Flight;
use crate::models::user::User;
use crate::utils::format::{AirportDirectory, Formatter};
use crate::utils::html::escape;
use crate::view::page::{Fragment, UiAction};

pub const NO_FLIGHTS_MESSAGE: &str = "No flights found for selected criteria";
pub const NO_BOOKINGS_MESSAGE: &str = "You have no bookings yet";
pub const SIGNED_OUT_BOOKINGS_MESSAGE: &str = "Please sign in to view your bookings";
pub const BOOKINGS_ERROR_MESSAGE: &str = "Error loading bookings";
pub const CHECKIN_SUCCESS_MESSAGE: &str =
    "Check-in successful! Your boarding pass has been sent to your email.";

// Illustrative only; the backend does not assign these
const PLACEHOLDER_TERMINAL: &str = "D";
const PLACEHOLDER_GATE: &str = "12";
const PLACEHOLDER_BOARDING: &str = "40 min before departure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
    Info,
}

impl BannerKind {
    fn class(self) -> &'static str {
        match self {
            BannerKind::Error => "error-message",
            BannerKind::Success => "success-message",
            BannerKind::Info => "info-message",
        }
    }
}

pub fn banner(kind: BannerKind, message: &str) -> Fragment {
    Fragment::new(format!(
        r#"<div class="{}">{}</div>"#,
        kind.class(),
        escape(message)
    ))
}

pub fn loading(message: &str) -> Fragment {
    Fragment::new(format!(r#"<div class="loader">{}</div>"#, escape(message)))
}

pub fn airport_options(directory: &AirportDirectory) -> Fragment {
    let mut html = String::from(r#"<option value="">Select airport</option>"#);
    for airport in directory.iter() {
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            airport.id,
            escape(&airport.option_label())
        ));
    }
    Fragment::new(html)
}

// Missing times render like unparsable ones
fn timestamp(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn flight_card(flight: &Flight, directory: &AirportDirectory, fmt: &Formatter) -> String {
    let plane = flight
        .plane_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let price = flight
        .price
        .map(|price| format!(r#"<span class="price">{}</span>"#, format_price(price)))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<div class="flight-card">"#,
            r#"<div class="flight-header"><span>Flight #{id}</span><span>Plane ID: {plane}</span></div>"#,
            r#"<div class="flight-route">"#,
            r#"<div class="departure"><strong>From:</strong><span>{from}</span><span>{departs}</span></div>"#,
            r#"<div class="arrival"><strong>To:</strong><span>{to}</span><span>{arrives}</span></div>"#,
            r#"</div>"#,
            r#"<div class="flight-footer"><span>Status: {status}</span>{price}"#,
            r#"<button class="book-flight-btn" {action}>Book Now</button></div>"#,
            r#"</div>"#
        ),
        id = flight.id,
        plane = escape(&plane),
        from = escape(&directory.label(flight.departure_airport_id)),
        departs = escape(&fmt.format_date_time(timestamp(&flight.departure_time))),
        to = escape(&directory.label(flight.arrival_airport_id)),
        arrives = escape(&fmt.format_date_time(timestamp(&flight.arrival_time))),
        status = escape(&flight.status.to_string()),
        price = price,
        action = UiAction::BookFlight(flight.id).attributes(),
    )
}

/// An empty result is a message, not an error.
pub fn flight_results(flights: &[Flight], directory: &AirportDirectory, fmt: &Formatter) -> Fragment {
    if flights.is_empty() {
        return Fragment::new(format!(r#"<p class="no-flights">{}</p>"#, NO_FLIGHTS_MESSAGE));
    }
    let html = flights
        .iter()
        .map(|flight| flight_card(flight, directory, fmt))
        .collect::<String>();
    let actions = flights.iter().map(|f| UiAction::BookFlight(f.id)).collect();
    Fragment::with_actions(html, actions)
}

pub fn format_price(price: Decimal) -> String {
    format!("${}", price.normalize())
}

/// `"Kyiv (KBP) → London (LHR), 6/15/2025 at 08:00 AM"`
pub fn flight_summary(flight: &Flight, directory: &AirportDirectory, fmt: &Formatter) -> Fragment {
    Fragment::new(escape(&format!(
        "{} → {}, {} at {}",
        directory.label(flight.departure_airport_id),
        directory.label(flight.arrival_airport_id),
        fmt.format_date(timestamp(&flight.departure_time)),
        fmt.format_time(timestamp(&flight.departure_time)),
    )))
}

pub fn booking_price(price: Option<Decimal>) -> Fragment {
    match price {
        Some(price) => Fragment::new(escape(&format_price(price))),
        None => Fragment::default(),
    }
}

pub fn seat_options(state: &SeatListState) -> Fragment {
    let html = match state {
        SeatListState::Loading => r#"<option value="">Loading...</option>"#.to_string(),
        SeatListState::Empty => r#"<option value="">No seats available</option>"#.to_string(),
        SeatListState::Failed(message) => format!(
            r#"<option value="">Seats unavailable: {}</option>"#,
            escape(message)
        ),
        SeatListState::Ready(seats) => {
            let mut html = String::from(r#"<option value="">Select seat</option>"#);
            for seat in seats {
                let seat = escape(seat);
                html.push_str(&format!(r#"<option value="{0}">{0}</option>"#, seat));
            }
            html
        }
    };
    Fragment::new(html)
}

pub fn profile(user: &User) -> Fragment {
    let phone = user
        .phone
        .as_deref()
        .filter(|phone| !phone.trim().is_empty())
        .unwrap_or("Not provided");
    Fragment::new(format!(
        concat!(
            r#"<div class="profile">"#,
            r#"<p id="userName">{}</p><p id="userEmail">{}</p><p id="userPhone">{}</p>"#,
            r#"</div>"#
        ),
        escape(&user.full_name),
        escape(&user.email),
        escape(phone)
    ))
}

fn route(from: Option<&str>, to: Option<&str>) -> String {
    format!("{} → {}", from.unwrap_or("?"), to.unwrap_or("?"))
}

fn when(departure_time: Option<&str>, fmt: &Formatter) -> String {
    match departure_time {
        Some(time) => format!("{} at {}", fmt.format_date(time), fmt.format_time(time)),
        None => String::new(),
    }
}

pub fn booking_list(bookings: &[Booking], fmt: &Formatter) -> Fragment {
    if bookings.is_empty() {
        return Fragment::new(format!("<p>{}</p>", NO_BOOKINGS_MESSAGE));
    }
    let mut html = String::new();
    for booking in bookings {
        html.push_str(&format!(
            concat!(
                r#"<div class="flight-card booking-card">"#,
                r#"<div class="booking-header"><h3>{route}</h3><p>{when}</p><span class="status">{status}</span></div>"#,
                r#"<div class="booking-footer"><p>Seat: {seat}</p><p>Booking Ref: {reference}</p>"#,
                r#"<button class="checkin-btn" {action}>Check-in</button></div>"#,
                r#"</div>"#
            ),
            route = escape(&route(
                booking.departure_airport_code.as_deref(),
                booking.arrival_airport_code.as_deref()
            )),
            when = escape(&when(booking.departure_time.as_deref(), fmt)),
            status = escape(&booking.status.to_string()),
            seat = escape(&booking.seat_number),
            reference = escape(&booking.booking_ref),
            action = UiAction::StartCheckin(booking.id).attributes(),
        ));
    }
    let actions = bookings.iter().map(|b| UiAction::StartCheckin(b.id)).collect();
    Fragment::with_actions(html, actions)
}

fn checkin_card(flight: &BookedFlight, fmt: &Formatter) -> String {
    format!(
        concat!(
            r#"<div class="flight-card checkin-card">"#,
            r#"<div class="booking-header"><h3>{route}</h3><p>{when}</p><span class="status">{status}</span></div>"#,
            r#"<div class="booking-footer"><p>Seat: {seat}</p>"#,
            r#"<button class="complete-checkin-btn" {action}>Complete Check-in</button></div>"#,
            r#"</div>"#
        ),
        route = escape(&route(
            flight.departure_airport_code.as_deref(),
            flight.arrival_airport_code.as_deref()
        )),
        when = escape(&when(flight.departure_time.as_deref(), fmt)),
        status = escape(&flight.status.to_string()),
        seat = escape(&flight.seat_number),
        action = UiAction::CompleteCheckin(flight.id).attributes(),
    )
}

pub fn checkin_candidates(booking: &Booking, fmt: &Formatter) -> Fragment {
    if booking.flights.is_empty() {
        return Fragment::new("<p>No flights on this booking are open for check-in</p>");
    }
    let html = booking
        .flights
        .iter()
        .map(|flight| checkin_card(flight, fmt))
        .collect::<String>();
    let actions = booking
        .flights
        .iter()
        .map(|f| UiAction::CompleteCheckin(f.id))
        .collect();
    Fragment::with_actions(html, actions)
}

pub fn boarding_pass(passenger: &str, flight_id: i64, seat: &str, date: &str) -> Fragment {
    Fragment::new(format!(
        concat!(
            r#"<div class="boarding-pass">"#,
            r#"<h3>Boarding Pass</h3>"#,
            r#"<p>Passenger: {passenger}</p><p>Flight: #{flight}</p><p>Seat: {seat}</p><p>Date: {date}</p>"#,
            r#"<p>Terminal: {terminal}</p><p>Gate: {gate}</p><p>Boarding: {boarding}</p>"#,
            r#"</div>"#
        ),
        passenger = escape(passenger),
        flight = flight_id,
        seat = escape(seat),
        date = escape(date),
        terminal = PLACEHOLDER_TERMINAL,
        gate = PLACEHOLDER_GATE,
        boarding = PLACEHOLDER_BOARDING,
    ))
}
