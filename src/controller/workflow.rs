//! The user journey: search -> book, sign in -> bookings, look up -> check in.
//!
//! Each workflow region (search, booking, seats, auth, bookings, check-in) keeps its
//! own state and its own [`RequestSequence`], so regions can have requests in
//! flight at the same time while a late response inside one region can never
//! overwrite a newer one. Every failure is turned into a message on the page at
//! the handler that triggered it; nothing is retried.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::controller::forms::{BookingForm, CheckinLookupForm, LoginForm, RegisterForm, SearchForm};
use crate::controller::sequence::{RequestSequence, Ticket};
use crate::controller::state::{BookingState, CheckinState, SearchState, SeatListState};
use crate::models::booking::{Booking, CheckinRequest};
use crate::models::flight::Flight;
use crate::models::user::{AuthResponse, User};
use crate::services::gateway::{FlightApi, HttpGateway};
use crate::services::seat_service::{SeatSource, SimulatedSeatMap};
use crate::services::session::{AuthStatus, FileSessionStore, Session};
use crate::utils::error::{ClientError, ClientResult};
use crate::utils::format::{AirportDirectory, Formatter};
use crate::view::page::{Fragment, Page, Region, UiAction};
use crate::view::render::{self, BannerKind};

pub const LOADING_FLIGHTS: &str = "Loading flights...";

#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings {
    pub booking_close_delay: Duration,
    pub formatter: Formatter,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            booking_close_delay: Duration::from_secs(3),
            formatter: Formatter::utc(),
        }
    }
}

#[derive(Debug, Default)]
struct RegionStates {
    search: SearchState,
    results: Vec<Flight>,
    booking: BookingState,
    seats: SeatListState,
    bookings: Vec<Booking>,
    checkin: CheckinState,
    checkin_booking: Option<Booking>,
    checkin_last_name: String,
    pending_checkin_ref: Option<String>,
}

struct Inner {
    api: Arc<dyn FlightApi>,
    seat_source: Arc<dyn SeatSource>,
    session: Session,
    settings: WorkflowSettings,
    // Lock order: page, then states, then airports
    page: Mutex<Page>,
    states: Mutex<RegionStates>,
    airports: Mutex<AirportDirectory>,
    search_seq: RequestSequence,
    booking_seq: RequestSequence,
    seat_seq: RequestSequence,
    auth_seq: RequestSequence,
    bookings_seq: RequestSequence,
    checkin_seq: RequestSequence,
}

/// Cheap to clone; clones share the same page, state and session.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WorkflowController {
    pub fn new(
        api: Arc<dyn FlightApi>,
        seat_source: Arc<dyn SeatSource>,
        session: Session,
        settings: WorkflowSettings,
    ) -> Self {
        WorkflowController {
            inner: Arc::new(Inner {
                api,
                seat_source,
                session,
                settings,
                page: Mutex::new(Page::new()),
                states: Mutex::new(RegionStates::default()),
                airports: Mutex::new(AirportDirectory::default()),
                search_seq: RequestSequence::new(),
                booking_seq: RequestSequence::new(),
                seat_seq: RequestSequence::new(),
                auth_seq: RequestSequence::new(),
                bookings_seq: RequestSequence::new(),
                checkin_seq: RequestSequence::new(),
            }),
        }
    }

    /// HTTP gateway, file-backed session and the simulated seat map.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let gateway = HttpGateway::new(&config.api_base_url, config.request_timeout)?;
        let session = Session::new(Box::new(FileSessionStore::new(&config.session_file)));
        Ok(Self::new(
            Arc::new(gateway),
            Arc::new(SimulatedSeatMap::default()),
            session,
            WorkflowSettings {
                booking_close_delay: config.booking_close_delay,
                formatter: Formatter::new(config.display_offset),
            },
        ))
    }

    fn with_page<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        f(&mut lock(&self.inner.page))
    }

    fn with_states<R>(&self, f: impl FnOnce(&mut RegionStates) -> R) -> R {
        f(&mut lock(&self.inner.states))
    }

    fn update<R>(&self, f: impl FnOnce(&mut Page, &mut RegionStates) -> R) -> R {
        let mut page = lock(&self.inner.page);
        let mut states = lock(&self.inner.states);
        f(&mut page, &mut states)
    }

    fn formatter(&self) -> &Formatter {
        &self.inner.settings.formatter
    }

    fn show_error(page: &mut Page, region: Region, error: &ClientError) {
        page.replace(region, render::banner(BannerKind::Error, &error.user_message()));
    }

    // ---- observers ----

    pub fn page(&self) -> Page {
        lock(&self.inner.page).clone()
    }

    pub fn search_state(&self) -> SearchState {
        self.with_states(|s| s.search)
    }

    pub fn booking_state(&self) -> BookingState {
        self.with_states(|s| s.booking)
    }

    pub fn seat_state(&self) -> SeatListState {
        self.with_states(|s| s.seats.clone())
    }

    pub fn checkin_state(&self) -> CheckinState {
        self.with_states(|s| s.checkin)
    }

    /// Reference of the booking whose "Check-in" button was pressed last.
    pub fn pending_checkin_reference(&self) -> Option<String> {
        self.with_states(|s| s.pending_checkin_ref.clone())
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.inner.session.status()
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<AuthStatus> {
        self.inner.session.subscribe()
    }

    pub fn airports(&self) -> AirportDirectory {
        lock(&self.inner.airports).clone()
    }

    // ---- page load ----

    /// Populate the airport selectors and restore a stored session.
    pub async fn start(&self) {
        self.load_airports().await;
        if self.inner.session.token().is_some() {
            self.refresh_profile().await;
        } else {
            self.show_signed_out();
        }
    }

    pub async fn load_airports(&self) {
        match self.inner.api.list_airports().await {
            Ok(airports) => {
                let options = {
                    let mut directory = lock(&self.inner.airports);
                    directory.replace(airports);
                    render::airport_options(&directory)
                };
                tracing::info!("Airports loaded");
                self.with_page(|page| {
                    page.replace(Region::DepartureOptions, options.clone());
                    page.replace(Region::ArrivalOptions, options);
                });
            }
            Err(e) => tracing::warn!(error = %e, "Error loading airports"),
        }
    }

    // ---- search ----

    pub async fn submit_search(&self, form: SearchForm) {
        let request = match form.to_request(self.formatter().display_offset()) {
            Ok(request) => request,
            Err(e) => {
                self.inner.search_seq.invalidate();
                self.update(|page, states| {
                    Self::show_error(page, Region::SearchResults, &e);
                    states.search = SearchState::Idle;
                });
                return;
            }
        };

        let ticket = self.inner.search_seq.issue();
        self.update(|page, states| {
            page.replace(Region::SearchResults, render::loading(LOADING_FLIGHTS));
            states.search = SearchState::Searching;
        });

        let result = self.inner.api.search_flights(&request).await;
        if !self.inner.search_seq.is_current(ticket) {
            tracing::debug!(ticket = ticket.number(), "Discarding stale search response");
            return;
        }

        match result {
            Ok(flights) => {
                let fragment = {
                    let directory = lock(&self.inner.airports);
                    render::flight_results(&flights, &directory, self.formatter())
                };
                self.update(|page, states| {
                    page.replace(Region::SearchResults, fragment);
                    states.results = flights;
                    states.search = SearchState::ResultsShown;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Flight search error");
                self.update(|page, states| {
                    Self::show_error(page, Region::SearchResults, &e);
                    states.results.clear();
                    states.search = SearchState::Idle;
                });
            }
        }
    }

    // ---- booking ----

    pub async fn open_booking(&self, flight_id: i64) {
        let flight = self.with_states(|s| s.results.iter().find(|f| f.id == flight_id).cloned());
        let Some(flight) = flight else {
            tracing::warn!(flight_id, "Book requested for a flight that is not in the results");
            return;
        };

        // A confirmation still in flight belongs to the panel being replaced
        self.inner.booking_seq.invalidate();
        let ticket = self.inner.seat_seq.issue();
        let (summary, price) = {
            let directory = lock(&self.inner.airports);
            (
                render::flight_summary(&flight, &directory, self.formatter()),
                render::booking_price(flight.price),
            )
        };
        self.update(|page, states| {
            page.replace(Region::FlightInfo, summary);
            page.replace(Region::BookingPrice, price);
            page.clear(Region::BookingMessage);
            page.replace(Region::SeatSelection, render::seat_options(&SeatListState::Loading));
            page.show(Region::BookingPanel);
            states.booking = BookingState::Open { flight_id };
            states.seats = SeatListState::Loading;
        });

        let result = self.inner.seat_source.available_seats(flight_id).await;
        if !self.inner.seat_seq.is_current(ticket) {
            tracing::debug!(flight_id, "Discarding seat list for a replaced booking panel");
            return;
        }
        let seats = match result {
            Ok(seats) if seats.is_empty() => SeatListState::Empty,
            Ok(seats) => SeatListState::Ready(seats),
            Err(e) => {
                tracing::warn!(flight_id, error = %e, "Failed to load seats");
                SeatListState::Failed(e.user_message())
            }
        };
        self.update(|page, states| {
            page.replace(Region::SeatSelection, render::seat_options(&seats));
            states.seats = seats;
        });
    }

    /// Flight the open booking panel is for; the form's hidden flight id.
    pub fn booking_flight_id(&self) -> Option<i64> {
        self.with_states(|s| s.booking.flight_id())
    }

    pub async fn submit_booking(&self, mut form: BookingForm) {
        let flight_id = match self.booking_state() {
            BookingState::Open { flight_id } | BookingState::Confirmed { flight_id } => flight_id,
            BookingState::Submitting { .. } => {
                tracing::debug!("Booking already being submitted");
                return;
            }
            BookingState::Closed => {
                tracing::warn!("Booking submitted with no booking panel open");
                return;
            }
        };

        // The open panel decides which flight is booked
        let panel_flight = flight_id.to_string();
        if form.flight_id != panel_flight {
            tracing::debug!(flight_id, form_flight_id = %form.flight_id, "Booking form names another flight");
            form.flight_id = panel_flight;
        }

        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.with_page(|page| Self::show_error(page, Region::BookingMessage, &e));
                return;
            }
        };

        let ticket = self.inner.booking_seq.issue();
        self.with_states(|s| s.booking = BookingState::Submitting { flight_id });

        let result = self.inner.api.book_flight(&draft).await;
        if !self.inner.booking_seq.is_current(ticket) {
            tracing::info!(flight_id, "Booking response arrived after its panel was replaced");
            return;
        }

        match result {
            Ok(confirmation) => {
                tracing::info!(flight_id, seat = %draft.seat, "Booking confirmed");
                self.update(|page, states| {
                    page.replace(
                        Region::BookingMessage,
                        render::banner(BannerKind::Success, &confirmation),
                    );
                    states.booking = BookingState::Confirmed { flight_id };
                });
                self.schedule_booking_close(ticket);
            }
            Err(e) => {
                tracing::warn!(flight_id, error = %e, "Error booking flight");
                self.update(|page, states| {
                    Self::show_error(page, Region::BookingMessage, &e);
                    states.booking = BookingState::Open { flight_id };
                });
            }
        }
    }

    fn schedule_booking_close(&self, ticket: Ticket) {
        let controller = self.clone();
        let delay = self.inner.settings.booking_close_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if controller.inner.booking_seq.is_current(ticket) {
                controller.hide_booking_panel();
            }
        });
    }

    fn hide_booking_panel(&self) {
        self.update(|page, states| {
            page.hide(Region::BookingPanel);
            states.booking = BookingState::Closed;
        });
    }

    pub fn close_booking(&self) {
        self.inner.booking_seq.invalidate();
        self.inner.seat_seq.invalidate();
        self.hide_booking_panel();
    }

    // ---- auth ----

    pub async fn login(&self, form: LoginForm) {
        let request = match form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.with_page(|page| Self::show_error(page, Region::AuthMessage, &e));
                return;
            }
        };
        let ticket = self.inner.auth_seq.issue();
        let result = self.inner.api.login(&request).await;
        if self.inner.auth_seq.is_current(ticket) {
            self.finish_sign_in(result, "Login error").await;
        }
    }

    pub async fn register(&self, form: RegisterForm) {
        let request = match form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.with_page(|page| Self::show_error(page, Region::AuthMessage, &e));
                return;
            }
        };
        let ticket = self.inner.auth_seq.issue();
        let result = self.inner.api.register(&request).await;
        if self.inner.auth_seq.is_current(ticket) {
            self.finish_sign_in(result, "Registration error").await;
        }
    }

    async fn finish_sign_in(&self, result: ClientResult<AuthResponse>, context: &str) {
        let signed_in = result.and_then(|auth| {
            self.inner.session.sign_in(&auth.token, auth.user.clone())?;
            Ok(auth.user)
        });
        match signed_in {
            Ok(user) => {
                self.with_page(|page| page.clear(Region::AuthMessage));
                self.show_signed_in(&user);
                self.load_bookings().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "{}", context);
                self.with_page(|page| Self::show_error(page, Region::AuthMessage, &e));
            }
        }
    }

    /// Re-validate the stored token. Any failure ends the session; it is not retried.
    pub async fn refresh_profile(&self) {
        let Some(token) = self.inner.session.token() else {
            self.show_signed_out();
            return;
        };
        let ticket = self.inner.auth_seq.issue();
        let result = self.inner.api.fetch_profile(&token).await;
        if !self.inner.auth_seq.is_current(ticket) {
            return;
        }
        match result {
            Ok(user) => {
                self.inner.session.confirm(user.clone());
                self.show_signed_in(&user);
                self.load_bookings().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching user profile; signing out");
                self.logout();
            }
        }
    }

    pub fn logout(&self) {
        self.inner.auth_seq.invalidate();
        self.inner.bookings_seq.invalidate();
        self.inner.session.sign_out();
        self.show_signed_out();
    }

    fn show_signed_in(&self, user: &User) {
        self.with_page(|page| {
            page.hide(Region::AuthSection);
            page.replace(Region::UserProfile, render::profile(user));
            page.show(Region::UserProfile);
        });
    }

    fn show_signed_out(&self) {
        self.update(|page, states| {
            page.show(Region::AuthSection);
            page.hide(Region::UserProfile);
            page.clear(Region::UserProfile);
            page.replace(
                Region::UserBookings,
                Fragment::new(format!("<p>{}</p>", render::SIGNED_OUT_BOOKINGS_MESSAGE)),
            );
            states.bookings.clear();
        });
    }

    pub async fn load_bookings(&self) {
        let Some(token) = self.inner.session.token() else {
            self.show_signed_out();
            return;
        };
        let ticket = self.inner.bookings_seq.issue();
        let result = self.inner.api.list_bookings(&token).await;
        if !self.inner.bookings_seq.is_current(ticket) {
            tracing::debug!("Discarding stale bookings response");
            return;
        }
        match result {
            Ok(bookings) => {
                let fragment = render::booking_list(&bookings, self.formatter());
                self.update(|page, states| {
                    page.replace(Region::UserBookings, fragment);
                    states.bookings = bookings;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error loading bookings");
                self.update(|page, states| {
                    page.replace(
                        Region::UserBookings,
                        Fragment::new(format!(
                            r#"<p class="error-message">{}</p>"#,
                            render::BOOKINGS_ERROR_MESSAGE
                        )),
                    );
                    states.bookings.clear();
                });
            }
        }
    }

    // ---- check-in ----

    /// "Check-in" on one of the signed-in user's bookings.
    pub fn start_checkin(&self, booking_id: i64) {
        self.update(|page, states| {
            let reference = states
                .bookings
                .iter()
                .find(|b| b.id == booking_id)
                .map(|b| b.booking_ref.clone());
            states.pending_checkin_ref = reference;
            page.replace(
                Region::CheckinMessage,
                render::banner(
                    BannerKind::Info,
                    &format!("Starting check-in process for booking {}", booking_id),
                ),
            );
        });
    }

    pub async fn find_booking(&self, form: CheckinLookupForm) {
        if let Err(e) = form.check() {
            self.with_page(|page| Self::show_error(page, Region::CheckinMessage, &e));
            return;
        }

        let ticket = self.inner.checkin_seq.issue();
        self.with_states(|s| s.checkin = CheckinState::Lookup);

        let result = self
            .inner
            .api
            .find_booking(&form.booking_ref, &form.last_name)
            .await;
        if !self.inner.checkin_seq.is_current(ticket) {
            tracing::debug!("Discarding stale booking lookup");
            return;
        }

        match result {
            Ok(booking) => {
                let fragment = render::checkin_candidates(&booking, self.formatter());
                self.update(|page, states| {
                    page.clear(Region::CheckinMessage);
                    page.replace(Region::FlightsToCheckin, fragment);
                    page.show(Region::CheckinResults);
                    page.hide(Region::BoardingPass);
                    states.checkin_booking = Some(booking);
                    states.checkin_last_name = form.last_name.clone();
                    states.checkin = CheckinState::Candidates;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error finding booking");
                self.update(|page, states| {
                    Self::show_error(page, Region::CheckinMessage, &e);
                    states.checkin = Self::settled_checkin(page, states);
                });
            }
        }
    }

    pub async fn complete_checkin(&self, flight_id: i64) {
        let leg = self.with_states(|s| {
            if s.checkin != CheckinState::Candidates {
                return None;
            }
            let leg = s
                .checkin_booking
                .as_ref()?
                .flights
                .iter()
                .find(|f| f.id == flight_id)
                .cloned()?;
            s.checkin = CheckinState::Completing;
            Some((leg, s.checkin_last_name.clone()))
        });
        let Some((leg, passenger)) = leg else {
            tracing::warn!(flight_id, "Check-in requested for a flight that is not a candidate");
            return;
        };

        let ticket = self.inner.checkin_seq.issue();
        let result = self
            .inner
            .api
            .complete_checkin(&CheckinRequest { flight_id })
            .await
            .and_then(|response| match response.success {
                Some(false) => Err(ClientError::Server {
                    status: 200,
                    message: response
                        .message
                        .unwrap_or_else(|| "Check-in failed".to_string()),
                }),
                _ => Ok(response),
            });
        if !self.inner.checkin_seq.is_current(ticket) {
            tracing::debug!("Discarding stale check-in response");
            self.update(|page, states| {
                if states.checkin == CheckinState::Completing {
                    states.checkin = Self::settled_checkin(page, states);
                }
            });
            return;
        }

        match result {
            Ok(_) => {
                tracing::info!(flight_id, "Check-in complete");
                let date = leg
                    .departure_time
                    .as_deref()
                    .map(|time| self.formatter().format_date(time))
                    .unwrap_or_default();
                let pass = render::boarding_pass(&passenger, flight_id, &leg.seat_number, &date);
                self.update(|page, states| {
                    page.hide(Region::CheckinResults);
                    page.replace(
                        Region::CheckinMessage,
                        render::banner(BannerKind::Success, render::CHECKIN_SUCCESS_MESSAGE),
                    );
                    page.replace(Region::BoardingPass, pass);
                    page.show(Region::BoardingPass);
                    states.checkin = CheckinState::Complete;
                });
            }
            Err(e) => {
                tracing::warn!(flight_id, error = %e, "Error completing check-in");
                self.update(|page, states| {
                    Self::show_error(page, Region::CheckinMessage, &e);
                    states.checkin = CheckinState::Candidates;
                });
            }
        }
    }

    /// State to fall back to once no check-in request is pending: the candidate
    /// list if it is still on screen, otherwise idle.
    fn settled_checkin(page: &Page, states: &RegionStates) -> CheckinState {
        match states.checkin {
            CheckinState::Lookup | CheckinState::Completing => {
                if states.checkin_booking.is_some() && page.is_shown(Region::CheckinResults) {
                    CheckinState::Candidates
                } else {
                    CheckinState::Idle
                }
            }
            settled => settled,
        }
    }

    // ---- delegated clicks ----

    /// Single entry point for clicks on rendered buttons. Actions whose button is
    /// not currently on the page are ignored; returns whether the action ran.
    pub async fn dispatch(&self, action: UiAction) -> bool {
        let region = self.with_page(|page| page.region_of(action));
        if region.is_none() {
            tracing::debug!(action = action.name(), id = action.id(), "Ignoring action not on the page");
            return false;
        }
        match action {
            UiAction::BookFlight(flight_id) => self.open_booking(flight_id).await,
            UiAction::StartCheckin(booking_id) => self.start_checkin(booking_id),
            UiAction::CompleteCheckin(flight_id) => self.complete_checkin(flight_id).await,
        }
        true
    }

    /// [`dispatch`](Self::dispatch) from the clicked element's `data-action` and
    /// `data-id` attributes.
    pub async fn dispatch_attributes(&self, action: &str, id: &str) -> bool {
        match UiAction::from_attributes(action, id) {
            Some(action) => self.dispatch(action).await,
            None => false,
        }
    }
}
