use strum_macros::Display;

/// Search region: Idle -> Searching -> ResultsShown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    ResultsShown,
}

/// Booking panel: opened from a search result, confirmed on a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum BookingState {
    #[default]
    Closed,
    Open { flight_id: i64 },
    Submitting { flight_id: i64 },
    Confirmed { flight_id: i64 },
}

impl BookingState {
    pub fn flight_id(&self) -> Option<i64> {
        match self {
            BookingState::Closed => None,
            BookingState::Open { flight_id }
            | BookingState::Submitting { flight_id }
            | BookingState::Confirmed { flight_id } => Some(*flight_id),
        }
    }
}

/// Check-in region: Idle -> Lookup -> Candidates -> Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum CheckinState {
    #[default]
    Idle,
    Lookup,
    Candidates,
    Completing,
    Complete,
}

/// Seat selector inside the booking panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeatListState {
    #[default]
    Empty,
    Loading,
    Ready(Vec<String>),
    Failed(String),
}
