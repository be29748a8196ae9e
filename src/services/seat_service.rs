use async_trait::async_trait;

use crate::utils::error::ClientResult;

/// Where the booking panel gets its seat list from.
///
/// The backend has no seat-availability endpoint yet, so the only implementation
/// is [`SimulatedSeatMap`]; a real one slots in behind the same trait.
#[async_trait]
pub trait SeatSource: Send + Sync {
    async fn available_seats(&self, flight_id: i64) -> ClientResult<Vec<String>>;
}

/// Fixed cabin: rows 1-6, seats A then B.
#[derive(Debug, Clone)]
pub struct SimulatedSeatMap {
    rows: u32,
    letters: Vec<char>,
}

impl Default for SimulatedSeatMap {
    fn default() -> Self {
        SimulatedSeatMap {
            rows: 6,
            letters: vec!['A', 'B'],
        }
    }
}

impl SimulatedSeatMap {
    pub fn new(rows: u32, letters: Vec<char>) -> Self {
        SimulatedSeatMap { rows, letters }
    }

    pub fn seats(&self) -> Vec<String> {
        self.letters
            .iter()
            .flat_map(|letter| (1..=self.rows).map(move |row| format!("{}{}", row, letter)))
            .collect()
    }
}

#[async_trait]
impl SeatSource for SimulatedSeatMap {
    async fn available_seats(&self, _flight_id: i64) -> ClientResult<Vec<String>> {
        Ok(self.seats())
    }
}
