use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Observable stage of the purchase saga.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    Searching,
    RouteListed,
    SeatSelection,
    BookingConfirmed,
    Completed,
}

/// A confirmed selection on its way to the hold step. Created once when
/// the user confirms, consumed exactly once by the hold request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub route_code: String,
    pub seat_codes: Vec<String>,
    pub travel_date: NaiveDate,
    pub unit_price: u64,
    pub total_price: u64,
}

impl BookingDraft {
    pub fn new(
        route_code: String,
        seat_codes: Vec<String>,
        travel_date: NaiveDate,
        unit_price: u64,
    ) -> Self {
        let total_price = unit_price * seat_codes.len() as u64;
        Self { route_code, seat_codes, travel_date, unit_price, total_price }
    }

    pub fn seat_count(&self) -> usize {
        self.seat_codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_total_is_unit_times_count() {
        let draft = BookingDraft::new(
            "TX001".to_string(),
            vec!["A01".to_string(), "A03".to_string()],
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            100000,
        );
        assert_eq!(draft.seat_count(), 2);
        assert_eq!(draft.total_price, 200000);
    }
}
