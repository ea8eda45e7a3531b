use std::collections::HashSet;

use vexe_core::route::Route;

/// The current user's in-progress set of chosen seats for one route/date.
/// Owned exclusively by the active browsing session; scoped to the route
/// whose layout is currently rendered.
#[derive(Debug)]
pub struct SelectionState {
    route_code: String,
    unit_price: u64,
    /// Chosen seat codes in the order they were picked.
    chosen: Vec<String>,
    /// Every seat code present in the rendered layout (stale-route guard).
    known: HashSet<String>,
    /// Seats observed booked or held. Permanently unselectable for the
    /// session; a hold conflict adds to this set.
    booked: HashSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Seat {0} is not part of the rendered layout")]
    UnknownSeat(String),
}

impl SelectionState {
    pub fn new(route: &Route, unit_price: u64) -> Self {
        let known = route.seats.iter().map(|s| s.code.clone()).collect();
        let booked = route
            .seats
            .iter()
            .filter(|s| !s.is_selectable())
            .map(|s| s.code.clone())
            .collect();
        Self { route_code: route.code.clone(), unit_price, chosen: Vec::new(), known, booked }
    }

    pub fn route_code(&self) -> &str {
        &self.route_code
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// Flip a seat between available and selected. Booked seats are
    /// ignored without a state change. A code outside the rendered
    /// layout is rejected outright.
    pub fn toggle(&mut self, seat_code: &str) -> Result<bool, SelectionError> {
        if !self.known.contains(seat_code) {
            return Err(SelectionError::UnknownSeat(seat_code.to_string()));
        }
        if self.booked.contains(seat_code) {
            return Ok(false);
        }
        if let Some(pos) = self.chosen.iter().position(|s| s == seat_code) {
            self.chosen.remove(pos);
        } else {
            self.chosen.push(seat_code.to_string());
        }
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    /// `unit price × chosen seats`; zero for an empty selection.
    pub fn total(&self) -> u64 {
        self.unit_price * self.chosen.len() as u64
    }

    pub fn selected(&self) -> &[String] {
        &self.chosen
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn is_booked(&self, seat_code: &str) -> bool {
        self.booked.contains(seat_code)
    }

    /// Apply a hold conflict: the rejected seats leave the selection and
    /// become booked for the rest of the session. The server's word is
    /// definitive here, not a condition to retry.
    pub fn mark_rejected(&mut self, rejected: &[String]) {
        for code in rejected {
            self.chosen.retain(|s| s != code);
            self.booked.insert(code.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexe_core::route::{ScheduleTag, Seat};

    fn route_with_seats(codes: &[(&str, bool)]) -> Route {
        Route {
            code: "TX001".to_string(),
            origin: "Hà Nội".to_string(),
            destination: "Đà Nẵng".to_string(),
            departure_time: None,
            arrival_time: None,
            duration: None,
            distance_km: 760.0,
            vehicle: None,
            fare: Some(100000),
            schedule: ScheduleTag::Daily,
            seats: codes
                .iter()
                .map(|(code, booked)| Seat { code: code.to_string(), booked: *booked, held: false })
                .collect(),
        }
    }

    #[test]
    fn test_toggle_and_total() {
        // Scenario A: A01..A05 available, unit price 100000
        let route = route_with_seats(&[
            ("A01", false),
            ("A02", false),
            ("A03", false),
            ("A04", false),
            ("A05", false),
        ]);
        let mut selection = SelectionState::new(&route, 100000);

        assert_eq!(selection.total(), 0);
        selection.toggle("A01").unwrap();
        selection.toggle("A03").unwrap();
        assert_eq!(selection.selected(), ["A01".to_string(), "A03".to_string()]);
        assert_eq!(selection.total(), 200000);

        // Toggle back off
        selection.toggle("A01").unwrap();
        assert_eq!(selection.selected(), ["A03".to_string()]);
        assert_eq!(selection.total(), 100000);
    }

    #[test]
    fn test_toggle_booked_seat_is_silent() {
        let route = route_with_seats(&[("A01", true), ("A02", false)]);
        let mut selection = SelectionState::new(&route, 100000);

        let changed = selection.toggle("A01").unwrap();
        assert!(!changed);
        assert!(selection.is_empty());
        assert_eq!(selection.total(), 0);
    }

    #[test]
    fn test_stale_route_guard() {
        let route = route_with_seats(&[("A01", false)]);
        let mut selection = SelectionState::new(&route, 100000);

        let err = selection.toggle("B07").unwrap_err();
        assert!(matches!(err, SelectionError::UnknownSeat(_)));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_mark_rejected_expunges_and_books() {
        // Scenario B: hold for [A01, A03] conflicts on A03
        let route = route_with_seats(&[("A01", false), ("A02", false), ("A03", false)]);
        let mut selection = SelectionState::new(&route, 100000);
        selection.toggle("A01").unwrap();
        selection.toggle("A03").unwrap();

        selection.mark_rejected(&["A03".to_string()]);

        assert_eq!(selection.selected(), ["A01".to_string()]);
        assert_eq!(selection.total(), 100000);
        assert!(selection.is_booked("A03"));
        // Reclassified booked: toggling it again stays silent
        assert!(!selection.toggle("A03").unwrap());
        assert_eq!(selection.selected(), ["A01".to_string()]);
    }

    #[test]
    fn test_booked_seats_never_enter_selection() {
        // Sweep a variety of booked patterns across a full 34-seat coach
        for stride in 2..6 {
            let codes: Vec<(String, bool)> =
                (1..=34).map(|n| (format!("A{:02}", n), n % stride == 0)).collect();
            let refs: Vec<(&str, bool)> =
                codes.iter().map(|(c, b)| (c.as_str(), *b)).collect();
            let route = route_with_seats(&refs);
            let mut selection = SelectionState::new(&route, 100000);

            for (code, _) in &codes {
                selection.toggle(code).unwrap();
            }

            for (code, booked) in &codes {
                if *booked {
                    assert!(!selection.selected().contains(code));
                }
            }
            let free = codes.iter().filter(|(_, b)| !*b).count();
            assert_eq!(selection.len(), free);
            assert_eq!(selection.total(), 100000 * free as u64);
        }
    }

    #[test]
    fn test_clear_empties_selection() {
        let route = route_with_seats(&[("A01", false), ("A02", false)]);
        let mut selection = SelectionState::new(&route, 100000);
        selection.toggle("A01").unwrap();
        selection.toggle("A02").unwrap();

        selection.clear();
        assert!(selection.is_empty());
        assert_eq!(selection.total(), 0);
    }
}
