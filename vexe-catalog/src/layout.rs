use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use vexe_core::config::SeatPlanRules;
use vexe_core::route::Seat;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Deck {
    Lower,
    Upper,
}

/// Tri-state visual classification of a seat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    /// Occupied (or held by another buyer). Not selectable.
    Booked,
    Available,
    /// Available and part of the current selection.
    Selected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub code: String,
    pub number: u32,
    pub deck: Deck,
    pub class: SeatClass,
}

/// One slot in a rendered deck row. The blank slots are a layout
/// convention (driver area), not seats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LayoutSlot {
    Seat(SeatView),
    Blank,
}

/// A route's seat collection partitioned into two ordered decks, ready to
/// render. Building the plan never mutates the source seats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatPlan {
    pub lower: Vec<LayoutSlot>,
    pub upper: Vec<LayoutSlot>,
}

impl SeatPlan {
    /// Partition `seats` into decks ordered by ascending numeric suffix,
    /// classifying each seat against `selection`.
    pub fn build(
        seats: &[Seat],
        selection: &[String],
        rules: &SeatPlanRules,
    ) -> Result<SeatPlan, LayoutError> {
        let mut seen = HashSet::new();
        let mut classified: Vec<(u32, &Seat, SeatClass)> = Vec::with_capacity(seats.len());

        for seat in seats {
            if !seen.insert(seat.code.as_str()) {
                return Err(LayoutError::DuplicateSeat(seat.code.clone()));
            }
            let number = seat_number(&seat.code)?;
            let class = if !seat.is_selectable() {
                SeatClass::Booked
            } else if selection.iter().any(|s| s == &seat.code) {
                SeatClass::Selected
            } else {
                SeatClass::Available
            };
            classified.push((number, seat, class));
        }

        classified.sort_by_key(|(number, _, _)| *number);

        let mut lower = Vec::new();
        let mut upper = Vec::new();

        for (number, seat, class) in classified {
            let deck = deck_for(number, rules);
            let view = SeatView { code: seat.code.clone(), number, deck, class };
            match deck {
                Deck::Lower => {
                    lower.push(LayoutSlot::Seat(view));
                    // Blank slot after the first lower seat (driver area).
                    if number == rules.lower_deck_min {
                        lower.push(LayoutSlot::Blank);
                    }
                }
                Deck::Upper => {
                    // Blank slot before the first upper seat.
                    if number == rules.upper_deck_min {
                        upper.push(LayoutSlot::Blank);
                    }
                    upper.push(LayoutSlot::Seat(view));
                }
            }
        }

        Ok(SeatPlan { lower, upper })
    }

    pub fn seat_views(&self) -> impl Iterator<Item = &SeatView> {
        self.lower.iter().chain(self.upper.iter()).filter_map(|slot| match slot {
            LayoutSlot::Seat(view) => Some(view),
            LayoutSlot::Blank => None,
        })
    }

    pub fn classify(&self, seat_code: &str) -> Option<SeatClass> {
        self.seat_views().find(|v| v.code == seat_code).map(|v| v.class)
    }
}

/// Deck for a numeric suffix. Out-of-range suffixes are not rejected;
/// they fall back to the lower deck.
pub fn deck_for(number: u32, rules: &SeatPlanRules) -> Deck {
    if number >= rules.upper_deck_min && number <= rules.upper_deck_max {
        Deck::Upper
    } else {
        Deck::Lower
    }
}

/// Numeric suffix of a seat code ("A01" → 1). Codes prefixed with a
/// vehicle id ("XE001_A15") are reduced to the part after the underscore.
pub fn seat_number(code: &str) -> Result<u32, LayoutError> {
    let display = display_code(code);
    let digits: String = display.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(LayoutError::BadSeatCode(code.to_string()));
    }
    digits
        .parse::<u32>()
        .map_err(|_| LayoutError::BadSeatCode(code.to_string()))
}

/// Display form of a seat code, without any vehicle prefix.
pub fn display_code(code: &str) -> &str {
    match code.rsplit_once('_') {
        Some((_, tail)) => tail,
        None => code,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Seat code is not addressable: {0}")]
    BadSeatCode(String),

    #[error("Duplicate seat code in route: {0}")]
    DuplicateSeat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(code: &str, booked: bool) -> Seat {
        Seat { code: code.to_string(), booked, held: false }
    }

    fn rules() -> SeatPlanRules {
        SeatPlanRules::default()
    }

    fn codes(slots: &[LayoutSlot]) -> Vec<String> {
        slots
            .iter()
            .map(|slot| match slot {
                LayoutSlot::Seat(v) => v.code.clone(),
                LayoutSlot::Blank => "-".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_deck_partition_and_ordering() {
        let seats = vec![seat("A18", false), seat("A02", false), seat("A01", false)];
        let plan = SeatPlan::build(&seats, &[], &rules()).unwrap();

        assert_eq!(codes(&plan.lower), vec!["A01", "-", "A02"]);
        assert_eq!(codes(&plan.upper), vec!["-", "A18"]);
    }

    #[test]
    fn test_partition_stable_under_reordering() {
        let mut seats = vec![seat("A03", false), seat("A19", true), seat("A01", false)];
        let plan_a = SeatPlan::build(&seats, &[], &rules()).unwrap();
        seats.reverse();
        let plan_b = SeatPlan::build(&seats, &[], &rules()).unwrap();

        assert_eq!(codes(&plan_a.lower), codes(&plan_b.lower));
        assert_eq!(codes(&plan_a.upper), codes(&plan_b.upper));
    }

    #[test]
    fn test_out_of_range_suffix_falls_back_to_lower() {
        let seats = vec![seat("A35", false), seat("A99", false)];
        let plan = SeatPlan::build(&seats, &[], &rules()).unwrap();

        assert_eq!(plan.upper.len(), 0);
        assert_eq!(codes(&plan.lower), vec!["A35", "A99"]);
    }

    #[test]
    fn test_classification_tri_state() {
        let seats = vec![seat("A01", true), seat("A02", false), seat("A03", false)];
        let selection = vec!["A03".to_string()];
        let plan = SeatPlan::build(&seats, &selection, &rules()).unwrap();

        assert_eq!(plan.classify("A01"), Some(SeatClass::Booked));
        assert_eq!(plan.classify("A02"), Some(SeatClass::Available));
        assert_eq!(plan.classify("A03"), Some(SeatClass::Selected));
        assert_eq!(plan.classify("A04"), None);
    }

    #[test]
    fn test_held_seat_classified_booked() {
        let seats = vec![Seat { code: "A05".to_string(), booked: false, held: true }];
        let plan = SeatPlan::build(&seats, &[], &rules()).unwrap();
        assert_eq!(plan.classify("A05"), Some(SeatClass::Booked));
    }

    #[test]
    fn test_duplicate_seat_code_rejected() {
        let seats = vec![seat("A01", false), seat("A01", false)];
        let err = SeatPlan::build(&seats, &[], &rules()).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateSeat(_)));
    }

    #[test]
    fn test_seat_number_parsing() {
        assert_eq!(seat_number("A01").unwrap(), 1);
        assert_eq!(seat_number("B34").unwrap(), 34);
        assert_eq!(seat_number("XE001_A15").unwrap(), 15);
        assert!(seat_number("??").is_err());
    }

    #[test]
    fn test_display_code_strips_vehicle_prefix() {
        assert_eq!(display_code("XE001_A15"), "A15");
        assert_eq!(display_code("A15"), "A15");
    }
}
