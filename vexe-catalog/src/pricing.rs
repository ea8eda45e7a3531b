use vexe_core::config::FareRules;
use vexe_core::route::Route;

/// Pure price derivation. Amounts are whole VND; the currency has no
/// minor unit.
pub struct PricingCalculator {
    rules: FareRules,
}

impl PricingCalculator {
    pub fn new(rules: FareRules) -> Self {
        Self { rules }
    }

    /// Fare per seat. Routes without a published fare are estimated from
    /// distance at the configured per-km rate.
    pub fn unit_price(&self, route: &Route) -> u64 {
        match route.fare {
            Some(fare) => fare,
            None => (route.distance_km * self.rules.fallback_fare_per_km as f64).round() as u64,
        }
    }

    pub fn total(&self, unit_price: u64, seat_count: usize) -> u64 {
        unit_price * seat_count as u64
    }
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(FareRules::default())
    }
}

/// Render an amount with Vietnamese grouping and currency suffix,
/// e.g. 350000 → "350.000 đ". Zero renders as "0 đ".
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped.push_str(" đ");
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexe_core::route::ScheduleTag;

    fn route(fare: Option<u64>, distance_km: f64) -> Route {
        Route {
            code: "TX001".to_string(),
            origin: "Hà Nội".to_string(),
            destination: "Hải Phòng".to_string(),
            departure_time: None,
            arrival_time: None,
            duration: None,
            distance_km,
            vehicle: None,
            fare,
            schedule: ScheduleTag::Daily,
            seats: vec![],
        }
    }

    #[test]
    fn test_unit_price_from_fare() {
        let calc = PricingCalculator::default();
        assert_eq!(calc.unit_price(&route(Some(120000), 105.0)), 120000);
    }

    #[test]
    fn test_unit_price_distance_fallback() {
        let calc = PricingCalculator::default();
        // No published fare: 105 km × 1000
        assert_eq!(calc.unit_price(&route(None, 105.0)), 105000);
    }

    #[test]
    fn test_total_scales_linearly() {
        let calc = PricingCalculator::default();
        let unit = 100000;
        for n in [1usize, 2, 5] {
            assert_eq!(calc.total(unit, n), unit * n as u64);
        }
        assert_eq!(calc.total(unit, 0), 0);
    }

    #[test]
    fn test_format_vnd_grouping() {
        assert_eq!(format_vnd(350000), "350.000 đ");
        assert_eq!(format_vnd(1250000), "1.250.000 đ");
        assert_eq!(format_vnd(999), "999 đ");
    }

    #[test]
    fn test_format_vnd_zero_display() {
        assert_eq!(format_vnd(0), "0 đ");
    }
}
