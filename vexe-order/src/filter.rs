use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use vexe_core::route::Route;

/// Fixed time-of-day buckets for the departure-hour filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBucket {
    /// 00:00 – 06:00
    EarlyMorning,
    /// 06:00 – 12:00
    Morning,
    /// 12:00 – 18:00
    Afternoon,
    /// 18:00 – 24:00
    Evening,
}

impl TimeBucket {
    pub fn contains_hour(&self, hour: u32) -> bool {
        match self {
            TimeBucket::EarlyMorning => hour < 6,
            TimeBucket::Morning => (6..12).contains(&hour),
            TimeBucket::Afternoon => (12..18).contains(&hour),
            TimeBucket::Evening => (18..24).contains(&hour),
        }
    }

    pub fn of(time: NaiveTime) -> TimeBucket {
        match time.hour() {
            0..=5 => TimeBucket::EarlyMorning,
            6..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            _ => TimeBucket::Evening,
        }
    }
}

/// Keep routes whose departure hour falls in any checked bucket. With no
/// buckets checked, everything stays visible. A route without a departure
/// time never matches a bucket. Pure and local; the underlying list is
/// untouched.
pub fn filter_by_time<'a>(routes: &'a [Route], buckets: &[TimeBucket]) -> Vec<&'a Route> {
    if buckets.is_empty() {
        return routes.iter().collect();
    }
    routes
        .iter()
        .filter(|route| match route.departure_time {
            Some(time) => buckets.iter().any(|b| b.contains_hour(time.hour())),
            None => false,
        })
        .collect()
}

/// Client-side filter for the schedule-browsing listing.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub vehicle_kind: Option<String>,
}

pub fn filter_schedule<'a>(routes: &'a [Route], filter: &ScheduleFilter) -> Vec<&'a Route> {
    routes
        .iter()
        .filter(|route| {
            let match_origin = filter.origin.as_deref().map_or(true, |o| route.origin == o);
            let match_destination =
                filter.destination.as_deref().map_or(true, |d| route.destination == d);
            let match_vehicle = filter.vehicle_kind.as_deref().map_or(true, |v| {
                route.vehicle.as_ref().map_or(false, |info| info.kind == v)
            });
            match_origin && match_destination && match_vehicle
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexe_core::route::{ScheduleTag, VehicleInfo};

    fn route(code: &str, departure: Option<(u32, u32)>) -> Route {
        Route {
            code: code.to_string(),
            origin: "Hà Nội".to_string(),
            destination: "Đà Nẵng".to_string(),
            departure_time: departure.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            arrival_time: None,
            duration: None,
            distance_km: 760.0,
            vehicle: None,
            fare: Some(350000),
            schedule: ScheduleTag::Daily,
            seats: vec![],
        }
    }

    #[test]
    fn test_morning_bucket_filter() {
        // Scenario C: [05:00, 07:30, 13:00], morning bucket keeps 07:30
        let routes = vec![
            route("TX001", Some((5, 0))),
            route("TX002", Some((7, 30))),
            route("TX003", Some((13, 0))),
        ];

        let visible = filter_by_time(&routes, &[TimeBucket::Morning]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].code, "TX002");

        // Underlying list unchanged
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn test_no_buckets_shows_all() {
        let routes = vec![route("TX001", Some((5, 0))), route("TX002", None)];
        let visible = filter_by_time(&routes, &[]);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_route_without_departure_never_matches() {
        let routes = vec![route("TX001", None)];
        for bucket in [
            TimeBucket::EarlyMorning,
            TimeBucket::Morning,
            TimeBucket::Afternoon,
            TimeBucket::Evening,
        ] {
            assert!(filter_by_time(&routes, &[bucket]).is_empty());
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert!(TimeBucket::EarlyMorning.contains_hour(0));
        assert!(!TimeBucket::EarlyMorning.contains_hour(6));
        assert!(TimeBucket::Morning.contains_hour(6));
        assert!(!TimeBucket::Morning.contains_hour(12));
        assert!(TimeBucket::Evening.contains_hour(23));
        assert_eq!(TimeBucket::of(NaiveTime::from_hms_opt(18, 0, 0).unwrap()), TimeBucket::Evening);
    }

    #[test]
    fn test_schedule_filter_composes() {
        let mut with_vehicle = route("TX004", Some((9, 0)));
        with_vehicle.vehicle = Some(VehicleInfo { kind: "Giường nằm".to_string(), code: None });
        let mut other_dest = route("TX005", Some((9, 0)));
        other_dest.destination = "Huế".to_string();
        let routes = vec![with_vehicle, other_dest];

        let filter = ScheduleFilter {
            destination: Some("Đà Nẵng".to_string()),
            vehicle_kind: Some("Giường nằm".to_string()),
            ..Default::default()
        };
        let visible = filter_schedule(&routes, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].code, "TX004");
    }
}
