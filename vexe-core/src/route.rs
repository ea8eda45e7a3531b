use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSearchRequest {
    pub origin: String,
    pub destination: String,
    pub travel_date: NaiveDate,
}

/// One scheduled bus departure offering, as returned by the remote catalog.
/// Read-only to the workflow; the seat occupancy flags are authoritative
/// only as of the fetch instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub code: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: Option<NaiveTime>,
    pub arrival_time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub distance_km: f64,
    pub vehicle: Option<VehicleInfo>,
    /// Fare per seat in VND. When absent, pricing falls back to a
    /// distance-based estimate.
    pub fare: Option<u64>,
    pub schedule: ScheduleTag,
    pub seats: Vec<Seat>,
}

impl Route {
    pub fn available_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_selectable()).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub kind: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleTag {
    Daily,
    Dated,
}

/// One addressable seat. `code` is one or more letters followed by a
/// zero-padded number, e.g. "A01".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub code: String,
    pub booked: bool,
    /// Held by another buyer's in-flight session. Unselectable, same as
    /// booked, but the hold may still lapse server-side.
    #[serde(default)]
    pub held: bool,
}

impl Seat {
    pub fn is_selectable(&self) -> bool {
        !self.booked && !self.held
    }
}

/// Remote route/schedule storage and search. Owns seat-state truth;
/// everything the workflow sees through it is a possibly-stale snapshot.
#[async_trait]
pub trait RouteCatalogClient: Send + Sync {
    /// Search departures for an origin/destination/date triple.
    async fn search(
        &self,
        request: &RouteSearchRequest,
    ) -> Result<Vec<Route>, Box<dyn std::error::Error + Send + Sync>>;

    /// List every known route (schedule-browsing entry point).
    async fn list_all(&self) -> Result<Vec<Route>, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetch one route with its seat collection resolved for a travel date.
    async fn route_detail(
        &self,
        route_code: &str,
        travel_date: NaiveDate,
    ) -> Result<Route, Box<dyn std::error::Error + Send + Sync>>;
}
