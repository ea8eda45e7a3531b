use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::booking::PaymentMethod;

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub seat_plan: SeatPlanRules,
    #[serde(default)]
    pub fares: FareRules,
    #[serde(default)]
    pub network: NetworkRules,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Deck assignment is a pure function of the seat's numeric suffix.
/// Suffixes outside both ranges fall back to the lower deck.
#[derive(Debug, Deserialize, Clone)]
pub struct SeatPlanRules {
    pub lower_deck_min: u32,
    pub lower_deck_max: u32,
    pub upper_deck_min: u32,
    pub upper_deck_max: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FareRules {
    /// Estimate applied when a route carries no fare: distance_km × rate.
    pub fallback_fare_per_km: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkRules {
    /// Upper bound for every collaborator call. A stalled request surfaces
    /// as a transport failure instead of hanging the workflow.
    pub step_timeout_secs: u64,
}

impl Default for SeatPlanRules {
    fn default() -> Self {
        Self { lower_deck_min: 1, lower_deck_max: 17, upper_deck_min: 18, upper_deck_max: 34 }
    }
}

impl Default for FareRules {
    fn default() -> Self {
        Self { fallback_fare_per_km: 1000 }
    }
}

impl Default for NetworkRules {
    fn default() -> Self {
        Self { step_timeout_secs: 10 }
    }
}

impl NetworkRules {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Online
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            seat_plan: SeatPlanRules::default(),
            fares: FareRules::default(),
            network: NetworkRules::default(),
            payment_method: default_payment_method(),
        }
    }
}

impl WorkflowConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `VEXE_NETWORK__STEP_TIMEOUT_SECS=30`
            .add_source(config::Environment::with_prefix("VEXE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
