pub mod layout;
pub mod pricing;

pub use layout::{Deck, LayoutSlot, SeatClass, SeatPlan, SeatView};
pub use pricing::PricingCalculator;
