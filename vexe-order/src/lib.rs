pub mod filter;
pub mod models;
pub mod orchestrator;
pub mod selection;

pub use models::{BookingDraft, WorkflowStage};
pub use orchestrator::{BookingWorkflow, WorkflowError};
pub use selection::SelectionState;
