//! Claim fulfillment: sales record check, key assignment and customer
//! notification, plus the batch automation that drives it.

pub mod outcome;
pub mod platform;
pub mod scheduler;
pub mod workflow;


pub use outcome::{BatchSummary, ClaimResult, ErrorKind, FulfillmentError, FulfillmentOutcome, Step, WorkflowResult};
pub use platform::{DEFAULT_PLATFORM, resolve_platform};
pub use scheduler::spawn_automation_task;
pub use workflow::{FulfillmentOptions, FulfillmentService};
