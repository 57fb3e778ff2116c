//! Scheduler layer
//!
//! Owns the recurring tasks that poll target URLs. Each job runs in its own
//! task driven by a [`PollExecutor`]; the [`JobRegistry`] tracks their state.

pub mod executor;
pub mod registry;

pub use executor::{CycleOutcome, PollExecutor, PollServices, TickOutcome};
pub use registry::{JobRegistry, StopResult};
