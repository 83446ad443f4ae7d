//! Soft deletion: records are hidden by a timestamp instead of being removed.

pub mod filter;
pub mod governor;
pub mod policy;

pub use filter::VisibilityFilter;
pub use governor::{DeleteOutcome, LifecycleGovernor};
pub use policy::{SoftDeleteConfig, SoftDeletePolicy};
