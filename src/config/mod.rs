//! Configuration models for scheduler limits.

pub mod limits;

pub use limits::{SchedulerLimits, DEFAULT_MAX_ITEMS, DEFAULT_MAX_WORKLOAD_BYTES};
