//! Error types for scheduler operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by scheduler components.
///
/// These cover producer mistakes caught at submission time and source-side
/// failures while building a group. Item execution failures are deliberately
/// *not* here: they are folded into the group result and never surface as
/// scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler limits failed validation at construction.
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
    /// A group contained two items with the same identity.
    #[error("duplicate task item {0} in group")]
    DuplicateItem(Uuid),
    /// A single item's declared workload can never fit under the workload cap.
    #[error("item workload {workload} bytes exceeds workload cap {cap} bytes")]
    OversizedItem {
        /// Declared workload of the offending item.
        workload: u64,
        /// Configured workload cap.
        cap: u64,
    },
    /// A task source failed to build a group for a request.
    #[error("source error: {0}")]
    Source(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
