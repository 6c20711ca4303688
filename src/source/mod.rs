//! Task Source Protocol: the contract ingestion producers implement.
//!
//! A task source maps a content-ingestion request of one of five kinds onto a
//! [`TaskGroup`] whose items each wrap exactly one externally-defined
//! asynchronous loader operation and carry a workload estimate following the
//! conventions in [`estimate`]. The scheduler core consumes this contract; it
//! never needs to know what "load a file" means, only its declared cost.

pub mod estimate;
pub mod request;
pub mod summary;

pub use estimate::{
    note_workload, request_workloads, SITEMAP_WORKLOAD_BYTES, URL_WORKLOAD_BYTES,
};
pub use request::{DirectoryFile, IngestRequest, RequestKind};
pub use summary::IngestSummary;

use async_trait::async_trait;

use crate::core::{SchedulerError, TaskGroup};

/// A producer that turns ingestion requests into schedulable task groups.
///
/// Implementations live with the loader backends (file readers, web
/// fetchers, note importers); the core only relies on the group shape and
/// the workload-estimation conventions.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Per-item success value (e.g. the written entry's identifier).
    type Output: Send + 'static;
    /// Accumulated group result (e.g. [`IngestSummary`]).
    type Summary: Send + 'static;

    /// Build a task group for a request.
    ///
    /// Producers are responsible for treating "nothing to do" (e.g. an empty
    /// directory) as an empty group, which completes synchronously at
    /// submission.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Source`] when the request cannot be mapped (e.g. an
    /// unreadable directory listing).
    async fn build_group(
        &self,
        request: IngestRequest,
    ) -> Result<TaskGroup<Self::Output, Self::Summary>, SchedulerError>;
}

/// Observer for per-item ingestion progress.
///
/// Sources that want progress reporting invoke this from their group folds
/// after each settlement; it is independent of the scheduler, which neither
/// knows nor cares whether progress is reported.
pub trait ProgressObserver: Send + Sync {
    /// Called after an item settles with the number settled so far and the
    /// group's total item count.
    fn on_item_settled(&self, settled: usize, total: usize);
}
