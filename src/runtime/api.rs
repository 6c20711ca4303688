//! Request-submission glue between task sources and the scheduler.

use crate::core::{GroupCompletion, LoaderScheduler, SchedulerError, Spawn};
use crate::source::{IngestRequest, TaskSource};

/// Build a task group for `request` via `source` and submit it.
///
/// Returns the group's completion future; awaiting it yields the source's
/// summary once every item has settled.
///
/// # Errors
///
/// Source failures building the group, or submit-time validation errors
/// ([`SchedulerError::DuplicateItem`], [`SchedulerError::OversizedItem`]).
pub async fn submit_request<T, S>(
    scheduler: &LoaderScheduler<T::Output, T::Summary, S>,
    source: &T,
    request: IngestRequest,
) -> Result<GroupCompletion<T::Summary>, SchedulerError>
where
    T: TaskSource,
    S: Spawn + Clone + Send + 'static,
{
    let group = source.build_group(request).await?;
    scheduler.submit(group)
}
