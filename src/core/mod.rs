//! Scheduler core: capacity accounting, task groups, and the admission loop.

pub mod capacity;
pub mod error;
pub mod events;
pub mod group;
pub mod scheduler;
pub mod task;

pub use capacity::{CapacityAccountant, CapacitySnapshot};
pub use error::{AppResult, SchedulerError};
pub use events::{build_event, InMemorySink, ScheduleAction, ScheduleEvent, ScheduleSink};
pub use group::{FoldFn, GroupCompletion, TaskGroup};
pub use scheduler::{LoaderScheduler, Spawn};
pub use task::{ItemFuture, TaskItem, TaskOutcome, TaskState};
