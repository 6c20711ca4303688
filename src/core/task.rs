//! Task items: single units of asynchronous ingestion work.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

/// Boxed single-shot operation owned by a task item.
///
/// The output is the producer's success value (e.g. the identifier of the
/// knowledge-base entry that was written); failures are opaque and end up in
/// the group result, never in the scheduler.
pub type ItemFuture<O> = Pin<Box<dyn Future<Output = Result<O, anyhow::Error>> + Send + 'static>>;

/// Lifecycle state of a task item.
///
/// There is no `Done` state: items are removed from their group once they
/// settle, so completion is implicit via absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TaskState {
    /// Waiting for the admission loop to pick it up.
    Pending,
    /// Admitted; its operation is running.
    Processing,
}

/// One declared unit of asynchronous work with a byte-sized workload estimate.
///
/// The workload is fixed at creation and is an *estimate*, not a hard
/// reservation; the scheduler only uses it for admission accounting. The
/// operation is owned exclusively by the item and invoked at most once.
pub struct TaskItem<O> {
    id: Uuid,
    workload: u64,
    state: TaskState,
    op: Option<ItemFuture<O>>,
}

impl<O> TaskItem<O> {
    /// Create a pending item wrapping one asynchronous ingestion operation.
    pub fn new<F>(workload: u64, op: F) -> Self
    where
        F: Future<Output = Result<O, anyhow::Error>> + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            workload,
            state: TaskState::Pending,
            op: Some(Box::pin(op)),
        }
    }

    /// Create an item with a caller-chosen identity.
    ///
    /// Producers that derive item identity from their own records (e.g. a
    /// file hash) use this; `submit` rejects groups with duplicate ids.
    pub fn with_id<F>(id: Uuid, workload: u64, op: F) -> Self
    where
        F: Future<Output = Result<O, anyhow::Error>> + Send + 'static,
    {
        Self {
            id,
            workload,
            state: TaskState::Pending,
            op: Some(Box::pin(op)),
        }
    }

    /// Item identity, unique within its group.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Declared workload in bytes.
    pub const fn workload(&self) -> u64 {
        self.workload
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Whether the item is still waiting for admission.
    pub fn is_pending(&self) -> bool {
        self.state == TaskState::Pending
    }

    /// Transition Pending -> Processing and take the operation.
    ///
    /// Called exclusively by the admission loop.
    ///
    /// # Panics
    ///
    /// Panics if the item was already started; starting twice would run the
    /// operation's capacity charge against nothing.
    pub(crate) fn start(&mut self) -> ItemFuture<O> {
        assert_eq!(self.state, TaskState::Pending, "task item started twice");
        self.state = TaskState::Processing;
        self.op.take().expect("pending task item without operation")
    }
}

impl<O> fmt::Debug for TaskItem<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskItem")
            .field("id", &self.id)
            .field("workload", &self.workload)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Settlement record handed to a group's fold for every finished item.
#[derive(Debug)]
pub struct TaskOutcome<O> {
    /// Identity of the settled item.
    pub item_id: Uuid,
    /// The item's declared workload.
    pub workload: u64,
    /// Success value or the swallowed failure.
    pub outcome: Result<O, anyhow::Error>,
}
