//! Task groups: caller-visible ingestion requests and their completion future.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use uuid::Uuid;

use crate::core::task::{TaskItem, TaskOutcome};

/// Producer-defined accumulator applied on every item settlement.
///
/// The fold runs under the scheduler lock and must not block; it is the only
/// place item failures become visible ("swallowed rejections become data").
pub type FoldFn<O, R> = Box<dyn FnMut(&mut R, TaskOutcome<O>) + Send + 'static>;

/// A caller-visible ingestion request: one or more task items sharing a
/// single completion signal and a mutable result payload.
///
/// `O` is the per-item success value, `R` the accumulated group result. The
/// scheduler never inspects `R`; it only observes whether the item set is
/// empty.
pub struct TaskGroup<O, R> {
    id: Uuid,
    items: Vec<TaskItem<O>>,
    result: R,
    fold: FoldFn<O, R>,
}

impl<O, R> TaskGroup<O, R> {
    /// Create an empty group with its initial result payload and fold.
    pub fn new<F>(result: R, fold: F) -> Self
    where
        F: FnMut(&mut R, TaskOutcome<O>) + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
            result,
            fold: Box::new(fold),
        }
    }

    /// Group identity.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Add an item to the group.
    pub fn push(&mut self, item: TaskItem<O>) {
        self.items.push(item);
    }

    /// Builder-style [`Self::push`].
    #[must_use]
    pub fn with_item(mut self, item: TaskItem<O>) -> Self {
        self.push(item);
        self
    }

    /// Number of items not yet settled.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the group has no items ("nothing to do" completes
    /// synchronously at submission).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest declared item workload, for submit-time cap validation.
    pub fn max_item_workload(&self) -> u64 {
        self.items.iter().map(TaskItem::workload).max().unwrap_or(0)
    }

    /// Decompose into scheduler-internal parts.
    pub(crate) fn into_parts(self) -> (Uuid, Vec<TaskItem<O>>, R, FoldFn<O, R>) {
        (self.id, self.items, self.result, self.fold)
    }

    /// Iterate item ids, for duplicate-identity validation.
    pub(crate) fn item_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.items.iter().map(TaskItem::id)
    }
}

impl<O, R: fmt::Debug> fmt::Debug for TaskGroup<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGroup")
            .field("id", &self.id)
            .field("items", &self.items.len())
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Completion future returned by `submit`.
///
/// Resolves with the group's accumulated result once every item has settled.
/// It never resolves with an error: partial failure is recorded inside the
/// result by the group's fold, so callers need no error handling for backend
/// failures.
///
/// # Panics
///
/// Polling panics if the scheduler side of the completion channel was
/// dropped before the group finished. The scheduler keeps the sender alive
/// until the group's last item settles, so this fires only when the registry
/// has lost a live group or the host runtime was torn down with settlement
/// continuations still queued; await completions on the runtime that drives
/// the scheduler's spawner to avoid the shutdown race.
pub struct GroupCompletion<R> {
    group_id: Uuid,
    rx: oneshot::Receiver<R>,
}

impl<R> GroupCompletion<R> {
    pub(crate) const fn new(group_id: Uuid, rx: oneshot::Receiver<R>) -> Self {
        Self { group_id, rx }
    }

    /// Identity of the group this future tracks.
    pub const fn group_id(&self) -> Uuid {
        self.group_id
    }
}

impl<R> fmt::Debug for GroupCompletion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCompletion")
            .field("group_id", &self.group_id)
            .finish_non_exhaustive()
    }
}

impl<R> Future for GroupCompletion<R> {
    type Output = R;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The scheduler keeps the sender alive until the group empties;
            // a cancelled sender means the registry lost a live group.
            Poll::Ready(Err(oneshot::Canceled)) => {
                panic!("scheduler dropped group {} before completion", self.group_id)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
