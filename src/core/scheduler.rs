//! Admission-control scheduler: the group registry, submission, and the
//! re-entrant tick loop.
//!
//! The tick runs to completion synchronously on whichever task invokes it
//! (a submission or a settled item's continuation), performs no I/O, and
//! never blocks. Admitted operations run concurrently with each other and
//! with the loop via the [`Spawn`] seam; every settlement releases capacity
//! and triggers another tick, so re-entrancy is trampolined by the host
//! executor rather than by synchronous recursion.

use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::FutureExt;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::SchedulerLimits;
use crate::core::capacity::{CapacityAccountant, CapacitySnapshot};
use crate::core::error::SchedulerError;
use crate::core::events::{build_event, ScheduleAction, ScheduleEvent, ScheduleSink};
use crate::core::group::{FoldFn, GroupCompletion, TaskGroup};
use crate::core::task::{ItemFuture, TaskItem, TaskOutcome};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// A registered group: its remaining items, accumulating result, and the
/// single-shot completion channel created at submission.
struct GroupEntry<O, R> {
    id: Uuid,
    items: Vec<TaskItem<O>>,
    result: Option<R>,
    fold: FoldFn<O, R>,
    done_tx: Option<oneshot::Sender<R>>,
}

/// All shared mutable scheduler state, under one lock.
///
/// The two capacity counters and the registry must change together (admit,
/// settle, deregister), so they share a mutex instead of standing alone as
/// atomics; the lock is held only for synchronous scans, never across an
/// await.
struct SchedState<O, R> {
    capacity: CapacityAccountant,
    /// Registration order; the tick walks this front to back.
    groups: Vec<GroupEntry<O, R>>,
}

/// An item the tick admitted, carried out of the lock for spawning.
struct Admitted<O> {
    group_id: Uuid,
    item_id: Uuid,
    workload: u64,
    op: ItemFuture<O>,
}

/// Admission-control scheduler for ingestion task groups.
///
/// `O` is the per-item success value, `R` the per-group accumulated result,
/// `S` the spawn adapter. Cloning is cheap and shares the same registry and
/// capacity accounting.
pub struct LoaderScheduler<O, R, S> {
    limits: SchedulerLimits,
    state: Arc<Mutex<SchedState<O, R>>>,
    spawner: S,
    sink: Option<Arc<Mutex<Box<dyn ScheduleSink>>>>,
}

impl<O, R, S: Clone> Clone for LoaderScheduler<O, R, S> {
    fn clone(&self) -> Self {
        Self {
            limits: self.limits.clone(),
            state: Arc::clone(&self.state),
            spawner: self.spawner.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<O, R, S> LoaderScheduler<O, R, S>
where
    O: Send + 'static,
    R: Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    /// Create a scheduler enforcing the given limits.
    ///
    /// Fails if the limits are invalid (zero caps); a zero workload cap
    /// would starve every sized item forever.
    pub fn new(limits: SchedulerLimits, spawner: S) -> Result<Self, SchedulerError> {
        limits.validate().map_err(SchedulerError::InvalidLimits)?;
        Ok(Self {
            state: Arc::new(Mutex::new(SchedState {
                capacity: CapacityAccountant::new(&limits),
                groups: Vec::new(),
            })),
            limits,
            spawner,
            sink: None,
        })
    }

    /// Attach a scheduling event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn ScheduleSink>) -> Self {
        self.sink = Some(Arc::new(Mutex::new(sink)));
        self
    }

    /// Limits this scheduler enforces.
    pub const fn limits(&self) -> &SchedulerLimits {
        &self.limits
    }

    /// Snapshot of the in-flight counters.
    pub fn in_flight(&self) -> CapacitySnapshot {
        self.state.lock().capacity.snapshot()
    }

    /// Number of groups currently registered (submitted, not yet complete).
    pub fn registered_groups(&self) -> usize {
        self.state.lock().groups.len()
    }

    /// Submit a task group.
    ///
    /// Validates the group before any registry mutation, registers it, and
    /// triggers one admission pass. The returned [`GroupCompletion`] resolves
    /// with the group's result once every item has settled; it never resolves
    /// with an error - individual item failures are recorded into the result
    /// by the group's fold, so partial failure within a batch cannot abort
    /// the remaining items or deny the caller a result.
    ///
    /// A group with zero items completes immediately and is never registered.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::DuplicateItem`] if two items share an identity.
    /// - [`SchedulerError::OversizedItem`] if any single item's workload
    ///   exceeds the workload cap and could therefore never be admitted.
    pub fn submit(&self, group: TaskGroup<O, R>) -> Result<GroupCompletion<R>, SchedulerError> {
        let mut seen = HashSet::new();
        for id in group.item_ids() {
            if !seen.insert(id) {
                return Err(SchedulerError::DuplicateItem(id));
            }
        }
        let largest = group.max_item_workload();
        if largest > self.limits.max_workload_bytes {
            return Err(SchedulerError::OversizedItem {
                workload: largest,
                cap: self.limits.max_workload_bytes,
            });
        }

        let (group_id, items, result, fold) = group.into_parts();
        let (tx, rx) = oneshot::channel();
        let completion = GroupCompletion::new(group_id, rx);

        if items.is_empty() {
            tracing::debug!("group {} empty at submit, completing immediately", group_id);
            // Sinks observe the same balanced lifecycle as a registered
            // group: Submit first, Complete last.
            self.record(|| build_event(group_id.to_string(), None, ScheduleAction::Submit, None));
            self.record(|| build_event(group_id.to_string(), None, ScheduleAction::Complete, None));
            let _ = tx.send(result);
            return Ok(completion);
        }

        tracing::info!("group {} submitted with {} items", group_id, items.len());
        self.record(|| build_event(group_id.to_string(), None, ScheduleAction::Submit, None));
        {
            let mut state = self.state.lock();
            state.groups.push(GroupEntry {
                id: group_id,
                items,
                result: Some(result),
                fold,
                done_tx: Some(tx),
            });
        }
        self.tick();
        Ok(completion)
    }

    /// Run one admission pass.
    ///
    /// Greedy first-fit by registration order: walks every registered group's
    /// pending items and admits as many as the capacity accountant allows,
    /// stopping a group's scan at the first item that does not fit and moving
    /// on to the next group. Idempotent: with no admittable item this is a
    /// no-op. Submissions and settlements call this internally; callers only
    /// need it directly in tests.
    pub fn tick(&self) {
        let admitted = {
            let mut state = self.state.lock();
            let SchedState { capacity, groups } = &mut *state;
            let mut batch = Vec::new();
            'groups: for entry in groups.iter_mut() {
                for item in entry.items.iter_mut() {
                    if !item.is_pending() {
                        continue;
                    }
                    if !capacity.has_room(item.workload()) {
                        // The admission decision is evaluated only at the
                        // moment of consideration; smaller items in later
                        // groups may still fit this pass.
                        continue 'groups;
                    }
                    capacity.admit(item.workload());
                    batch.push(Admitted {
                        group_id: entry.id,
                        item_id: item.id(),
                        workload: item.workload(),
                        op: item.start(),
                    });
                }
            }
            batch
        };

        if admitted.is_empty() {
            return;
        }
        tracing::debug!("tick admitted {} items", admitted.len());
        for adm in admitted {
            self.record(|| {
                build_event(
                    adm.group_id.to_string(),
                    Some(adm.item_id.to_string()),
                    ScheduleAction::Admit,
                    None,
                )
            });
            self.spawn_admitted(adm);
        }
    }

    /// Run an admitted operation in the background with its settlement
    /// continuation attached.
    ///
    /// The operation is unwind-caught: a panicking producer op settles as a
    /// failed outcome instead of killing the spawned task, which would leak
    /// the item's capacity for the process lifetime and leave its group's
    /// completion hanging.
    fn spawn_admitted(&self, admitted: Admitted<O>) {
        let scheduler = self.clone();
        let Admitted {
            group_id,
            item_id,
            workload,
            op,
        } = admitted;
        self.spawner.spawn(async move {
            let outcome = match AssertUnwindSafe(op).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(anyhow::anyhow!(
                    "item operation panicked: {}",
                    panic_message(payload.as_ref())
                )),
            };
            scheduler.settle(group_id, item_id, workload, outcome);
            // Capacity was just released; previously-blocked items may fit.
            scheduler.tick();
        });
    }

    /// Settle one item: release capacity, fold the outcome into the group
    /// result, and fire the group's completion if it is now empty.
    fn settle(&self, group_id: Uuid, item_id: Uuid, workload: u64, outcome: Result<O, anyhow::Error>) {
        let detail = outcome.as_ref().err().map(ToString::to_string);
        if let Some(err) = &detail {
            tracing::warn!("item {} in group {} failed: {}", item_id, group_id, err);
        }

        let finished = {
            let mut state = self.state.lock();
            let SchedState { capacity, groups } = &mut *state;
            capacity.release(workload);

            // Registry lookups for a settled item must succeed; a miss means
            // the counters and the registry have diverged.
            let group_idx = groups
                .iter()
                .position(|g| g.id == group_id)
                .expect("settled item for a group missing from the registry");
            let entry = &mut groups[group_idx];
            let item_idx = entry
                .items
                .iter()
                .position(|i| i.id() == item_id)
                .expect("settled item missing from its group");
            entry.items.swap_remove(item_idx);

            let result = entry
                .result
                .as_mut()
                .expect("registered group without result payload");
            (entry.fold)(
                result,
                TaskOutcome {
                    item_id,
                    workload,
                    outcome,
                },
            );

            // Recorded before the state lock drops so sibling settlements
            // cannot log their group's completion ahead of this settle.
            self.record(|| {
                build_event(
                    group_id.to_string(),
                    Some(item_id.to_string()),
                    ScheduleAction::Settle,
                    detail,
                )
            });

            if entry.items.is_empty() {
                let entry = groups.remove(group_idx);
                self.record(|| {
                    build_event(group_id.to_string(), None, ScheduleAction::Complete, None)
                });
                Some((
                    entry
                        .result
                        .expect("registered group without result payload"),
                    entry
                        .done_tx
                        .expect("registered group without completion channel"),
                ))
            } else {
                None
            }
        };

        if let Some((result, tx)) = finished {
            tracing::info!("group {} completed", group_id);
            // The caller may have dropped its completion future; the group
            // is finished and deregistered either way.
            let _ = tx.send(result);
        }
    }

    /// Record a scheduling event if a sink is attached. Takes a constructor
    /// so the no-sink path pays no event-building cost.
    fn record(&self, event: impl FnOnce() -> ScheduleEvent) {
        if let Some(sink) = &self.sink {
            sink.lock().record(event());
        }
    }
}

/// Best-effort text of an unwind payload, for folding a panicking operation
/// into its group result as a failure message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload.downcast_ref::<&str>().copied().unwrap_or_else(|| {
        payload
            .downcast_ref::<String>()
            .map_or("opaque panic payload", String::as_str)
    })
}
