//! Integration tests for the admission-control algorithm.
//!
//! These validate:
//! 1. Admission happens immediately when capacity is available
//! 2. Both caps (items, declared workload bytes) bound in-flight work
//! 3. Large groups drain progressively as earlier items settle
//! 4. Concurrently-submitted groups interleave and all complete
//! 5. The tick is idempotent and counters conserve to zero

use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ingest_admission::config::SchedulerLimits;
use ingest_admission::core::{LoaderScheduler, Spawn, TaskGroup, TaskItem};
use ingest_admission::source::IngestSummary;
use rand::Rng;
use tokio::sync::Semaphore;
use uuid::Uuid;

const MIB: u64 = 1024 * 1024;

#[derive(Clone)]
struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

fn limits(max_items: u32, max_workload_bytes: u64) -> SchedulerLimits {
    SchedulerLimits {
        max_items,
        max_workload_bytes,
    }
}

fn summary_group() -> TaskGroup<Uuid, IngestSummary> {
    TaskGroup::new(IngestSummary::default(), IngestSummary::apply)
}

#[tokio::test]
async fn test_single_item_admits_immediately() {
    let scheduler = LoaderScheduler::new(limits(30, 80 * MIB), TestSpawner).unwrap();

    // The operation records the counters as observed mid-flight.
    let observed = Arc::new(AtomicU64::new(0));
    let probe = scheduler.clone();
    let obs = Arc::clone(&observed);
    let group = summary_group().with_item(TaskItem::new(10 * MIB, async move {
        obs.store(probe.in_flight().in_flight_workload, Ordering::SeqCst);
        Ok(Uuid::new_v4())
    }));

    let summary = scheduler.submit(group).unwrap().await;

    assert_eq!(summary.entries_added, 1);
    assert_eq!(observed.load(Ordering::SeqCst), 10 * MIB);

    // Conservation: counters back to zero, group deregistered.
    let idle = scheduler.in_flight();
    assert_eq!(idle.in_flight_items, 0);
    assert_eq!(idle.in_flight_workload, 0);
    assert_eq!(scheduler.registered_groups(), 0);
}

#[tokio::test]
async fn test_directory_drain_respects_both_caps() {
    // 100 files of 1 MiB under (30 items, 80 MiB): multiple passes required.
    let scheduler = LoaderScheduler::new(limits(30, 80 * MIB), TestSpawner).unwrap();

    let max_items = Arc::new(AtomicU32::new(0));
    let max_workload = Arc::new(AtomicU64::new(0));

    let mut group = summary_group();
    for _ in 0..100 {
        let probe = scheduler.clone();
        let mi = Arc::clone(&max_items);
        let mw = Arc::clone(&max_workload);
        group.push(TaskItem::new(MIB, async move {
            let snap = probe.in_flight();
            mi.fetch_max(snap.in_flight_items, Ordering::SeqCst);
            mw.fetch_max(snap.in_flight_workload, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            Ok(Uuid::new_v4())
        }));
    }

    let summary = scheduler.submit(group).unwrap().await;

    assert_eq!(summary.entries_added, 100);
    assert!(summary.is_clean());

    // Capacity invariant held at every observed instant.
    assert!(max_items.load(Ordering::SeqCst) <= 30);
    assert!(max_workload.load(Ordering::SeqCst) <= 80 * MIB);
    // And the caps actually constrained the run.
    assert!(max_items.load(Ordering::SeqCst) > 1);

    let idle = scheduler.in_flight();
    assert_eq!(idle.in_flight_items, 0);
    assert_eq!(idle.in_flight_workload, 0);
}

#[tokio::test]
async fn test_workload_cap_limits_admission() {
    // 10 gated items of 1 MiB under a 5 MiB cap: exactly 5 admit up front.
    let scheduler = LoaderScheduler::new(limits(30, 5 * MIB), TestSpawner).unwrap();
    let gate = Arc::new(Semaphore::new(0));

    let mut group = summary_group();
    for _ in 0..10 {
        let gate = Arc::clone(&gate);
        group.push(TaskItem::new(MIB, async move {
            let _permit = gate.acquire().await.unwrap();
            Ok(Uuid::new_v4())
        }));
    }

    // Admission is synchronous inside submit's tick.
    let completion = scheduler.submit(group).unwrap();
    let snap = scheduler.in_flight();
    assert_eq!(snap.in_flight_items, 5);
    assert_eq!(snap.in_flight_workload, 5 * MIB);

    gate.add_permits(10);
    let summary = completion.await;
    assert_eq!(summary.entries_added, 10);

    let idle = scheduler.in_flight();
    assert_eq!(idle.in_flight_items, 0);
    assert_eq!(idle.in_flight_workload, 0);
}

#[tokio::test]
async fn test_item_cap_limits_admission() {
    let scheduler = LoaderScheduler::new(limits(3, 80 * MIB), TestSpawner).unwrap();
    let gate = Arc::new(Semaphore::new(0));

    let mut group = summary_group();
    for _ in 0..8 {
        let gate = Arc::clone(&gate);
        group.push(TaskItem::new(MIB, async move {
            let _permit = gate.acquire().await.unwrap();
            Ok(Uuid::new_v4())
        }));
    }

    let completion = scheduler.submit(group).unwrap();
    assert_eq!(scheduler.in_flight().in_flight_items, 3);

    gate.add_permits(8);
    let summary = completion.await;
    assert_eq!(summary.entries_added, 8);
}

#[tokio::test]
async fn test_concurrent_groups_interleave_and_complete() {
    // Group A: 40 x 1 MiB, Group B: 5 x 1 MiB under (30, 80 MiB). A alone
    // saturates the item cap, but B still completes independently.
    let scheduler = LoaderScheduler::new(limits(30, 80 * MIB), TestSpawner).unwrap();

    let mut group_a = summary_group();
    for _ in 0..40 {
        group_a.push(TaskItem::new(MIB, async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(Uuid::new_v4())
        }));
    }
    let mut group_b = summary_group();
    for _ in 0..5 {
        group_b.push(TaskItem::new(MIB, async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(Uuid::new_v4())
        }));
    }

    let completion_a = scheduler.submit(group_a).unwrap();
    let completion_b = scheduler.submit(group_b).unwrap();

    let (summary_a, summary_b) = futures::join!(completion_a, completion_b);
    assert_eq!(summary_a.entries_added, 40);
    assert_eq!(summary_b.entries_added, 5);
    assert_eq!(scheduler.registered_groups(), 0);

    let idle = scheduler.in_flight();
    assert_eq!(idle.in_flight_items, 0);
    assert_eq!(idle.in_flight_workload, 0);
}

#[tokio::test]
async fn test_tick_is_idempotent() {
    let scheduler: LoaderScheduler<Uuid, IngestSummary, TestSpawner> =
        LoaderScheduler::new(limits(2, 10), TestSpawner).unwrap();

    // No groups registered: no state change, no panic.
    scheduler.tick();
    scheduler.tick();
    assert_eq!(scheduler.in_flight().in_flight_items, 0);

    // Saturated capacity: ticks admit nothing further.
    let gate = Arc::new(Semaphore::new(0));
    let mut group = summary_group();
    for _ in 0..4 {
        let gate = Arc::clone(&gate);
        group.push(TaskItem::new(5, async move {
            let _permit = gate.acquire().await.unwrap();
            Ok(Uuid::new_v4())
        }));
    }
    let completion = scheduler.submit(group).unwrap();

    let before = scheduler.in_flight();
    assert_eq!(before.in_flight_items, 2);
    scheduler.tick();
    scheduler.tick();
    assert_eq!(scheduler.in_flight(), before);

    gate.add_permits(4);
    let summary = completion.await;
    assert_eq!(summary.entries_added, 4);
}

#[tokio::test]
async fn test_conservation_with_random_workloads_and_failures() {
    let scheduler = LoaderScheduler::new(limits(8, 10 * MIB), TestSpawner).unwrap();

    let mut rng = rand::rng();
    let workloads: Vec<u64> = (0..25).map(|_| rng.random_range(1..=4) * MIB).collect();

    let mut group = summary_group();
    for (i, workload) in workloads.into_iter().enumerate() {
        group.push(TaskItem::new(workload, async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            if i % 5 == 0 {
                anyhow::bail!("simulated loader failure {i}");
            }
            Ok(Uuid::new_v4())
        }));
    }

    let summary = scheduler.submit(group).unwrap().await;
    assert_eq!(summary.settled(), 25);
    assert_eq!(summary.failures.len(), 5);
    assert_eq!(summary.entries_added, 20);

    // No leak, no double-release, regardless of failure mix.
    let idle = scheduler.in_flight();
    assert_eq!(idle.in_flight_items, 0);
    assert_eq!(idle.in_flight_workload, 0);
    assert_eq!(scheduler.registered_groups(), 0);
}
