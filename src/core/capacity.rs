//! Two-dimensional capacity accounting for in-flight ingestion work.

use crate::config::SchedulerLimits;

/// Point-in-time view of the accountant, for metrics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacitySnapshot {
    /// Items currently admitted and not yet settled.
    pub in_flight_items: u32,
    /// Declared workload bytes currently admitted and not yet settled.
    pub in_flight_workload: u64,
}

/// Tracks in-flight item count and declared workload bytes against two caps.
///
/// The accountant answers "is there room to admit one more item of size S"
/// and is the sole backpressure mechanism of the scheduler. It is always
/// mutated under the scheduler's state lock, never shared elsewhere; counter
/// drift would permanently leak or permanently block capacity, so release
/// underflow is fatal rather than saturating.
#[derive(Debug)]
pub struct CapacityAccountant {
    max_items: u32,
    max_workload: u64,
    in_flight_items: u32,
    in_flight_workload: u64,
}

impl CapacityAccountant {
    /// Create an accountant for the given limits, with nothing in flight.
    pub const fn new(limits: &SchedulerLimits) -> Self {
        Self {
            max_items: limits.max_items,
            max_workload: limits.max_workload_bytes,
            in_flight_items: 0,
            in_flight_workload: 0,
        }
    }

    /// Whether one more item of `workload` declared bytes can be admitted
    /// right now. Combined check across both dimensions; evaluated only at
    /// the instant of consideration.
    pub const fn has_room(&self, workload: u64) -> bool {
        self.in_flight_items < self.max_items
            && self.in_flight_workload + workload <= self.max_workload
    }

    /// Charge both counters for an admitted item.
    ///
    /// # Panics
    ///
    /// Panics if called without a preceding [`Self::has_room`] check that
    /// passed; admitting past the caps is an accounting bug.
    pub fn admit(&mut self, workload: u64) {
        assert!(
            self.has_room(workload),
            "admitted item without capacity: {} items, {} + {} bytes",
            self.in_flight_items,
            self.in_flight_workload,
            workload
        );
        self.in_flight_items += 1;
        self.in_flight_workload += workload;
    }

    /// Release both counters for a settled item.
    ///
    /// # Panics
    ///
    /// Panics on underflow: a release that was never admitted means the
    /// counters have drifted and backpressure is already corrupt.
    pub fn release(&mut self, workload: u64) {
        self.in_flight_items = self
            .in_flight_items
            .checked_sub(1)
            .expect("capacity release without matching admit");
        self.in_flight_workload = self
            .in_flight_workload
            .checked_sub(workload)
            .expect("workload release exceeds in-flight total");
    }

    /// True when nothing is in flight.
    pub const fn is_idle(&self) -> bool {
        self.in_flight_items == 0 && self.in_flight_workload == 0
    }

    /// Snapshot both counters.
    pub const fn snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot {
            in_flight_items: self.in_flight_items,
            in_flight_workload: self.in_flight_workload,
        }
    }
}
