//! Scheduling event sinks.
//!
//! Provides an observer seam for submission, admission, and completion
//! events, plus a bounded in-memory sink for development and tests.

use std::collections::VecDeque;

use crate::util::clock::now_ms;

/// Scheduling actions a sink can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    /// A group was registered.
    Submit,
    /// An item was admitted and its operation spawned.
    Admit,
    /// An item settled (success or failure) and released capacity.
    Settle,
    /// A group's last item settled and its completion fired.
    Complete,
}

/// One recorded scheduling event.
#[derive(Debug, Clone)]
pub struct ScheduleEvent {
    /// Group the event belongs to.
    pub group_id: String,
    /// Item the event belongs to, if item-scoped.
    pub item_id: Option<String>,
    /// Action taken.
    pub action: ScheduleAction,
    /// Timestamp milliseconds since epoch.
    pub created_at_ms: u128,
    /// Additional context (e.g. failure text on settle).
    pub detail: Option<String>,
}

/// Scheduling event sink abstraction.
pub trait ScheduleSink: Send {
    /// Record a scheduling event.
    fn record(&mut self, event: ScheduleEvent);
}

/// In-memory sink with a bounded buffer, for testing and dev.
pub struct InMemorySink {
    events: VecDeque<ScheduleEvent>,
    max_events: usize,
}

impl InMemorySink {
    /// Create a sink that retains at most `max_events`, dropping the oldest.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Snapshot of stored events.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.events.iter().cloned().collect()
    }
}

impl ScheduleSink for InMemorySink {
    fn record(&mut self, event: ScheduleEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an event from context.
pub fn build_event(
    group_id: impl Into<String>,
    item_id: Option<String>,
    action: ScheduleAction,
    detail: Option<String>,
) -> ScheduleEvent {
    ScheduleEvent {
        group_id: group_id.into(),
        item_id,
        action,
        created_at_ms: now_ms(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_buffer_drops_oldest() {
        let mut sink = InMemorySink::new(2);
        sink.record(build_event("g1", None, ScheduleAction::Submit, None));
        sink.record(build_event("g2", None, ScheduleAction::Submit, None));
        sink.record(build_event("g3", None, ScheduleAction::Submit, None));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].group_id, "g2");
        assert_eq!(events[1].group_id, "g3");
    }

    #[test]
    fn test_event_carries_detail() {
        let event = build_event(
            "g1",
            Some("i1".into()),
            ScheduleAction::Settle,
            Some("read failed".into()),
        );
        assert_eq!(event.action, ScheduleAction::Settle);
        assert_eq!(event.detail.as_deref(), Some("read failed"));
    }
}
