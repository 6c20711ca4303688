//! The canonical accumulating result payload for ingestion groups.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::TaskOutcome;

/// Accumulated outcome of one ingestion request.
///
/// Partial success is the common case and must be representable: "27 of 30
/// files added, 3 failed" is a summary, not an error. Item operations
/// resolve with the identifier of the entry they wrote; failures are folded
/// in as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Entries successfully written to the knowledge base.
    pub entries_added: u32,
    /// Identifiers of the written entries.
    pub entry_ids: Vec<Uuid>,
    /// One message per failed item.
    pub failures: Vec<String>,
}

impl IngestSummary {
    /// Fold one item settlement into the summary.
    ///
    /// This is the fold a conforming source installs on its task groups:
    /// `TaskGroup::new(IngestSummary::default(), IngestSummary::apply)`.
    pub fn apply(&mut self, outcome: TaskOutcome<Uuid>) {
        match outcome.outcome {
            Ok(entry_id) => {
                self.entries_added += 1;
                self.entry_ids.push(entry_id);
            }
            Err(err) => self.failures.push(err.to_string()),
        }
    }

    /// Total items that have settled so far.
    pub fn settled(&self) -> usize {
        self.entries_added as usize + self.failures.len()
    }

    /// Whether every settled item succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
