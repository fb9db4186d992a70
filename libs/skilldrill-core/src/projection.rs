//! Read-only views over a ledger: the completion ring and the checklist.

use serde::{Deserialize, Serialize};

use crate::ledger::TopicLedger;

/// Completed/total ratio behind the progress ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ring {
    pub completed: usize,
    pub total: usize,
}

impl Ring {
    /// Completion as a whole percentage. An empty topic is 0%, and a ledger
    /// holding more passes than its snapshot caps at 100%.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.completed as f64 / self.total as f64;
        ((ratio * 100.0).round() as u32).min(100)
    }
}

/// Ring for a ledger.
pub fn ring(ledger: &TopicLedger) -> Ring {
    Ring {
        completed: ledger.passed().len(),
        total: ledger.total_items(),
    }
}

/// One entry per id, `true` iff that id is passed, in the order given.
pub fn checklist<S: AsRef<str>>(ledger: &TopicLedger, ordered_item_ids: &[S]) -> Vec<bool> {
    ordered_item_ids
        .iter()
        .map(|id| ledger.passed().contains(id.as_ref()))
        .collect()
}
