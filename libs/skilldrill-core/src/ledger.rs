//! Per-user, per-topic progress ledger.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::LedgerError;
use crate::types::{AttemptRecord, ItemState};

/// Mutable progress record for one `(user, topic)` pair.
///
/// An item is in at most one of `passed` and `failed`. `total_items` is the
/// topic size when the ledger was created and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLedger {
    total_items: usize,
    passed: BTreeSet<String>,
    failed: BTreeSet<String>,
    last_attempt: BTreeMap<String, AttemptRecord>,
    retry_gate: BTreeMap<String, DateTime<Utc>>,
}

impl TopicLedger {
    /// Create an empty ledger for a topic with `total_items` items.
    pub fn new(total_items: usize) -> Self {
        Self {
            total_items,
            passed: BTreeSet::new(),
            failed: BTreeSet::new(),
            last_attempt: BTreeMap::new(),
            retry_gate: BTreeMap::new(),
        }
    }

    /// Rebuild a ledger from stored parts, rejecting overlapping sets.
    pub fn restore(
        total_items: usize,
        passed: BTreeSet<String>,
        failed: BTreeSet<String>,
        last_attempt: BTreeMap<String, AttemptRecord>,
        retry_gate: BTreeMap<String, DateTime<Utc>>,
    ) -> Result<Self, LedgerError> {
        if let Some(item_id) = passed.intersection(&failed).next() {
            return Err(LedgerError::OverlappingItem(item_id.clone()));
        }

        Ok(Self {
            total_items,
            passed,
            failed,
            last_attempt,
            retry_gate,
        })
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn passed(&self) -> &BTreeSet<String> {
        &self.passed
    }

    pub fn failed(&self) -> &BTreeSet<String> {
        &self.failed
    }

    pub fn last_attempt(&self) -> &BTreeMap<String, AttemptRecord> {
        &self.last_attempt
    }

    pub fn retry_gate(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.retry_gate
    }

    /// Current state of an item.
    pub fn state_of(&self, item_id: &str) -> ItemState {
        if self.passed.contains(item_id) {
            ItemState::Passed
        } else if self.failed.contains(item_id) {
            ItemState::Failed
        } else {
            ItemState::Unattempted
        }
    }

    /// Record a submission. The latest result wins: a failure demotes a
    /// passed item and a pass promotes a failed one.
    pub fn record_attempt(
        &mut self,
        item_id: &str,
        correct: bool,
        submitted_text: &str,
        now: DateTime<Utc>,
    ) {
        self.last_attempt.insert(
            item_id.to_string(),
            AttemptRecord {
                item_id: item_id.to_string(),
                submitted_text: submitted_text.to_string(),
                correct,
                timestamp: now,
            },
        );

        if correct {
            self.failed.remove(item_id);
            self.passed.insert(item_id.to_string());
        } else {
            self.passed.remove(item_id);
            self.failed.insert(item_id.to_string());
        }
    }

    /// Note when an item becomes eligible for review again. Advisory only,
    /// nothing consults it before accepting a submission.
    pub fn set_retry_gate(&mut self, item_id: &str, available_at: DateTime<Utc>) {
        self.retry_gate.insert(item_id.to_string(), available_at);
    }

    /// Clear all attempt state, keeping `total_items` and the retry gate.
    pub fn reset(&mut self) {
        self.passed.clear();
        self.failed.clear();
        self.last_attempt.clear();
    }
}
