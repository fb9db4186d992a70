//! Grades one submission and records it.

use std::sync::Arc;

use chrono::Utc;
use skilldrill_core::{matching, LedgerKey, TopicLedger};

use crate::error::{ApiError, Result};
use crate::services::progress::ProgressStore;

/// Result of a durably recorded submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub correct: bool,
    /// Ledger for the topic after the write.
    pub ledger: TopicLedger,
}

/// Runs the matcher and persists the result through the progress store.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    progress: Arc<ProgressStore>,
}

impl SubmissionCoordinator {
    pub fn new(progress: Arc<ProgressStore>) -> Self {
        Self { progress }
    }

    /// Grade `submitted_text` for an item and record the attempt.
    ///
    /// Unknown topics or items are rejected before anything is written. If
    /// the write fails the error is returned and no grade is reported.
    pub async fn submit(
        &self,
        user_id: &str,
        topic_id: &str,
        item_id: &str,
        submitted_text: &str,
    ) -> Result<SubmissionOutcome> {
        let catalog = self.progress.catalog();
        if catalog.topic(topic_id).is_none() {
            return Err(ApiError::UnknownTopic(topic_id.to_string()));
        }
        let item = catalog
            .item(topic_id, item_id)
            .ok_or_else(|| ApiError::UnknownItem {
                topic_id: topic_id.to_string(),
                item_id: item_id.to_string(),
            })?;

        let correct = matching::evaluate(submitted_text, item);

        let key = LedgerKey::new(user_id, topic_id);
        let ledger = self
            .progress
            .write(&key, item_id, correct, submitted_text, Utc::now())
            .await
            .map_err(|e| {
                tracing::warn!("Submission for {} item {} not recorded: {}", key, item_id, e);
                e
            })?;

        tracing::debug!(
            "Recorded {} answer for {} item {}",
            if correct { "correct" } else { "incorrect" },
            key,
            item_id
        );

        Ok(SubmissionOutcome { correct, ledger })
    }
}
