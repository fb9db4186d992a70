//! Progress store: persistent ledgers plus the ring and checklist views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use skilldrill_core::{projection, LedgerKey, ResetScope, Ring, TopicLedger};

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::TopicProgress;
use crate::services::catalog::ContentCatalog;
use crate::services::locks::KeyedLocks;

/// Reads and writes per-(user, topic) ledgers.
///
/// Writes for the same key are serialized in-process, and every write is a
/// single version-checked transaction.
pub struct ProgressStore {
    db: Database,
    catalog: Arc<ContentCatalog>,
    locks: KeyedLocks<LedgerKey>,
}

impl ProgressStore {
    pub fn new(db: Database, catalog: Arc<ContentCatalog>) -> Self {
        Self {
            db,
            catalog,
            locks: KeyedLocks::new(),
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    fn seed_total(&self, topic_id: &str) -> Result<usize> {
        self.catalog
            .item_count(topic_id)
            .ok_or_else(|| ApiError::UnknownTopic(topic_id.to_string()))
    }

    /// `total_items` recorded in the stored row, falling back to the topic's
    /// current size when the row has none usable.
    async fn stored_total(&self, key: &LedgerKey) -> Result<usize> {
        let stored = self
            .db
            .find_ledger(key)
            .await?
            .and_then(|row| usize::try_from(row.total_items).ok());

        match stored {
            Some(total) => Ok(total),
            None => self.seed_total(&key.topic_id),
        }
    }

    /// Load a ledger, creating it from the topic's current size on first use.
    pub async fn read(&self, key: &LedgerKey) -> Result<TopicLedger> {
        let seed_total = self.seed_total(&key.topic_id)?;
        self.db.get_or_create_ledger(key, seed_total).await
    }

    /// Record a graded submission and return the updated ledger.
    pub async fn write(
        &self,
        key: &LedgerKey,
        item_id: &str,
        correct: bool,
        submitted_text: &str,
        now: DateTime<Utc>,
    ) -> Result<TopicLedger> {
        let seed_total = self.seed_total(&key.topic_id)?;
        let _guard = self.locks.acquire(key).await;

        self.db
            .update_ledger(key, seed_total, |ledger| {
                ledger.record_attempt(item_id, correct, submitted_text, now)
            })
            .await
    }

    /// Clear attempt state for one topic or for all of a user's topics.
    pub async fn reset(&self, user_id: &str, scope: &ResetScope) -> Result<u64> {
        let reset = match scope {
            ResetScope::Topic(topic_id) => {
                self.seed_total(topic_id)?;
                let key = LedgerKey::new(user_id, topic_id.as_str());
                let _guard = self.locks.acquire(&key).await;
                self.db.reset_ledgers(user_id, Some(topic_id.as_str())).await?
            }
            ResetScope::All => {
                // Ledgers can only be written for catalog topics, so locking
                // those keys excludes every concurrent write for this user.
                let keys: Vec<LedgerKey> = self
                    .catalog
                    .topics()
                    .map(|topic| LedgerKey::new(user_id, topic.id.as_str()))
                    .collect();
                let _guards = self.locks.acquire_all(&keys).await;
                self.db.reset_ledgers(user_id, None).await?
            }
        };

        tracing::info!("Reset {} ledgers for user {} ({:?})", reset, user_id, scope);
        Ok(reset)
    }

    /// Completion ring. An unreadable ledger shows as an empty ring.
    pub async fn ring(&self, key: &LedgerKey) -> Result<Ring> {
        match self.read(key).await {
            Ok(ledger) => Ok(projection::ring(&ledger)),
            Err(ApiError::CorruptLedger(reason)) => {
                tracing::warn!("Showing empty ring for {}: {}", key, reason);
                Ok(Ring {
                    completed: 0,
                    total: self.stored_total(key).await?,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Pass/fail checklist aligned to `item_ids`, or to the topic's authored
    /// order when none are given.
    pub async fn checklist(
        &self,
        key: &LedgerKey,
        item_ids: Option<Vec<String>>,
    ) -> Result<Vec<bool>> {
        let item_ids = match item_ids {
            Some(ids) => ids,
            None => self
                .catalog
                .topic(&key.topic_id)
                .map(|topic| topic.item_ids())
                .ok_or_else(|| ApiError::UnknownTopic(key.topic_id.clone()))?,
        };

        match self.read(key).await {
            Ok(ledger) => Ok(projection::checklist(&ledger, &item_ids)),
            Err(ApiError::CorruptLedger(reason)) => {
                tracing::warn!("Showing empty checklist for {}: {}", key, reason);
                Ok(vec![false; item_ids.len()])
            }
            Err(e) => Err(e),
        }
    }

    /// Ring for every topic in the catalog.
    pub async fn overview(&self, user_id: &str) -> Result<Vec<TopicProgress>> {
        let mut overview = Vec::new();
        for topic in self.catalog.topics() {
            let ring = self.ring(&LedgerKey::new(user_id, topic.id.as_str())).await?;
            overview.push(TopicProgress {
                topic_id: topic.id.clone(),
                completed: ring.completed,
                total: ring.total,
                percent: ring.percent(),
            });
        }
        Ok(overview)
    }
}
