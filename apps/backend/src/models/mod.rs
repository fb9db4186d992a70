//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, BTreeSet};

pub use skilldrill_core::{AttemptRecord, LedgerKey, Ring, TopicLedger};

use crate::error::{ApiError, Result};

// === Database Entity Types ===

/// Ledger row in SQLite. Set and map columns hold JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct DbLedger {
    pub user_id: String,
    pub topic_id: String,
    pub total_items: i64,
    pub passed: String,
    pub failed: String,
    pub last_attempt: String,
    pub retry_gate: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbLedger {
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.user_id.clone(), self.topic_id.clone())
    }

    /// Convert to skilldrill-core TopicLedger
    pub fn to_core_ledger(&self) -> Result<TopicLedger> {
        let passed: BTreeSet<String> =
            serde_json::from_str(&self.passed).map_err(|e| self.corrupt("passed", e))?;
        let failed: BTreeSet<String> =
            serde_json::from_str(&self.failed).map_err(|e| self.corrupt("failed", e))?;
        let last_attempt: BTreeMap<String, AttemptRecord> = serde_json::from_str(&self.last_attempt)
            .map_err(|e| self.corrupt("last_attempt", e))?;
        let retry_gate: BTreeMap<String, DateTime<Utc>> =
            serde_json::from_str(&self.retry_gate).map_err(|e| self.corrupt("retry_gate", e))?;
        let total_items =
            usize::try_from(self.total_items).map_err(|e| self.corrupt("total_items", e))?;

        TopicLedger::restore(total_items, passed, failed, last_attempt, retry_gate)
            .map_err(|e| self.corrupt("sets", e))
    }

    fn corrupt(&self, column: &str, cause: impl std::fmt::Display) -> ApiError {
        ApiError::CorruptLedger(format!("{}: {} ({})", self.key(), column, cause))
    }
}

/// Column values for persisting a TopicLedger.
pub struct LedgerColumns {
    pub passed: String,
    pub failed: String,
    pub last_attempt: String,
    pub retry_gate: String,
}

impl LedgerColumns {
    /// Encode skilldrill-core TopicLedger
    pub fn from_core_ledger(ledger: &TopicLedger) -> Result<Self> {
        let encode = |e: serde_json::Error| ApiError::Internal(format!("ledger encoding: {}", e));
        Ok(Self {
            passed: serde_json::to_string(ledger.passed()).map_err(encode)?,
            failed: serde_json::to_string(ledger.failed()).map_err(encode)?,
            last_attempt: serde_json::to_string(ledger.last_attempt()).map_err(encode)?,
            retry_gate: serde_json::to_string(ledger.retry_gate()).map_err(encode)?,
        })
    }
}

// === API Request/Response Types ===

/// POST /api/topics/:topic_id/items/:item_id/answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
}

/// GET /api/topics/:topic_id/ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingResponse {
    pub completed: usize,
    pub total: usize,
}

impl From<Ring> for RingResponse {
    fn from(ring: Ring) -> Self {
        Self {
            completed: ring.completed,
            total: ring.total,
        }
    }
}

/// GET /api/topics/:topic_id/checklist
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistQuery {
    /// Comma separated item ids. Authored order when absent.
    pub items: Option<String>,
}

impl ChecklistQuery {
    pub fn item_ids(&self) -> Option<Vec<String>> {
        self.items.as_ref().map(|items| {
            items
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// DELETE /api/progress/:scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub reset: bool,
    pub ledgers: u64,
}

/// GET /api/topics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
    pub item_ids: Vec<String>,
}

/// GET /api/progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicProgress {
    pub topic_id: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(passed: &str, failed: &str) -> DbLedger {
        DbLedger {
            user_id: "u1".to_string(),
            topic_id: "docker".to_string(),
            total_items: 3,
            passed: passed.to_string(),
            failed: failed.to_string(),
            last_attempt: "{}".to_string(),
            retry_gate: "{}".to_string(),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ledger_columns_roundtrip() {
        let mut ledger = TopicLedger::new(3);
        ledger.record_attempt("ps", true, "docker ps", Utc::now());
        ledger.record_attempt("images", false, "docker img", Utc::now());

        let cols = LedgerColumns::from_core_ledger(&ledger).unwrap();
        let mut db = row(&cols.passed, &cols.failed);
        db.last_attempt = cols.last_attempt;
        db.retry_gate = cols.retry_gate;

        assert_eq!(db.to_core_ledger().unwrap(), ledger);
    }

    #[test]
    fn test_overlapping_sets_are_corrupt() {
        let db = row(r#"["ps"]"#, r#"["ps"]"#);
        assert!(matches!(db.to_core_ledger(), Err(ApiError::CorruptLedger(_))));
    }

    #[test]
    fn test_malformed_json_is_corrupt() {
        let db = row("not json", "[]");
        assert!(matches!(db.to_core_ledger(), Err(ApiError::CorruptLedger(_))));
    }

    #[test]
    fn test_checklist_query_parsing() {
        let query = ChecklistQuery {
            items: Some("a, b,,c".to_string()),
        };
        assert_eq!(
            query.item_ids(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(ChecklistQuery::default().item_ids(), None);
    }
}
