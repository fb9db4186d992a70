//! Core types for the skill trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ContentIntegrityError;
use crate::matching::Pattern;

/// Topic id that names every topic at once when resetting progress.
pub const ALL_TOPICS: &str = "all";

/// How a submitted answer is compared against an item's canonical answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// Byte equality.
    Exact,
    /// Equality after optional case folding and whitespace collapsing.
    Normalized {
        case_sensitive: bool,
        normalize_whitespace: bool,
    },
    /// Start-anchored regular expression, compiled at load time.
    Regex(Pattern),
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::Normalized {
            case_sensitive: false,
            normalize_whitespace: true,
        }
    }
}

/// One gradeable prompt within a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub topic_id: String,
    pub id: String,
    pub prompt: String,
    /// Canonical answers in authored order.
    pub answers: Vec<String>,
    pub rule: MatchRule,
    /// Set when the authored rule could not be understood. Such items always
    /// grade as incorrect.
    pub defect: Option<ContentIntegrityError>,
}

impl Item {
    pub fn new(
        topic_id: impl Into<String>,
        id: impl Into<String>,
        answers: Vec<String>,
        rule: MatchRule,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            id: id.into(),
            prompt: String::new(),
            answers,
            rule,
            defect: None,
        }
    }
}

/// Named collection of items, in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

impl Topic {
    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Item ids in authored order.
    pub fn item_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

/// The most recent submission for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub item_id: String,
    pub submitted_text: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

/// Composite key of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    pub user_id: String,
    pub topic_id: String,
}

impl LedgerKey {
    pub fn new(user_id: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic_id: topic_id.into(),
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.topic_id)
    }
}

/// Per-item state, derived from ledger set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Unattempted,
    Passed,
    Failed,
}

/// Which ledgers a reset clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetScope {
    Topic(String),
    All,
}

impl ResetScope {
    /// Parse a path segment: `all` or a topic id.
    pub fn parse(scope: &str) -> Self {
        if scope == ALL_TOPICS {
            Self::All
        } else {
            Self::Topic(scope.to_string())
        }
    }
}
