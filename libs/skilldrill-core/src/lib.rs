//! Grading and progress core shared by the skill trainer services.
//!
//! Provides:
//! - Answer matching (exact, normalized, start-anchored regex)
//! - The per-user, per-topic progress ledger
//! - Ring and checklist projections over a ledger
//! - Parser for topic content files

pub mod content;
pub mod error;
pub mod ledger;
pub mod matching;
pub mod projection;
pub mod types;

pub use content::parse_topic;
pub use error::{ContentIntegrityError, LedgerError, ParseError, Result};
pub use ledger::TopicLedger;
pub use matching::{evaluate, try_evaluate, Pattern};
pub use projection::{checklist, ring, Ring};
pub use types::{
    AttemptRecord, Item, ItemState, LedgerKey, MatchRule, ResetScope, Topic, ALL_TOPICS,
};
