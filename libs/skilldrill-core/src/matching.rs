//! Answer matching for submitted answers.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::ContentIntegrityError;
use crate::types::{Item, MatchRule};

/// Log target for content defects found while grading.
pub const INTEGRITY_TARGET: &str = "content_integrity";

/// A regex rule compiled once when content is loaded.
///
/// Always anchored at the start of the input, whatever the authored pattern
/// looks like. Two patterns are equal when their source and case handling
/// are equal.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    case_sensitive: bool,
    regex: Regex,
}

impl Pattern {
    pub fn new(
        source: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, ContentIntegrityError> {
        let source = source.into();
        // Wrapping keeps a top-level `|` from escaping the anchor.
        let regex = RegexBuilder::new(&format!("^(?:{})", source))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| ContentIntegrityError::MalformedRegex {
                pattern: source.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source,
            case_sensitive,
            regex,
        })
    }

    /// The pattern as authored.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_sensitive == other.case_sensitive
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

/// Decide whether `submitted` satisfies the item's match rule.
///
/// Fails closed: an item whose rule cannot be evaluated grades as incorrect
/// and the defect is reported on the `content_integrity` log target.
pub fn evaluate(submitted: &str, item: &Item) -> bool {
    match try_evaluate(submitted, item) {
        Ok(correct) => correct,
        Err(err) => {
            tracing::error!(
                target: INTEGRITY_TARGET,
                topic_id = %item.topic_id,
                item_id = %item.id,
                error = %err,
                "match rule is unusable, grading as incorrect"
            );
            false
        }
    }
}

/// Like [`evaluate`] but reports content defects instead of hiding them.
pub fn try_evaluate(submitted: &str, item: &Item) -> Result<bool, ContentIntegrityError> {
    if let Some(defect) = &item.defect {
        return Err(defect.clone());
    }

    match &item.rule {
        MatchRule::Exact => Ok(item.answers.iter().any(|answer| answer == submitted)),
        MatchRule::Normalized {
            case_sensitive,
            normalize_whitespace,
        } => {
            let typed = normalize(submitted, *case_sensitive, *normalize_whitespace);
            Ok(item
                .answers
                .iter()
                .any(|answer| normalize(answer, *case_sensitive, *normalize_whitespace) == typed))
        }
        MatchRule::Regex(pattern) => Ok(pattern.is_match(submitted.trim())),
    }
}

fn normalize(s: &str, case_sensitive: bool, normalize_whitespace: bool) -> String {
    let s = if normalize_whitespace {
        collapse_whitespace(s)
    } else {
        s.to_string()
    };
    if case_sensitive {
        s
    } else {
        s.to_lowercase()
    }
}

/// Trim and collapse runs of whitespace to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
