//! Error types for skilldrill-core.

use thiserror::Error;

/// Result type alias using ParseError.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing a topic file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing ID before question at line {line}")]
    MissingId { line: usize },

    #[error("missing question for item `{id}` at line {line}")]
    MissingQuestion { id: String, line: usize },

    #[error("missing answer for item `{id}` at line {line}")]
    MissingAnswer { id: String, line: usize },

    #[error("invalid ID format at line {line}: {value:?}")]
    InvalidId { line: usize, value: String },

    #[error("duplicate ID `{id}` at line {line}")]
    DuplicateId { id: String, line: usize },

    #[error("topic id `{0}` is reserved")]
    ReservedTopicId(String),
}

/// Authored match rule that cannot be evaluated.
///
/// Never shown to the learner; grading fails closed and the defect is logged
/// for whoever maintains the content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentIntegrityError {
    #[error("unrecognized match mode `{0}`")]
    UnknownMode(String),

    #[error("unrecognized flag `{flag}` for match mode `{mode}`")]
    UnknownFlag { mode: String, flag: String },

    #[error("regex rule has no PATTERN line")]
    MissingPattern,

    #[error("PATTERN given for non-regex match mode `{0}`")]
    UnexpectedPattern(String),

    #[error("malformed regex `{pattern}`: {reason}")]
    MalformedRegex { pattern: String, reason: String },
}

/// Errors raised when rebuilding a ledger from stored parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("item `{0}` is both passed and failed")]
    OverlappingItem(String),
}
