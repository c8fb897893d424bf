//! Error types for the DBC parser.
//!
//! This module provides a unified error type [`DbcError`] that covers
//! all error conditions that can occur while decoding records, resolving
//! cross-references in the bus graph, and reading input.

use std::fmt;

use thiserror::Error;

use crate::dbc::RecordKind;

/// Result type alias using [`DbcError`].
pub type Result<T> = std::result::Result<T, DbcError>;

/// Kinds of entity that carry a unique identifier in the bus graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Message,
    Signal,
    AttributeDefinition,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Node => "node",
            Self::Message => "message",
            Self::Signal => "signal",
            Self::AttributeDefinition => "attribute definition",
        };
        f.write_str(name)
    }
}

/// Unified error type for all parser operations.
///
/// Every variant is fatal to the parse that produced it.
#[derive(Error, Debug)]
pub enum DbcError {
    // ============ Record Errors ============
    /// A line starts with a known keyword but does not match its field layout,
    /// or one of its fields failed typed conversion
    #[error("Malformed {kind} record at line {line}: {message} (in {text:?})")]
    MalformedRecord {
        kind: RecordKind,
        line: usize,
        text: String,
        message: String,
    },

    /// A signal record appeared with no open message
    #[error("Signal record at line {line} is not inside a message block")]
    ContextError { line: usize },

    // ============ Graph Errors ============
    /// Referenced node does not exist
    #[error("Node '{name}' not found")]
    UnknownNode { name: String },

    /// Referenced message id does not exist
    #[error("Message with id {id} not found")]
    UnknownMessage { id: u32 },

    /// Referenced signal does not exist in the given message
    #[error("Signal '{name}' not found in message {message_id}")]
    UnknownSignal { message_id: u32, name: String },

    /// An identifier that must be unique was defined twice
    #[error("Duplicate {kind} '{name}'")]
    DuplicateEntity { kind: EntityKind, name: String },

    // ============ I/O Errors ============
    /// Error reading the input
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DbcError {
    /// Create a malformed record error
    pub fn malformed(
        kind: RecordKind,
        line: usize,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            kind,
            line,
            text: text.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate entity error
    pub fn duplicate(kind: EntityKind, name: impl fmt::Display) -> Self {
        Self::DuplicateEntity {
            kind,
            name: name.to_string(),
        }
    }

    /// Whether this error is a failed lookup of a referenced entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownNode { .. } | Self::UnknownMessage { .. } | Self::UnknownSignal { .. }
        )
    }
}
