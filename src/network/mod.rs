//! Bus graph representation and validation.
//!
//! This module provides the in-memory representation of a network after
//! parsing. The [`Bus`] owns all nodes, messages, signals and attribute
//! definitions and answers lookups by name, by message id, and by
//! (message id, signal name).

mod graph;
mod types;
mod validate;

pub use graph::{AttributeDefinition, Bus, Message, Node, Signal};
pub use types::*;
pub use validate::{validate_network, ValidationIssue};
