//! Multi-line description text.
//!
//! A `CM_` record whose quoted text does not close with `";` on its own line
//! swallows every following raw line until one contains the terminator.

use crate::network::DescriptionTarget;

/// Closes description text. There is no escape for it.
pub const TERMINATOR: &str = "\";";

/// Return the text before the first terminator, if the line has one.
pub fn split_terminated(text: &str) -> Option<&str> {
    text.find(TERMINATOR).map(|end| &text[..end])
}

/// An open description waiting for its terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    target: DescriptionTarget,
    buffer: String,
    opened_at: usize,
    opening_line: String,
}

impl Continuation {
    /// Start a continuation with the partial text of the opening line.
    ///
    /// `opening_line` is the whole `CM_` record, kept for error reports.
    pub fn new(
        target: DescriptionTarget,
        first_line: &str,
        opened_at: usize,
        opening_line: &str,
    ) -> Self {
        let mut buffer = String::with_capacity(first_line.len() + 1);
        buffer.push_str(first_line);
        buffer.push('\n');
        Self {
            target,
            buffer,
            opened_at,
            opening_line: opening_line.to_string(),
        }
    }

    /// Feed the next raw line. Returns `true` once the terminator was found.
    pub fn feed(&mut self, line: &str) -> bool {
        match split_terminated(line) {
            Some(text) => {
                self.buffer.push_str(text);
                true
            }
            None => {
                self.buffer.push_str(line);
                self.buffer.push('\n');
                false
            }
        }
    }

    /// Line number of the record that opened this description.
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }

    /// The `CM_` record that opened this description.
    pub fn opening_line(&self) -> &str {
        &self.opening_line
    }

    pub fn target(&self) -> &DescriptionTarget {
        &self.target
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn into_parts(self) -> (DescriptionTarget, String) {
        (self.target, self.buffer)
    }
}
