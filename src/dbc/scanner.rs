//! Character scanner for single DBC records.
//!
//! A record is one line; the scanner walks it left to right and reports
//! layout violations as [`DbcError::MalformedRecord`] carrying the record kind,
//! the line number and the offending text.

use std::str::FromStr;

use super::RecordKind;
use crate::error::{DbcError, Result};

/// Characters that end a bare word (numbers, codes, names).
const DELIMITERS: &[char] = &['|', '@', ',', '(', ')', '[', ']', ':', ';', '"'];

/// Cursor over the text of one record.
pub struct Scanner<'a> {
    kind: RecordKind,
    line: usize,
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `text`.
    pub fn new(kind: RecordKind, line: usize, text: &'a str) -> Self {
        Self {
            kind,
            line,
            text,
            pos: 0,
        }
    }

    /// Build a malformed record error for this line.
    pub fn error(&self, message: impl Into<String>) -> DbcError {
        DbcError::malformed(self.kind, self.line, self.text, message)
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Skip whitespace, returning whether any was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        let rest = self.remaining();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    /// Peek at the next non-whitespace character.
    pub fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.remaining().chars().next()
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consume `ch` if it is the next non-whitespace character.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Require `ch` as the next non-whitespace character.
    pub fn expect(&mut self, ch: char, what: &str) -> Result<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{ch}' {what}")))
        }
    }

    /// Consume the record keyword.
    pub fn keyword(&mut self) -> Result<()> {
        self.skip_whitespace();
        let keyword = self.kind.keyword();
        if self.remaining().starts_with(keyword) {
            self.pos += keyword.len();
            Ok(())
        } else {
            Err(self.error(format!("expected keyword {keyword}")))
        }
    }

    /// Read a single raw character without skipping whitespace.
    pub fn next_char(&mut self, what: &str) -> Result<char> {
        match self.remaining().chars().next() {
            Some(ch) => {
                self.pos += ch.len_utf8();
                Ok(ch)
            }
            None => Err(self.error(format!("missing {what}"))),
        }
    }

    /// Read a C-style identifier.
    pub fn identifier(&mut self, what: &str) -> Result<&'a str> {
        self.skip_whitespace();
        let rest = self.remaining();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error(format!("missing {what}")));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Read a bare word, ending at whitespace or punctuation.
    pub fn word(&mut self, what: &str) -> Result<&'a str> {
        self.skip_whitespace();
        let rest = self.remaining();
        let len = rest
            .find(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error(format!("missing {what}")));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Read a word and convert it to a number.
    pub fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let word = self.word(what)?;
        word.parse::<T>()
            .map_err(|_| self.error(format!("invalid {what} '{word}'")))
    }

    /// Read a word and convert it to a finite float.
    pub fn float(&mut self, what: &str) -> Result<f64> {
        let word = self.word(what)?;
        match word.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.error(format!("invalid {what} '{word}'"))),
        }
    }

    /// Read a double-quoted string that closes on this line.
    pub fn quoted(&mut self, what: &str) -> Result<&'a str> {
        self.expect('"', &format!("before {what}"))?;
        let rest = self.remaining();
        match rest.find('"') {
            Some(end) => {
                self.pos += end + 1;
                Ok(&rest[..end])
            }
            None => Err(self.error(format!("unterminated {what}"))),
        }
    }

    /// Take everything after the cursor, leaving the scanner at the end.
    pub fn rest(&mut self) -> &'a str {
        let rest = self.remaining();
        self.pos = self.text.len();
        rest
    }

    /// Require that nothing but whitespace is left.
    pub fn finish(&mut self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            let trailing = self.remaining().to_string();
            Err(self.error(format!("unexpected trailing text '{trailing}'")))
        }
    }
}
