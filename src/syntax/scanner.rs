//! Positional cursor over the input text.
//!
//! A [`Scanner`] is a `Copy` value: every operation returns the advanced state
//! and leaves the receiver untouched, so backtracking is just reusing an older
//! scanner.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ErrorKind, Fault};
use crate::syntax::{Span, Terminal, TokenKind};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\n]+").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    /// A scanner over `text` positioned at byte `cursor`. Positions past the
    /// end or inside a multi-byte character are rounded down.
    pub fn at(text: &'a str, cursor: usize) -> Self {
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self { text, cursor }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> &'a str {
        &self.text[self.cursor..]
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.text.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(self, by: usize) -> Self {
        Self {
            text: self.text,
            cursor: self.cursor + by,
        }
    }

    /// Consumes `pattern` at the cursor if it matches there. Returns the
    /// skipped text, empty when nothing matched.
    pub fn skip_pattern(self, pattern: &Regex) -> (&'a str, Self) {
        match anchored_len(pattern, self.remaining()) {
            Some(len) => (&self.remaining()[..len], self.advance(len)),
            None => ("", self),
        }
    }

    /// Skips spaces, tabs and newlines.
    pub fn skip_whitespace(self) -> (&'a str, Self) {
        self.skip_pattern(&WHITESPACE)
    }

    /// Matches a non-empty `pattern` at the cursor and wraps it as a terminal
    /// of `kind`.
    pub fn match_pattern(self, pattern: &Regex, kind: TokenKind) -> Option<(Terminal, Self)> {
        let len = anchored_len(pattern, self.remaining()).filter(|len| *len > 0)?;
        let terminal = Terminal {
            kind,
            text: self.remaining()[..len].to_string(),
            span: Span::new(self.cursor, self.cursor + len),
        };
        Some((terminal, self.advance(len)))
    }

    /// Matches a maximal run of ASCII digits. A run too large for `i64` is a
    /// fault rather than a failed match.
    pub fn match_integer(self) -> Result<Option<(i64, Self)>, Fault> {
        let Some((digits, next)) = self.match_pattern(&DIGITS, TokenKind::Integer) else {
            return Ok(None);
        };
        let value = digits.text.parse::<i64>().map_err(|_| {
            Fault::new(
                ErrorKind::InvalidLiteral {
                    value: digits.text.clone(),
                },
                digits.span,
            )
        })?;
        Ok(Some((value, next)))
    }
}

/// Length of the match of `pattern` if it starts exactly at the beginning of
/// `haystack`.
fn anchored_len(pattern: &Regex, haystack: &str) -> Option<usize> {
    pattern
        .find(haystack)
        .filter(|m| m.start() == 0)
        .map(|m| m.end())
}
