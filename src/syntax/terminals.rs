//! Terminal matchers for the arithmetic lexicon.
//!
//! Integer literals always skip leading whitespace. Parentheses and operators
//! only do so under [`WhitespacePolicy::BeforeEveryToken`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::WhitespacePolicy;
use crate::syntax::{Parser, TokenKind};

static OPEN_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(").unwrap());
static CLOSE_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\)").unwrap());
static ADD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+").unwrap());
static SUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-").unwrap());
static MULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*").unwrap());
static DIV: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/").unwrap());

/// Builds terminal parsers for one whitespace policy.
#[derive(Debug, Clone, Copy)]
pub struct Terminals {
    whitespace: WhitespacePolicy,
}

impl Terminals {
    pub fn new(whitespace: WhitespacePolicy) -> Self {
        Self { whitespace }
    }

    pub fn open_paren(&self) -> Parser {
        self.token(TokenKind::OpenParen, &OPEN_PAREN)
    }

    pub fn close_paren(&self) -> Parser {
        self.token(TokenKind::CloseParen, &CLOSE_PAREN)
    }

    pub fn add(&self) -> Parser {
        self.token(TokenKind::Add, &ADD)
    }

    pub fn sub(&self) -> Parser {
        self.token(TokenKind::Sub, &SUB)
    }

    pub fn mult(&self) -> Parser {
        self.token(TokenKind::Mult, &MULT)
    }

    pub fn div(&self) -> Parser {
        self.token(TokenKind::Div, &DIV)
    }

    pub fn integer(&self) -> Parser {
        Parser::integer().skipping_whitespace()
    }

    fn token(&self, kind: TokenKind, pattern: &Regex) -> Parser {
        let parser = Parser::token(kind, pattern);
        if self.whitespace.skips_before_operators() {
            parser.skipping_whitespace()
        } else {
            parser
        }
    }
}

/// Whitespace the integer matcher may skip.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// True for every character that can appear in a well-formed expression.
pub fn is_lexicon_char(c: char) -> bool {
    c.is_ascii_digit() || is_whitespace(c) || matches!(c, '(' | ')' | '+' | '-' | '*' | '/')
}
