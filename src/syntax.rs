//! Syntax module for arithmetic expressions
//!
//! Holds the node types shared by every stage of a parse: spans, token kinds,
//! terminals and the generic [`Node`] produced by matchers and builders.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod builders;
pub mod combinators;
pub mod grammar;
pub mod scanner;
pub mod terminals;

pub use combinators::{Nodify, Parser, Reply, Trace};
pub use grammar::{arithmetic_grammar, Grammar, GrammarBuilder, RuleId};
pub use scanner::Scanner;

/// Represents a byte span in the input text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span, used for "ran out of input" positions.
    pub fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lexical token kinds of the arithmetic lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    Add,
    Sub,
    Mult,
    Div,
    Integer,
}

impl TokenKind {
    /// Stable upper-case name of the token.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenParen => "OPENPAREN",
            Self::CloseParen => "CLOSEPAREN",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mult => "MULT",
            Self::Div => "DIV",
            Self::Integer => "INT",
        }
    }

    /// How the token reads in an error message.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::Add => "'+'",
            Self::Sub => "'-'",
            Self::Mult => "'*'",
            Self::Div => "'/'",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A matched lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Result unit produced by matchers, combinators and builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Terminal(Terminal),
    Int(i64),
    /// Ordered results of a sequence or a repetition.
    Seq(Vec<Node>),
}

impl Node {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Node::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Node::Terminal(terminal) => Some(terminal),
            _ => None,
        }
    }

    pub fn into_seq(self) -> Option<Vec<Node>> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape name for internal error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Node::Terminal(_) => "terminal",
            Node::Int(_) => "integer",
            Node::Seq(_) => "sequence",
        }
    }
}

/// Joins expected token kinds into `'+', '-' or ')'` form.
pub fn describe_expected(kinds: &[TokenKind]) -> String {
    match kinds {
        [] => "an expression".to_string(),
        [only] => only.describe().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|kind| kind.describe()).collect();
            format!("{} or {}", head.join(", "), last.describe())
        }
    }
}
