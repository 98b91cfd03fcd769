//! Arith Error Handling
//!
//! One public error type, [`ArithError`], carries what went wrong
//! ([`ErrorKind`]), where it happened (a span into the named input) and how to
//! help (a diagnostic code and optional help text). It renders through
//! `miette`.
//!
//! Inside the parser, fatal problems travel as a lightweight [`Fault`] and are
//! promoted to an `ArithError` once the input text is attached.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::Span;

// ============================================================================
// ERROR KINDS
// ============================================================================

/// Every way evaluating an expression can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A token from the lexicon appeared where a different one was required.
    #[error("syntax error: expected {expected}, found {found:?}")]
    UnexpectedToken { expected: String, found: char },

    /// A character outside the lexicon.
    #[error("syntax error: unrecognized character {found:?}")]
    UnrecognizedCharacter { found: char },

    /// The input ended while a rule still needed tokens.
    #[error("incomplete input: expected {expected}")]
    IncompleteInput { expected: String },

    /// A complete expression was followed by more non-whitespace input.
    #[error("unconsumed input after expression: '{found}'")]
    TrailingInput { found: String },

    /// A digit run that does not fit in a signed 64-bit integer.
    #[error("invalid integer literal '{value}'")]
    InvalidLiteral { value: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {operation}")]
    Overflow { operation: String },

    #[error("expression nests deeper than {limit} rule levels")]
    NestingTooDeep { limit: usize },

    /// Grammar wiring bug: a builder saw a node shape it does not accept.
    #[error("internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Evaluation,
    Limit,
    Internal,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Evaluation => "eval",
            Self::Limit => "limit",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedToken { .. }
            | Self::UnrecognizedCharacter { .. }
            | Self::IncompleteInput { .. }
            | Self::TrailingInput { .. }
            | Self::InvalidLiteral { .. } => ErrorCategory::Syntax,

            Self::DivisionByZero | Self::Overflow { .. } => ErrorCategory::Evaluation,

            Self::NestingTooDeep { .. } => ErrorCategory::Limit,

            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::UnrecognizedCharacter { .. } => "unrecognized_character",
            Self::IncompleteInput { .. } => "incomplete_input",
            Self::TrailingInput { .. } => "trailing_input",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::DivisionByZero => "division_by_zero",
            Self::Overflow { .. } => "overflow",
            Self::NestingTooDeep { .. } => "nesting_too_deep",
            Self::Internal { .. } => "internal",
        }
    }

    /// Full diagnostic code, e.g. `arith::eval::division_by_zero`.
    pub fn code(&self) -> String {
        format!("arith::{}::{}", self.category(), self.code_suffix())
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "unexpected token",
            Self::UnrecognizedCharacter { .. } => "not part of the expression language",
            Self::IncompleteInput { .. } => "input ends here",
            Self::TrailingInput { .. } => "left over",
            Self::InvalidLiteral { .. } => "does not fit in 64 bits",
            Self::DivisionByZero => "divisor evaluates to zero",
            Self::Overflow { .. } => "result out of range",
            Self::NestingTooDeep { .. } => "nesting limit reached here",
            Self::Internal { .. } => "while building this node",
        }
    }

    fn default_help(&self) -> Option<&'static str> {
        match self {
            Self::UnrecognizedCharacter { .. } => {
                Some("expressions may only contain digits, whitespace and ( ) + - * /")
            }
            Self::TrailingInput { .. } => Some(
                "whitespace is only skipped before integers unless whitespace is allowed before every token",
            ),
            Self::InvalidLiteral { .. } => Some("integers must lie between -2^63 and 2^63-1"),
            Self::Internal { .. } => {
                Some("This is an internal grammar error. Please report this as a bug.")
            }
            _ => None,
        }
    }
}

// ============================================================================
// FAULT - fatal errors inside the parser
// ============================================================================

/// A fatal error raised while parsing. Unlike a failed match, a fault is never
/// backtracked over; it aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: ErrorKind,
    pub span: Span,
}

impl Fault {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ============================================================================
// ARITH ERROR - the public error type
// ============================================================================

/// Where an error happened.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: Span,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// The single error type returned by evaluation.
#[derive(Debug, Clone)]
pub struct ArithError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

impl ArithError {
    /// Create an error located at `span` of the named input.
    pub fn new(name: &str, input: &str, kind: ErrorKind, span: Span) -> Self {
        let diagnostic_info = DiagnosticInfo {
            help: kind.default_help().map(str::to_string),
            error_code: kind.code(),
        };
        Self {
            kind,
            source_info: SourceInfo {
                source: Arc::new(NamedSource::new(name, input.to_string())),
                primary_span: span,
            },
            diagnostic_info,
        }
    }

    pub fn from_fault(name: &str, input: &str, fault: Fault) -> Self {
        Self::new(name, input, fault.kind, fault.span)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn code(&self) -> &str {
        &self.diagnostic_info.error_code
    }

    pub fn span(&self) -> Span {
        self.source_info.primary_span
    }

    /// Byte offset where the error starts.
    pub fn offset(&self) -> usize {
        self.source_info.primary_span.start
    }

    /// The span the diagnostic label is drawn under. miette does not draw a
    /// zero-width label at the very end of the source, so an end-of-input
    /// position is moved onto the last non-whitespace character.
    pub fn label_span(&self) -> Span {
        let span = self.source_info.primary_span;
        let text = self.source_info.source.inner();
        if !span.is_empty() || span.start < text.len() {
            return span;
        }
        text.char_indices()
            .rev()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(at, c)| Span::new(at, at + c.len_utf8()))
            .unwrap_or(span)
    }
}

impl std::error::Error for ArithError {}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl Diagnostic for ArithError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            to_source_span(self.label_span()),
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// GRAMMAR CONSTRUCTION ERRORS
// ============================================================================

/// Errors raised while wiring a rule table together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule '{name}' was declared but never defined")]
    Unbound { name: String },

    #[error("rule '{name}' is defined more than once")]
    Redefined { name: String },

    #[error("rule id {index} does not belong to this grammar")]
    UnknownRule { index: usize },
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Converts a span into a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

/// Prints an ArithError with full miette diagnostics to stderr.
pub fn print_error(error: ArithError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_combine_category_and_suffix() {
        assert_eq!(
            ErrorKind::DivisionByZero.code(),
            "arith::eval::division_by_zero"
        );
        assert_eq!(
            ErrorKind::IncompleteInput {
                expected: "integer".into()
            }
            .code(),
            "arith::syntax::incomplete_input"
        );
        assert_eq!(
            ErrorKind::NestingTooDeep { limit: 3 }.code(),
            "arith::limit::nesting_too_deep"
        );
    }

    #[test]
    fn diagnostic_exposes_code_label_and_source() {
        let error = ArithError::new("<input>", "5/0", ErrorKind::DivisionByZero, Span::new(0, 3));
        assert_eq!(error.to_string(), "division by zero");
        assert_eq!(
            Diagnostic::code(&error).map(|c| c.to_string()),
            Some("arith::eval::division_by_zero".to_string())
        );
        let labels: Vec<LabeledSpan> = error.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 0);
        assert_eq!(labels[0].len(), 3);
        assert!(error.source_code().is_some());
    }

    #[test]
    fn end_of_input_label_lands_on_the_last_character() {
        let incomplete = ErrorKind::IncompleteInput {
            expected: "')'".into(),
        };
        let error = ArithError::new("<input>", "(1+2 ", incomplete.clone(), Span::point(5));
        assert_eq!(error.offset(), 5);
        assert_eq!(error.label_span(), Span::new(3, 4));
        let labels: Vec<LabeledSpan> = error.labels().into_iter().flatten().collect();
        assert_eq!(labels[0].offset(), 3);
        assert_eq!(labels[0].len(), 1);

        // positions inside the text are drawn where they are
        let error = ArithError::new("<input>", "2+", incomplete.clone(), Span::point(1));
        assert_eq!(error.label_span(), Span::point(1));

        let error = ArithError::new("<input>", "", incomplete, Span::point(0));
        assert_eq!(error.label_span(), Span::point(0));
    }

    #[test]
    fn help_can_be_overridden() {
        let error = ArithError::new(
            "<input>",
            "2 + 3",
            ErrorKind::TrailingInput {
                found: "+ 3".into(),
            },
            Span::new(2, 5),
        );
        assert!(error.diagnostic_info.help.is_some());
        let error = error.with_help("remove the spaces");
        assert_eq!(error.diagnostic_info.help.as_deref(), Some("remove the spaces"));
    }
}
