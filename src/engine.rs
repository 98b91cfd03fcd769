//! Evaluation entry points.
//!
//! Runs the compiled grammar over one expression, insists that only
//! whitespace follows the match, and turns failed parses into exactly one
//! [`ErrorKind`] using the furthest-failure trace.

use once_cell::sync::Lazy;

use crate::config::GrammarConfig;
use crate::errors::{ArithError, ErrorKind, GrammarError};
use crate::syntax::terminals::is_lexicon_char;
use crate::syntax::{arithmetic_grammar, describe_expected, Grammar, Reply, Scanner, Span, Trace};

/// Source name used in diagnostics when the caller does not supply one.
pub const DEFAULT_SOURCE_NAME: &str = "<expr>";

static DEFAULT_EVALUATOR: Lazy<Result<Evaluator, GrammarError>> =
    Lazy::new(|| Evaluator::new(GrammarConfig::default()));

/// Evaluates `input` with the default grammar, built once per process.
pub fn evaluate(input: &str) -> Result<i64, ArithError> {
    match &*DEFAULT_EVALUATOR {
        Ok(evaluator) => evaluator.evaluate(input),
        Err(error) => Err(grammar_failure(input, error)),
    }
}

/// Evaluates `input` with a grammar built for `config`.
pub fn evaluate_with(input: &str, config: &GrammarConfig) -> Result<i64, ArithError> {
    match Evaluator::new(*config) {
        Ok(evaluator) => evaluator.evaluate(input),
        Err(error) => Err(grammar_failure(input, &error)),
    }
}

/// A compiled arithmetic grammar plus the configuration it was built from.
#[derive(Debug, Clone)]
pub struct Evaluator {
    grammar: Grammar,
    config: GrammarConfig,
}

impl Evaluator {
    pub fn new(config: GrammarConfig) -> Result<Self, GrammarError> {
        Ok(Self {
            grammar: arithmetic_grammar(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn evaluate(&self, input: &str) -> Result<i64, ArithError> {
        self.evaluate_named(DEFAULT_SOURCE_NAME, input)
    }

    /// Like [`Evaluator::evaluate`], labelling diagnostics with `name`.
    pub fn evaluate_named(&self, name: &str, input: &str) -> Result<i64, ArithError> {
        let outcome = self.grammar.parse(input);
        let reply = outcome
            .result
            .map_err(|fault| ArithError::from_fault(name, input, fault))?;

        let (kind, span) = match reply {
            Reply::Failure => explain_failure(input, &outcome.trace),
            Reply::Success(node, rest) => {
                let (_, after) = rest.skip_whitespace();
                if after.is_at_end() {
                    return node.as_int().ok_or_else(|| {
                        ArithError::new(
                            name,
                            input,
                            ErrorKind::Internal {
                                message: format!("expression produced a {}", node.shape()),
                            },
                            Span::new(0, input.len()),
                        )
                    });
                }
                explain_leftover(input, rest, &outcome.trace)
            }
        };
        Err(ArithError::new(name, input, kind, span))
    }
}

/// The start rule matched but left input behind. A terminal that failed
/// beyond the end of the match is the better explanation (`"2+"` is missing
/// an operand, not carrying a stray `+`).
fn explain_leftover(input: &str, rest: Scanner<'_>, trace: &Trace) -> (ErrorKind, Span) {
    if trace.furthest().is_some_and(|at| at > rest.cursor()) {
        return explain_failure(input, trace);
    }
    let (_, leftover) = rest.skip_whitespace();
    match leftover.peek_char() {
        Some(found) if !is_lexicon_char(found) => unrecognized(found, leftover.cursor()),
        _ => (
            ErrorKind::TrailingInput {
                found: leftover.remaining().to_string(),
            },
            Span::new(leftover.cursor(), input.len()),
        ),
    }
}

/// Classifies the furthest position a terminal failed at. Whitespace there is
/// reported as found only when a lexicon character follows it.
fn explain_failure(input: &str, trace: &Trace) -> (ErrorKind, Span) {
    let at = trace.furthest().unwrap_or(0);
    let expected = describe_expected(trace.expected());
    let scanner = Scanner::at(input, at);
    let (_, after) = scanner.skip_whitespace();

    match (scanner.peek_char(), after.peek_char()) {
        (Some(found), Some(next)) if is_lexicon_char(next) => (
            ErrorKind::UnexpectedToken { expected, found },
            Span::new(at, at + found.len_utf8()),
        ),
        (_, Some(next)) => unrecognized(next, after.cursor()),
        _ => (ErrorKind::IncompleteInput { expected }, Span::point(input.len())),
    }
}

fn unrecognized(found: char, at: usize) -> (ErrorKind, Span) {
    (
        ErrorKind::UnrecognizedCharacter { found },
        Span::new(at, at + found.len_utf8()),
    )
}

fn grammar_failure(input: &str, error: &GrammarError) -> ArithError {
    ArithError::new(
        DEFAULT_SOURCE_NAME,
        input,
        ErrorKind::Internal {
            message: error.to_string(),
        },
        Span::point(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitespacePolicy;
    use crate::errors::ErrorCategory;

    fn kind_of(input: &str) -> ErrorKind {
        evaluate(input).unwrap_err().kind
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20);
        assert_eq!(evaluate("((1+2))").unwrap(), 3);
    }

    #[test]
    fn trailing_whitespace_is_accepted() {
        assert_eq!(evaluate("1+2 \n").unwrap(), 3);
    }

    #[test]
    fn missing_operand_is_incomplete_not_trailing() {
        assert_eq!(
            kind_of("2+"),
            ErrorKind::IncompleteInput {
                expected: "integer or '('".into()
            }
        );
        let error = evaluate("2+").unwrap_err();
        assert_eq!(error.span(), Span::point(2));
    }

    #[test]
    fn unclosed_group_expects_close_paren() {
        match kind_of("(1+2") {
            ErrorKind::IncompleteInput { expected } => assert!(expected.contains("')'")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stray_close_paren_is_trailing_input() {
        let error = evaluate("2+3)").unwrap_err();
        assert_eq!(error.kind, ErrorKind::TrailingInput { found: ")".into() });
        assert_eq!(error.span(), Span::new(3, 4));
    }

    #[test]
    fn wrong_token_is_a_syntax_error() {
        let error = evaluate("2+*3").unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::UnexpectedToken {
                expected: "integer or '('".into(),
                found: '*'
            }
        );
        assert_eq!(error.category(), ErrorCategory::Syntax);
        assert_eq!(error.offset(), 2);
    }

    #[test]
    fn unknown_characters_are_reported_as_such() {
        assert_eq!(kind_of("2+x"), ErrorKind::UnrecognizedCharacter { found: 'x' });
        assert_eq!(kind_of("x"), ErrorKind::UnrecognizedCharacter { found: 'x' });
        assert_eq!(kind_of("4 %"), ErrorKind::UnrecognizedCharacter { found: '%' });
    }

    #[test]
    fn empty_and_blank_inputs_are_incomplete() {
        assert!(matches!(kind_of(""), ErrorKind::IncompleteInput { .. }));
        assert!(matches!(kind_of("  \t"), ErrorKind::IncompleteInput { .. }));
    }

    #[test]
    fn default_policy_rejects_space_before_operator() {
        assert_eq!(
            kind_of("2 + 3"),
            ErrorKind::TrailingInput {
                found: "+ 3".into()
            }
        );
        assert_eq!(evaluate("2+ 3").unwrap(), 5);
    }

    #[test]
    fn lenient_policy_accepts_space_everywhere() {
        let config = GrammarConfig::default().with_whitespace(WhitespacePolicy::BeforeEveryToken);
        assert_eq!(evaluate_with("2 + 3", &config).unwrap(), 5);
        assert_eq!(evaluate_with(" ( 1 + 2 ) * 3 ", &config).unwrap(), 9);
    }

    #[test]
    fn fatal_errors_keep_their_kind() {
        assert_eq!(kind_of("5/0"), ErrorKind::DivisionByZero);
        assert_eq!(kind_of("1+(4-4)*2/(3-3)"), ErrorKind::DivisionByZero);
        assert!(matches!(
            kind_of("9223372036854775807+1"),
            ErrorKind::Overflow { .. }
        ));
    }

    #[test]
    fn evaluate_named_labels_the_source() {
        let evaluator = Evaluator::new(GrammarConfig::default()).unwrap();
        let error = evaluator.evaluate_named("line 3", "1/0").unwrap_err();
        assert_eq!(error.source_info.source.name(), "line 3");
    }
}
