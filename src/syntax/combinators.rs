//! Grammar combinators
//!
//! A [`Parser`] is a plain data tree: terminals at the leaves, ordered choice,
//! sequence and repetition above them, and [`Parser::Rule`] references that
//! dispatch through the rule table of a [`Grammar`]. Because rules are looked
//! up by id at parse time, rule bodies can refer to each other in cycles.
//!
//! Parsing returns `Result<Reply, Fault>`:
//! - `Ok(Reply::Failure)` is an ordinary failed match. The caller keeps its
//!   own scanner, so nothing consumed by the failed branch survives.
//! - `Err(Fault)` is fatal (division by zero, overflow, nesting limit) and
//!   aborts the parse without trying further alternatives.

use regex::Regex;

use crate::errors::{ErrorKind, Fault};
use crate::syntax::grammar::{Grammar, RuleId};
use crate::syntax::{Node, Scanner, Span, TokenKind};

/// Builder callback run on a successful structural match. `Ok(None)` turns
/// the match into a failure; `Err` aborts the parse.
pub type Nodify = fn(Vec<Node>) -> Result<Option<Node>, ErrorKind>;

/// Outcome of one parser application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<'a> {
    Success(Node, Scanner<'a>),
    Failure,
}

impl<'a> Reply<'a> {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(..))
    }

    pub fn into_success(self) -> Option<(Node, Scanner<'a>)> {
        match self {
            Reply::Success(node, scanner) => Some((node, scanner)),
            Reply::Failure => None,
        }
    }
}

/// Furthest position at which a terminal failed to match, with every token
/// kind that was tried there. Positions are taken before any whitespace the
/// terminal would skip. Only used to explain failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    furthest: Option<usize>,
    expected: Vec<TokenKind>,
}

impl Trace {
    pub fn record(&mut self, at: usize, kind: TokenKind) {
        match self.furthest {
            Some(furthest) if at < furthest => {}
            Some(furthest) if at == furthest => {
                if !self.expected.contains(&kind) {
                    self.expected.push(kind);
                }
            }
            _ => {
                self.furthest = Some(at);
                self.expected.clear();
                self.expected.push(kind);
            }
        }
    }

    pub fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    pub fn expected(&self) -> &[TokenKind] {
        &self.expected
    }
}

/// Mutable state of a single parse invocation.
#[derive(Debug)]
pub(crate) struct ParseContext {
    pub(crate) trace: Trace,
    depth: usize,
    max_depth: usize,
}

impl ParseContext {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            trace: Trace::default(),
            depth: 0,
            max_depth,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Parser {
    /// A literal token matched by an anchored pattern.
    Token {
        kind: TokenKind,
        pattern: Regex,
        skip_whitespace: bool,
    },
    /// A maximal run of ASCII digits.
    Integer { skip_whitespace: bool },
    /// First successful alternative wins; its node goes through `nodify`.
    OrdChoice {
        nodify: Nodify,
        alternatives: Vec<Parser>,
    },
    /// Every item in order; the collected nodes go through `nodify`.
    And { nodify: Nodify, items: Vec<Parser> },
    /// Zero or more `item`s, optionally separated. Never fails.
    Kleene {
        nodify: Nodify,
        item: Box<Parser>,
        separator: Option<Box<Parser>>,
    },
    /// Dispatch to a rule slot of the grammar.
    Rule(RuleId),
}

impl Parser {
    pub fn token(kind: TokenKind, pattern: &Regex) -> Self {
        Parser::Token {
            kind,
            pattern: pattern.clone(),
            skip_whitespace: false,
        }
    }

    pub fn integer() -> Self {
        Parser::Integer {
            skip_whitespace: false,
        }
    }

    pub fn ord_choice(nodify: Nodify, alternatives: Vec<Parser>) -> Self {
        Parser::OrdChoice {
            nodify,
            alternatives,
        }
    }

    pub fn and(nodify: Nodify, items: Vec<Parser>) -> Self {
        Parser::And { nodify, items }
    }

    pub fn kleene(nodify: Nodify, item: Parser) -> Self {
        Parser::Kleene {
            nodify,
            item: Box::new(item),
            separator: None,
        }
    }

    pub fn kleene_separated(nodify: Nodify, item: Parser, separator: Parser) -> Self {
        Parser::Kleene {
            nodify,
            item: Box::new(item),
            separator: Some(Box::new(separator)),
        }
    }

    pub fn rule(id: RuleId) -> Self {
        Parser::Rule(id)
    }

    /// Makes a terminal skip leading spaces, tabs and newlines. Non-terminals
    /// are returned unchanged.
    pub fn skipping_whitespace(self) -> Self {
        match self {
            Parser::Token { kind, pattern, .. } => Parser::Token {
                kind,
                pattern,
                skip_whitespace: true,
            },
            Parser::Integer { .. } => Parser::Integer {
                skip_whitespace: true,
            },
            other => other,
        }
    }

    /// Collects every rule id this parser refers to.
    pub(crate) fn references(&self, out: &mut Vec<RuleId>) {
        match self {
            Parser::Token { .. } | Parser::Integer { .. } => {}
            Parser::OrdChoice { alternatives, .. } => {
                alternatives.iter().for_each(|p| p.references(out))
            }
            Parser::And { items, .. } => items.iter().for_each(|p| p.references(out)),
            Parser::Kleene {
                item, separator, ..
            } => {
                item.references(out);
                if let Some(separator) = separator {
                    separator.references(out);
                }
            }
            Parser::Rule(id) => out.push(*id),
        }
    }

    /// Applies this parser at `scanner`. Variants are parsed by separate
    /// functions to keep each recursion frame small.
    pub(crate) fn parse<'a>(
        &self,
        grammar: &Grammar,
        scanner: Scanner<'a>,
        cx: &mut ParseContext,
    ) -> Result<Reply<'a>, Fault> {
        match self {
            Parser::Token {
                kind,
                pattern,
                skip_whitespace,
            } => parse_token(*kind, pattern, *skip_whitespace, scanner, cx),
            Parser::Integer { skip_whitespace } => parse_integer(*skip_whitespace, scanner, cx),
            Parser::OrdChoice {
                nodify,
                alternatives,
            } => parse_ord_choice(*nodify, alternatives, grammar, scanner, cx),
            Parser::And { nodify, items } => parse_and(*nodify, items, grammar, scanner, cx),
            Parser::Kleene {
                nodify,
                item,
                separator,
            } => parse_kleene(*nodify, item, separator.as_deref(), grammar, scanner, cx),
            Parser::Rule(id) => parse_rule(*id, grammar, scanner, cx),
        }
    }
}

fn parse_token<'a>(
    kind: TokenKind,
    pattern: &Regex,
    skip_whitespace: bool,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    let start = leading(scanner, skip_whitespace);
    match start.match_pattern(pattern, kind) {
        Some((terminal, next)) => Ok(Reply::Success(Node::Terminal(terminal), next)),
        None => {
            cx.trace.record(scanner.cursor(), kind);
            Ok(Reply::Failure)
        }
    }
}

fn parse_integer<'a>(
    skip_whitespace: bool,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    let start = leading(scanner, skip_whitespace);
    match start.match_integer()? {
        Some((value, next)) => Ok(Reply::Success(Node::Int(value), next)),
        None => {
            cx.trace.record(scanner.cursor(), TokenKind::Integer);
            Ok(Reply::Failure)
        }
    }
}

fn parse_ord_choice<'a>(
    nodify: Nodify,
    alternatives: &[Parser],
    grammar: &Grammar,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    for alternative in alternatives {
        if let Reply::Success(node, next) = alternative.parse(grammar, scanner, cx)? {
            return build(nodify, vec![node], scanner, next);
        }
    }
    Ok(Reply::Failure)
}

fn parse_and<'a>(
    nodify: Nodify,
    items: &[Parser],
    grammar: &Grammar,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    let mut nodes = Vec::with_capacity(items.len());
    let mut cursor = scanner;
    for item in items {
        match item.parse(grammar, cursor, cx)? {
            Reply::Success(node, next) => {
                nodes.push(node);
                cursor = next;
            }
            Reply::Failure => return Ok(Reply::Failure),
        }
    }
    build(nodify, nodes, scanner, cursor)
}

fn parse_kleene<'a>(
    nodify: Nodify,
    item: &Parser,
    separator: Option<&Parser>,
    grammar: &Grammar,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    let mut nodes = Vec::new();
    let mut cursor = scanner;
    loop {
        let attempt = match separator {
            Some(separator) if !nodes.is_empty() => match separator.parse(grammar, cursor, cx)? {
                Reply::Success(_, next) => next,
                Reply::Failure => break,
            },
            _ => cursor,
        };
        match item.parse(grammar, attempt, cx)? {
            // an iteration that consumed nothing would repeat forever
            Reply::Success(node, next) if next.cursor() > cursor.cursor() => {
                nodes.push(node);
                cursor = next;
            }
            _ => break,
        }
    }
    build(nodify, nodes, scanner, cursor)
}

fn parse_rule<'a>(
    id: RuleId,
    grammar: &Grammar,
    scanner: Scanner<'a>,
    cx: &mut ParseContext,
) -> Result<Reply<'a>, Fault> {
    if cx.depth >= cx.max_depth {
        return Err(Fault::new(
            ErrorKind::NestingTooDeep {
                limit: cx.max_depth,
            },
            Span::point(scanner.cursor()),
        ));
    }
    let parser = grammar.parser(id).ok_or_else(|| {
        Fault::new(
            ErrorKind::Internal {
                message: format!("rule id {} is not bound", id.index()),
            },
            Span::point(scanner.cursor()),
        )
    })?;
    cx.depth += 1;
    let reply = parser.parse(grammar, scanner, cx);
    cx.depth -= 1;
    reply
}

fn leading(scanner: Scanner<'_>, skip_whitespace: bool) -> Scanner<'_> {
    if skip_whitespace {
        scanner.skip_whitespace().1
    } else {
        scanner
    }
}

/// Runs the builder over a structural match spanning `start..end`.
fn build<'a>(
    nodify: Nodify,
    nodes: Vec<Node>,
    start: Scanner<'a>,
    end: Scanner<'a>,
) -> Result<Reply<'a>, Fault> {
    let built = nodify(nodes)
        .map_err(|kind| Fault::new(kind, Span::new(start.cursor(), end.cursor())))?;
    Ok(match built {
        Some(node) => Reply::Success(node, end),
        None => Reply::Failure,
    })
}
