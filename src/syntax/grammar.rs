//! Rule table and the arithmetic grammar
//!
//! ```text
//! expr  -> sum
//! sum   -> prod (addop prod)*
//! prod  -> value (mulop value)*
//! addop -> "+" | "-"
//! mulop -> "*" | "/"
//! value -> integer | "(" sum ")"
//! ```
//!
//! `value`, `prod` and `sum` refer to each other in a cycle. Rules are first
//! declared, which hands out a [`RuleId`] slot, then defined in any order, and
//! finally frozen into an immutable [`Grammar`] once every slot is bound.

use std::sync::Arc;

use crate::config::GrammarConfig;
use crate::errors::{Fault, GrammarError};
use crate::syntax::builders::{group_node, many2many, one2one, prod_node, sum_node};
use crate::syntax::combinators::ParseContext;
use crate::syntax::terminals::Terminals;
use crate::syntax::{Parser, Reply, Scanner, Trace};

/// Handle to a rule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Rule {
    name: String,
    parser: Parser,
}

/// Collects rule declarations and definitions before freezing them.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    names: Vec<String>,
    slots: Vec<Option<Parser>>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot for a rule whose body may not exist yet.
    pub fn declare(&mut self, name: impl Into<String>) -> RuleId {
        self.names.push(name.into());
        self.slots.push(None);
        RuleId(self.slots.len() - 1)
    }

    /// Binds a body to a declared slot. Each slot is bound exactly once.
    pub fn define(&mut self, id: RuleId, parser: Parser) -> Result<(), GrammarError> {
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or(GrammarError::UnknownRule { index: id.0 })?;
        if slot.is_some() {
            return Err(GrammarError::Redefined {
                name: self.names[id.0].clone(),
            });
        }
        *slot = Some(parser);
        Ok(())
    }

    /// Freezes the table. Fails if any slot is unbound or any body refers to
    /// a rule outside this builder.
    pub fn finish(self, start: RuleId, max_depth: usize) -> Result<Grammar, GrammarError> {
        if start.0 >= self.slots.len() {
            return Err(GrammarError::UnknownRule { index: start.0 });
        }
        let count = self.slots.len();
        let mut rules = Vec::with_capacity(count);
        for (name, slot) in self.names.into_iter().zip(self.slots) {
            let parser = slot.ok_or_else(|| GrammarError::Unbound { name: name.clone() })?;
            let mut references = Vec::new();
            parser.references(&mut references);
            if let Some(bad) = references.iter().find(|id| id.0 >= count) {
                return Err(GrammarError::UnknownRule { index: bad.0 });
            }
            rules.push(Rule { name, parser });
        }
        Ok(Grammar {
            rules: rules.into(),
            start,
            max_depth,
        })
    }
}

/// Result of running a grammar over one input.
#[derive(Debug)]
pub struct ParseOutcome<'a> {
    pub result: Result<Reply<'a>, Fault>,
    pub trace: Trace,
}

/// An immutable, cheaply cloneable rule graph. Safe to share across threads;
/// every parse keeps its own scanner and trace.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Arc<[Rule]>,
    start: RuleId,
    max_depth: usize,
}

impl Grammar {
    pub fn start(&self) -> RuleId {
        self.start
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn rule_name(&self, id: RuleId) -> Option<&str> {
        self.rules.get(id.0).map(|rule| rule.name.as_str())
    }

    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.rules
            .iter()
            .position(|rule| rule.name == name)
            .map(RuleId)
    }

    pub(crate) fn parser(&self, id: RuleId) -> Option<&Parser> {
        self.rules.get(id.0).map(|rule| &rule.parser)
    }

    /// Parses from the start rule. Does not require the whole input to be
    /// consumed.
    pub fn parse<'a>(&self, input: &'a str) -> ParseOutcome<'a> {
        self.parse_rule(self.start, input)
    }

    pub fn parse_rule<'a>(&self, id: RuleId, input: &'a str) -> ParseOutcome<'a> {
        let mut cx = ParseContext::new(self.max_depth);
        let result = Parser::rule(id).parse(self, Scanner::new(input), &mut cx);
        ParseOutcome {
            result,
            trace: cx.trace,
        }
    }
}

/// Builds the arithmetic grammar; the start rule is `expr`.
pub fn arithmetic_grammar(config: &GrammarConfig) -> Result<Grammar, GrammarError> {
    let t = Terminals::new(config.whitespace);
    let mut builder = GrammarBuilder::new();

    let value = builder.declare("value");
    let prod = builder.declare("prod");
    let sum = builder.declare("sum");
    let expr = builder.declare("expr");

    let sum_op = Parser::ord_choice(one2one, vec![t.add(), t.sub()]);
    let prod_op = Parser::ord_choice(one2one, vec![t.mult(), t.div()]);
    let group = Parser::and(
        group_node,
        vec![t.open_paren(), Parser::rule(sum), t.close_paren()],
    );
    let prod_tail = Parser::kleene(
        many2many,
        Parser::and(many2many, vec![prod_op, Parser::rule(value)]),
    );
    let sum_tail = Parser::kleene(
        many2many,
        Parser::and(many2many, vec![sum_op, Parser::rule(prod)]),
    );

    builder.define(value, Parser::ord_choice(one2one, vec![t.integer(), group]))?;
    builder.define(prod, Parser::and(prod_node, vec![Parser::rule(value), prod_tail]))?;
    builder.define(sum, Parser::and(sum_node, vec![Parser::rule(prod), sum_tail]))?;
    builder.define(expr, Parser::ord_choice(one2one, vec![Parser::rule(sum)]))?;

    builder.finish(expr, config.max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Node;

    fn value_of(grammar: &Grammar, input: &str) -> Option<(i64, usize)> {
        let (node, rest) = grammar.parse(input).result.ok()?.into_success()?;
        Some((node.as_int()?, rest.cursor()))
    }

    #[test]
    fn unbound_slot_is_rejected() {
        let mut builder = GrammarBuilder::new();
        let a = builder.declare("a");
        let _b = builder.declare("b");
        builder.define(a, Parser::integer()).unwrap();
        assert_eq!(
            builder.finish(a, 8).unwrap_err(),
            GrammarError::Unbound { name: "b".into() }
        );
    }

    #[test]
    fn double_definition_is_rejected() {
        let mut builder = GrammarBuilder::new();
        let a = builder.declare("a");
        builder.define(a, Parser::integer()).unwrap();
        assert_eq!(
            builder.define(a, Parser::integer()).unwrap_err(),
            GrammarError::Redefined { name: "a".into() }
        );
    }

    #[test]
    fn foreign_rule_reference_is_rejected() {
        let mut other = GrammarBuilder::new();
        other.declare("x");
        let foreign = other.declare("y");

        let mut builder = GrammarBuilder::new();
        let a = builder.declare("a");
        builder.define(a, Parser::rule(foreign)).unwrap();
        assert_eq!(
            builder.finish(a, 8).unwrap_err(),
            GrammarError::UnknownRule { index: 1 }
        );
    }

    #[test]
    fn arithmetic_rules_are_named() {
        let grammar = arithmetic_grammar(&GrammarConfig::default()).unwrap();
        assert_eq!(grammar.rule_name(grammar.start()), Some("expr"));
        for name in ["value", "prod", "sum", "expr"] {
            assert!(grammar.lookup(name).is_some(), "missing rule {name}");
        }
        assert_eq!(grammar.lookup("term"), None);
    }

    #[test]
    fn sub_rules_can_be_run_directly() {
        let grammar = arithmetic_grammar(&GrammarConfig::default()).unwrap();
        let prod = grammar.lookup("prod").unwrap();
        let (node, rest) = grammar
            .parse_rule(prod, "2*3+4")
            .result
            .unwrap()
            .into_success()
            .unwrap();
        assert_eq!(node, Node::Int(6));
        assert_eq!(rest.remaining(), "+4");
    }

    #[test]
    fn start_rule_stops_at_unconsumed_input() {
        let grammar = arithmetic_grammar(&GrammarConfig::default()).unwrap();
        assert_eq!(value_of(&grammar, "2+3*4"), Some((14, 5)));
        assert_eq!(value_of(&grammar, "2+3)"), Some((5, 3)));
        assert_eq!(value_of(&grammar, "2 + 3"), Some((2, 1)));
    }

    #[test]
    fn depth_limit_counts_rule_dispatch() {
        // expr, sum, prod, value, then three more per group
        let config = GrammarConfig::default().with_max_depth(10);
        let grammar = arithmetic_grammar(&config).unwrap();
        assert_eq!(value_of(&grammar, "((1))"), Some((1, 5)));
        assert!(grammar.parse("(((1)))").result.is_err());
    }
}
