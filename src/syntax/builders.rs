//! Node builders
//!
//! Semantic actions attached to the arithmetic rules. Each one receives the
//! nodes of a successful structural match and reduces them, usually to a
//! single [`Node::Int`].

use crate::errors::ErrorKind;
use crate::syntax::{Node, Terminal, TokenKind};

/// Passes the single matched node through unchanged.
pub fn one2one(nodes: Vec<Node>) -> Result<Option<Node>, ErrorKind> {
    Ok(nodes.into_iter().next())
}

/// Wraps all matched nodes into one sequence.
pub fn many2many(nodes: Vec<Node>) -> Result<Option<Node>, ErrorKind> {
    Ok(Some(Node::Seq(nodes)))
}

/// `"(" sum ")"`: drops the parentheses and surfaces the inner value.
pub fn group_node(nodes: Vec<Node>) -> Result<Option<Node>, ErrorKind> {
    match nodes.as_slice() {
        [] => Ok(None),
        [Node::Terminal(_), Node::Int(value), Node::Terminal(_)] => Ok(Some(Node::Int(*value))),
        _ => Err(shape_mismatch("group", &nodes)),
    }
}

/// `prod -> value (mulop value)*`
pub fn prod_node(nodes: Vec<Node>) -> Result<Option<Node>, ErrorKind> {
    fold_left(nodes, apply_multiplicative)
}

/// `sum -> prod (addop prod)*`
pub fn sum_node(nodes: Vec<Node>) -> Result<Option<Node>, ErrorKind> {
    fold_left(nodes, apply_additive)
}

/// Folds `[first, Seq[Seq[op, int], ...]]` left to right.
pub fn fold_left(
    nodes: Vec<Node>,
    apply: fn(i64, &Terminal, i64) -> Result<i64, ErrorKind>,
) -> Result<Option<Node>, ErrorKind> {
    let mut parts = nodes.into_iter();
    let Some(first) = parts.next() else {
        return Ok(None);
    };
    let mut acc = first
        .as_int()
        .ok_or_else(|| unexpected("fold head", "integer", &first))?;

    let tail = match parts.next() {
        None => Vec::new(),
        Some(Node::Seq(pairs)) => pairs,
        Some(other) => return Err(unexpected("fold tail", "sequence", &other)),
    };

    for pair in tail {
        match pair {
            Node::Seq(items) => match items.as_slice() {
                [Node::Terminal(op), Node::Int(operand)] => acc = apply(acc, op, *operand)?,
                _ => return Err(shape_mismatch("operator pair", &items)),
            },
            other => return Err(unexpected("operator pair", "sequence", &other)),
        }
    }

    Ok(Some(Node::Int(acc)))
}

pub fn apply_additive(acc: i64, op: &Terminal, operand: i64) -> Result<i64, ErrorKind> {
    match op.kind {
        TokenKind::Add => acc.checked_add(operand).ok_or_else(|| overflow("addition")),
        TokenKind::Sub => acc
            .checked_sub(operand)
            .ok_or_else(|| overflow("subtraction")),
        other => Err(wrong_operator(other, "sum")),
    }
}

/// Division truncates toward zero.
pub fn apply_multiplicative(acc: i64, op: &Terminal, operand: i64) -> Result<i64, ErrorKind> {
    match op.kind {
        TokenKind::Mult => acc
            .checked_mul(operand)
            .ok_or_else(|| overflow("multiplication")),
        TokenKind::Div if operand == 0 => Err(ErrorKind::DivisionByZero),
        TokenKind::Div => acc.checked_div(operand).ok_or_else(|| overflow("division")),
        other => Err(wrong_operator(other, "product")),
    }
}

fn overflow(operation: &str) -> ErrorKind {
    ErrorKind::Overflow {
        operation: operation.to_string(),
    }
}

fn wrong_operator(kind: TokenKind, level: &str) -> ErrorKind {
    ErrorKind::Internal {
        message: format!("operator {} cannot appear at {} level", kind.describe(), level),
    }
}

fn unexpected(position: &str, expected: &str, found: &Node) -> ErrorKind {
    ErrorKind::Internal {
        message: format!("{position} must be {expected}, got {}", found.shape()),
    }
}

fn shape_mismatch(position: &str, nodes: &[Node]) -> ErrorKind {
    let shapes: Vec<&str> = nodes.iter().map(Node::shape).collect();
    ErrorKind::Internal {
        message: format!("unexpected {position} shape [{}]", shapes.join(", ")),
    }
}
