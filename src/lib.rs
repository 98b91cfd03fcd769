//! Arith evaluates integer arithmetic expressions (`+ - * /`, parentheses,
//! the usual precedence) with a grammar assembled from small combinators.
//!
//! ```
//! assert_eq!(arith::evaluate("2+3*4").unwrap(), 14);
//! assert_eq!(arith::evaluate("(2+3)*4").unwrap(), 20);
//! ```

pub use crate::config::{GrammarConfig, WhitespacePolicy};
pub use crate::engine::{evaluate, evaluate_with, Evaluator};
pub use crate::errors::{print_error, ArithError, ErrorCategory, ErrorKind, GrammarError};

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod repl;
pub mod syntax;
