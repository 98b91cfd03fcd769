//! Defines the command-line arguments and subcommands for the Arith CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use termcolor::ColorChoice;

use crate::config::{GrammarConfig, WhitespacePolicy, DEFAULT_MAX_DEPTH};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "arith",
    version,
    about = "Evaluate integer arithmetic expressions."
)]
pub struct ArithArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Skip whitespace before every token, not only before integers.
    #[arg(long, global = true)]
    pub lenient_whitespace: bool,

    /// Maximum depth of nested rule dispatch.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Output format for results and errors.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colour text output.
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate each expression and print one result per line.
    Eval {
        /// The expressions to evaluate.
        #[arg(required = true)]
        expressions: Vec<String>,
    },
    /// Evaluate every non-blank line of a file. Lines starting with '#' are skipped.
    Batch {
        /// The path to the file of expressions.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Start an interactive session.
    Repl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }

    /// Makes miette diagnostics follow the same colour choice as the rest of
    /// the output. `Auto` keeps miette's own terminal detection.
    pub fn install_report_hook(self) {
        let color = match self {
            ColorMode::Auto => return,
            ColorMode::Always => true,
            ColorMode::Never => false,
        };
        // Fails only if a hook is already installed.
        let _ = miette::set_hook(Box::new(move |_| {
            Box::new(miette::MietteHandlerOpts::new().color(color).build())
        }));
    }
}

impl ArithArgs {
    pub fn grammar_config(&self) -> GrammarConfig {
        let whitespace = if self.lenient_whitespace {
            WhitespacePolicy::BeforeEveryToken
        } else {
            WhitespacePolicy::BeforeIntegers
        };
        GrammarConfig::default()
            .with_whitespace(whitespace)
            .with_max_depth(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_grammar_config() {
        let args = ArithArgs::parse_from([
            "arith",
            "--lenient-whitespace",
            "--max-depth",
            "40",
            "eval",
            "1+1",
        ]);
        let config = args.grammar_config();
        assert_eq!(config.whitespace, WhitespacePolicy::BeforeEveryToken);
        assert_eq!(config.max_depth, 40);
    }

    #[test]
    fn defaults_are_strict_text_output() {
        let args = ArithArgs::parse_from(["arith", "eval", "2*(3+4)", "8/2"]);
        assert_eq!(args.grammar_config(), GrammarConfig::default());
        assert_eq!(args.format, OutputFormat::Text);
        match args.command {
            Command::Eval { expressions } => assert_eq!(expressions, ["2*(3+4)", "8/2"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_may_follow_the_subcommand() {
        let args = ArithArgs::parse_from(["arith", "batch", "exprs.txt", "--format", "json"]);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
