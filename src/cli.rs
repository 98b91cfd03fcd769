//! The Arith Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{error::Error, fs, path::Path, process};

use clap::Parser;

use crate::{engine::Evaluator, repl};

pub mod args;
pub mod output;

use args::{ArithArgs, Command};
use output::Reporter;

/// The main entry point for the CLI.
pub fn run() {
    let args = ArithArgs::parse();
    args.color.install_report_hook();

    let evaluator = Evaluator::new(args.grammar_config()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(2);
    });
    let mut reporter = Reporter::new(args.format, args.color.choice());

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Eval { expressions } => handle_eval(&evaluator, &mut reporter, &expressions),
        Command::Batch { file } => handle_batch(&evaluator, &mut reporter, &file),
        Command::Repl => repl::run_repl(evaluator, reporter)
            .map(|()| 0)
            .map_err(Box::<dyn Error>::from),
    };

    match result {
        Ok(0) => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Handles the `eval` subcommand. Returns the number of failed expressions.
fn handle_eval(
    evaluator: &Evaluator,
    reporter: &mut Reporter,
    expressions: &[String],
) -> Result<usize, Box<dyn Error>> {
    let mut failed = 0;
    for expression in expressions {
        let result = evaluator.evaluate(expression);
        if !reporter.report(None, expression, result)? {
            failed += 1;
        }
    }
    Ok(failed)
}

/// Handles the `batch` subcommand. Returns the number of failed lines.
fn handle_batch(
    evaluator: &Evaluator,
    reporter: &mut Reporter,
    path: &Path,
) -> Result<usize, Box<dyn Error>> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    let mut passed = 0;
    let mut failed = 0;
    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let label = format!("line {}", index + 1);
        let name = format!("{}:{}", path.display(), index + 1);
        let result = evaluator.evaluate_named(&name, line);
        if reporter.report(Some(&label), line, result)? {
            passed += 1;
        } else {
            failed += 1;
        }
    }

    reporter.status(
        &format!("{} evaluated, {} failed", passed + failed, failed),
        failed == 0,
    )?;
    Ok(failed)
}
