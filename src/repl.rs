//! Arith REPL (Read-Eval-Print Loop)
//!
//! Evaluates one expression per line. Lines starting with `:` are commands.

use std::io::{self, BufRead, Write};

use crate::cli::output::Reporter;
use crate::engine::Evaluator;

/// REPL state that persists across evaluations
pub struct ReplState {
    evaluator: Evaluator,
    reporter: Reporter,
    line_number: usize,
}

enum ReplCommand {
    Continue,
    Quit,
}

impl ReplState {
    pub fn new(evaluator: Evaluator, reporter: Reporter) -> Self {
        Self {
            evaluator,
            reporter,
            line_number: 1,
        }
    }

    /// Evaluate one line. Returns whether it produced a value.
    pub fn eval_line(&mut self, input: &str) -> io::Result<bool> {
        let source_name = format!("<repl:{}>", self.line_number);
        self.line_number += 1;
        let result = self.evaluator.evaluate_named(&source_name, input);
        self.reporter.report(None, input, result)
    }
}

/// Main REPL entry point. Returns at end of input or on `:quit`.
pub fn run_repl(evaluator: Evaluator, reporter: Reporter) -> io::Result<()> {
    println!("Arith REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit");
    println!();

    let mut state = ReplState::new(evaluator, reporter);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("arith> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF (Ctrl+D)
            println!();
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(command) = line.trim().strip_prefix(':') {
            match handle_repl_command(command) {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => break,
            }
        }

        state.eval_line(line)?;
    }

    Ok(())
}

fn handle_repl_command(command: &str) -> ReplCommand {
    match command {
        "quit" | "q" | "exit" => ReplCommand::Quit,
        "help" | "h" => {
            print_help();
            ReplCommand::Continue
        }
        other => {
            println!("Unknown command ':{}'. Type :help for help.", other);
            ReplCommand::Continue
        }
    }
}

fn print_help() {
    println!("Enter an integer expression using + - * / and parentheses, e.g. 2+3*(4-1)");
    println!();
    println!("Commands:");
    println!("  :help   show this message");
    println!("  :quit   leave the REPL");
}
