//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout. In text mode errors are rendered as `miette`
//! diagnostics on stderr; in JSON mode every expression, successful or not,
//! becomes one JSON object on stdout.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::OutputFormat;
use crate::errors::{print_error, ArithError};

/// One evaluated expression as written in JSON mode.
#[derive(Debug, Serialize)]
pub struct EvaluationRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    pub expression: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    pub offset: usize,
}

impl<'a> EvaluationRecord<'a> {
    pub fn new(
        label: Option<&'a str>,
        expression: &'a str,
        result: &Result<i64, ArithError>,
    ) -> Self {
        let (value, error) = match result {
            Ok(value) => (Some(*value), None),
            Err(error) => (
                None,
                Some(ErrorRecord {
                    code: error.code().to_string(),
                    message: error.to_string(),
                    offset: error.offset(),
                }),
            ),
        };
        Self {
            label,
            expression,
            value,
            error,
        }
    }
}

/// Writes evaluation results in the selected format.
pub struct Reporter {
    format: OutputFormat,
    stdout: StandardStream,
    stderr: StandardStream,
}

impl Reporter {
    pub fn new(format: OutputFormat, color: ColorChoice) -> Self {
        Self {
            format,
            stdout: StandardStream::stdout(color),
            stderr: StandardStream::stderr(color),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Reports one result. Returns whether the evaluation succeeded.
    pub fn report(
        &mut self,
        label: Option<&str>,
        expression: &str,
        result: Result<i64, ArithError>,
    ) -> io::Result<bool> {
        let succeeded = result.is_ok();
        match self.format {
            OutputFormat::Json => {
                let record = EvaluationRecord::new(label, expression, &result);
                let line = serde_json::to_string(&record).map_err(io::Error::from)?;
                writeln!(self.stdout, "{line}")?;
            }
            OutputFormat::Text => match result {
                Ok(value) => {
                    if let Some(label) = label {
                        write_label(&mut self.stdout, label, Color::Cyan)?;
                    }
                    writeln!(self.stdout, "{value}")?;
                }
                Err(error) => {
                    self.stdout.flush()?;
                    if let Some(label) = label {
                        write_label(&mut self.stderr, label, Color::Red)?;
                        writeln!(self.stderr)?;
                    }
                    self.stderr.flush()?;
                    print_error(error);
                }
            },
        }
        self.stdout.flush()?;
        Ok(succeeded)
    }

    /// Prints a bold status line, e.g. a batch summary.
    pub fn status(&mut self, message: &str, ok: bool) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        let color = if ok { Color::Green } else { Color::Red };
        self.stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.stdout, "{message}")?;
        self.stdout.reset()?;
        writeln!(self.stdout)?;
        self.stdout.flush()
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_label(stream: &mut StandardStream, label: &str, color: Color) -> io::Result<()> {
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "{label}:")?;
    stream.reset()?;
    write!(stream, " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;

    #[test]
    fn success_record_has_value_only() {
        let result = evaluate("6*7");
        let record = EvaluationRecord::new(None, "6*7", &result);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"expression": "6*7", "value": 42}));
    }

    #[test]
    fn error_record_carries_code_and_offset() {
        let result = evaluate("1+(2");
        let record = EvaluationRecord::new(Some("line 1"), "1+(2", &result);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["label"], "line 1");
        assert_eq!(json["error"]["code"], "arith::syntax::incomplete_input");
        assert_eq!(json["error"]["offset"], 4);
        assert!(json.get("value").is_none());
    }
}
