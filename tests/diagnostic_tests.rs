//! Rendered diagnostic output.
//!
//! Errors are rendered through miette's graphical handler without colour so
//! the assertions can match on plain text.

use arith::syntax::Span;
use arith::{evaluate, ArithError, Evaluator, GrammarConfig};
use miette::{GraphicalReportHandler, GraphicalTheme};

fn render(error: &ArithError) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .with_width(120)
        .render_report(&mut out, error)
        .unwrap();
    out
}

#[test]
fn division_by_zero_points_at_the_product() {
    let error = evaluate("1+10/(5-5)").unwrap_err();
    let output = render(&error);

    assert!(output.contains("arith::eval::division_by_zero"), "{output}");
    assert!(output.contains("division by zero"), "{output}");
    assert!(output.contains("divisor evaluates to zero"), "{output}");
    assert!(output.contains("1+10/(5-5)"), "{output}");
    assert_eq!(error.offset(), 2);
}

#[test]
fn unexpected_token_names_what_was_expected() {
    let error = evaluate("2+*3").unwrap_err();
    let output = render(&error);

    assert!(output.contains("arith::syntax::unexpected_token"), "{output}");
    assert!(
        output.contains("expected integer or '(', found '*'"),
        "{output}"
    );
    assert!(output.contains("unexpected token"), "{output}");
}

#[test]
fn unrecognized_character_carries_help() {
    let error = evaluate("3%2").unwrap_err();
    let output = render(&error);

    assert!(output.contains("arith::syntax::unrecognized_character"), "{output}");
    assert!(output.contains("'%'"), "{output}");
    assert!(output.contains("help:"), "{output}");
}

#[test]
fn trailing_input_suggests_the_whitespace_policy() {
    let error = evaluate("2 + 3").unwrap_err();
    let output = render(&error);

    assert!(output.contains("arith::syntax::trailing_input"), "{output}");
    assert!(output.contains("left over"), "{output}");
    assert!(output.contains("whitespace"), "{output}");
}

#[test]
fn source_name_appears_in_the_report() {
    let evaluator = Evaluator::new(GrammarConfig::default()).unwrap();
    let error = evaluator.evaluate_named("budget.txt:7", "4/(2-2)").unwrap_err();
    let output = render(&error);

    assert!(output.contains("budget.txt:7"), "{output}");
}

#[test]
fn incomplete_input_points_past_the_end() {
    let error = evaluate("(1+2").unwrap_err();
    let output = render(&error);

    assert!(output.contains("arith::syntax::incomplete_input"), "{output}");
    assert!(output.contains("input ends here"), "{output}");
    assert_eq!(error.offset(), 4);
    assert_eq!(error.label_span(), Span::new(3, 4));
}
