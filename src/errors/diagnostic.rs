//! Pretty error reporting using ariadne
//!
//! Renders fatal compile errors with source context for the CLI driver.
//! Pass-internal diagnostics go through `ReportHandler` instead.

use crate::errors::CompileError;
use crate::source::SourceCode;
use ariadne::{Color, Label, Report, ReportKind, Source};

fn error_parts(error: &CompileError) -> (String, Option<crate::errors::SourceArea>, &'static str) {
    match error {
        CompileError::Lexer { message, area } => (message.clone(), Some(*area), "Lexer error"),
        CompileError::Parser { message, area } => (message.clone(), Some(*area), "Parser error"),
        CompileError::Analyzer { message, area } => {
            (message.clone(), Some(*area), "Semantic error")
        }
        CompileError::CodeGen { message, area } => {
            (message.clone(), *area, "Code generation error")
        }
        CompileError::Io(e) => (e.to_string(), None, "IO error"),
    }
}

fn byte_range(source: &SourceCode, area: crate::errors::SourceArea) -> std::ops::Range<usize> {
    let start = source.byte_offset(area.begin).unwrap_or(0);
    let end = source
        .byte_offset(area.end)
        .unwrap_or(start + 1)
        .max(start + 1);
    start..end
}

/// Print an error with source context
pub fn print_error(source: &SourceCode, error: &CompileError) {
    let (message, area, kind) = error_parts(error);

    if let CompileError::Io(e) = error {
        eprintln!("IO error: {}", e);
        return;
    }

    let span_range = area
        .filter(|a| !a.is_ignored())
        .map(|a| byte_range(source, a))
        .unwrap_or(0..0);

    let header = if source.filename().is_empty() {
        kind.to_string()
    } else {
        format!("{} in {}", kind, source.filename())
    };

    let mut report =
        Report::build(ReportKind::Error, (), span_range.start).with_message(header);

    if !span_range.is_empty() {
        report = report.with_label(
            Label::new(span_range)
                .with_message(&message)
                .with_color(Color::Red),
        );
    }

    report
        .finish()
        .print(Source::from(source.text()))
        .expect("failed to print error report");
}

/// Print multiple errors
pub fn print_errors(source: &SourceCode, errors: &[CompileError]) {
    for error in errors {
        print_error(source, error);
    }
}

/// Format an error as a string (for testing)
pub fn format_error(source: &SourceCode, error: &CompileError) -> String {
    let (message, area, kind) = error_parts(error);

    if let CompileError::Io(e) = error {
        return format!("IO error: {}", e);
    }

    let mut output = Vec::new();
    let span_range = area
        .filter(|a| !a.is_ignored())
        .map(|a| byte_range(source, a))
        .unwrap_or(0..0);

    let header = if source.filename().is_empty() {
        kind.to_string()
    } else {
        format!("{} in {}", kind, source.filename())
    };

    let mut report =
        Report::build(ReportKind::Error, (), span_range.start).with_message(header);

    if !span_range.is_empty() {
        report = report.with_label(
            Label::new(span_range)
                .with_message(&message)
                .with_color(Color::Red),
        );
    }

    report
        .finish()
        .write(Source::from(source.text()), &mut output)
        .expect("failed to write error report");

    String::from_utf8(output).expect("error report should be valid UTF-8")
}
