//! Report construction and dispatch
//!
//! The `ReportHandler` formats diagnostics from a message and a source
//! area, routes them to a log sink, and tracks whether any errors were
//! submitted during a pass.

use super::report::{ErrorCode, Log, Report, Severity};
use super::SourceArea;
use crate::source::SourceCode;

/// Formats and dispatches reports for one compiler pass
pub struct ReportHandler<'a> {
    /// Category prefix, e.g. "syntax error" or "context error"
    category: String,
    log: &'a mut dyn Log,
    has_errors: bool,
}

impl<'a> ReportHandler<'a> {
    pub fn new(category: impl Into<String>, log: &'a mut dyn Log) -> Self {
        Self {
            category: category.into(),
            log,
            has_errors: false,
        }
    }

    /// True if any error has been submitted to this handler
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Submit an error report and continue the pass
    pub fn error(&mut self, msg: &str, source: Option<&SourceCode>, area: SourceArea) {
        self.error_with_code(msg, source, area, ErrorCode::default());
    }

    /// Submit an error report with a canonical diagnostic code
    pub fn error_with_code(
        &mut self,
        msg: &str,
        source: Option<&SourceCode>,
        area: SourceArea,
        code: ErrorCode,
    ) {
        self.has_errors = true;
        let report = self.make_report(Severity::Error, msg, source, area, &code);
        self.log.submit_report(&report);
    }

    /// Record an error and hand the report back to abort the pass.
    /// The report is not submitted to the log; the pass boundary that
    /// catches it is responsible for logging.
    #[must_use = "the returned report aborts the pass via Err"]
    pub fn error_break(&mut self, msg: &str, source: Option<&SourceCode>, area: SourceArea) -> Report {
        self.error_break_with_code(msg, source, area, ErrorCode::default())
    }

    /// `error_break` with a canonical diagnostic code
    #[must_use = "the returned report aborts the pass via Err"]
    pub fn error_break_with_code(
        &mut self,
        msg: &str,
        source: Option<&SourceCode>,
        area: SourceArea,
        code: ErrorCode,
    ) -> Report {
        self.has_errors = true;
        self.make_report(Severity::Error, msg, source, area, &code)
    }

    /// Submit a warning report and continue the pass
    pub fn warning(&mut self, msg: &str, source: Option<&SourceCode>, area: SourceArea) {
        self.warning_with_code(msg, source, area, ErrorCode::default());
    }

    /// Submit a warning report with a canonical diagnostic code
    pub fn warning_with_code(
        &mut self,
        msg: &str,
        source: Option<&SourceCode>,
        area: SourceArea,
        code: ErrorCode,
    ) {
        let report = self.make_report(Severity::Warning, msg, source, area, &code);
        self.log.submit_report(&report);
    }

    /// Construct a warning report for pass abortion, like `error_break`
    #[must_use = "the returned report aborts the pass via Err"]
    pub fn warning_break(
        &mut self,
        msg: &str,
        source: Option<&SourceCode>,
        area: SourceArea,
    ) -> Report {
        self.make_report(Severity::Warning, msg, source, area, &ErrorCode::default())
    }

    /// Submit an already-constructed report, e.g. one caught at a
    /// statement or pass boundary after a break
    pub fn submit(&mut self, report: &Report) {
        self.log.submit_report(report);
    }

    /// Submit an advisory info report
    pub fn info(&mut self, msg: &str, source: Option<&SourceCode>, area: SourceArea) {
        let report = self.make_report(Severity::Info, msg, source, area, &ErrorCode::default());
        self.log.submit_report(&report);
    }

    /// Build a report: prefix the message with the category (and error
    /// code when present), and attach the offending line with a marker
    /// when the source and a concrete area are available.
    fn make_report(
        &self,
        severity: Severity,
        msg: &str,
        source: Option<&SourceCode>,
        area: SourceArea,
        code: &ErrorCode,
    ) -> Report {
        let message = if code.is_empty() {
            format!("{}: {}", self.category, msg)
        } else {
            format!("{}: ({}) {}", self.category, code.get(), msg)
        };

        if let Some(source) = source {
            if !area.is_ignored() {
                if let Some(line) = source.line(area.begin.row) {
                    let marker = Self::make_marker(line, area);
                    return Report::with_line(severity, message, line, marker);
                }
            }
        }

        Report::new(severity, message)
    }

    /// Build the caret/tilde marker for `area` under `line`. The marker
    /// has the same character length as the line; tabs left of the area
    /// are kept so terminal columns align.
    fn make_marker(line: &str, area: SourceArea) -> String {
        let begin = area.begin.column;
        let end = if area.end.row == area.begin.row && area.end.column > begin {
            area.end.column
        } else {
            begin + 1
        };

        let mut marker = String::new();
        for (i, ch) in line.chars().enumerate() {
            let column = i as u32 + 1;
            if column < begin {
                marker.push(if ch == '\t' { '\t' } else { ' ' });
            } else if column == begin {
                marker.push('^');
            } else if column < end {
                marker.push('~');
            } else {
                marker.push(' ');
            }
        }
        marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{MemoryLog, SourcePosition};

    fn area(row: u32, begin: u32, end: u32) -> SourceArea {
        SourceArea::new(SourcePosition::new(row, begin), SourcePosition::new(row, end))
    }

    #[test]
    fn test_marker_layout() {
        let source = SourceCode::new("test.hlsl", "int main() { foo(); }\n");
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("context error", &mut log);
        handler.error("undefined identifier 'foo'", Some(&source), area(1, 14, 17));

        let report = &log.reports()[0];
        assert_eq!(
            report.message(),
            "context error: undefined identifier 'foo'"
        );
        assert_eq!(report.line(), Some("int main() { foo(); }"));
        assert_eq!(report.marker(), Some("             ^~~     "));
        assert_eq!(
            report.line().unwrap().chars().count(),
            report.marker().unwrap().chars().count()
        );
    }

    #[test]
    fn test_marker_preserves_tabs() {
        let source = SourceCode::new("test.hlsl", "\t\tfoo();\n");
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("context error", &mut log);
        handler.error("undefined identifier 'foo'", Some(&source), area(1, 3, 6));

        let report = &log.reports()[0];
        assert_eq!(report.marker(), Some("\t\t^~~   "));
    }

    #[test]
    fn test_error_code_prefix() {
        let source = SourceCode::new("test.hlsl", "x;\n");
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("syntax error", &mut log);
        handler.error_with_code(
            "unexpected token",
            Some(&source),
            area(1, 1, 2),
            ErrorCode::new("X3000"),
        );
        assert_eq!(
            log.reports()[0].message(),
            "syntax error: (X3000) unexpected token"
        );
    }

    #[test]
    fn test_has_errors_is_monotone() {
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("context error", &mut log);
        assert!(!handler.has_errors());

        handler.warning("suspicious cast", None, SourceArea::IGNORE);
        assert!(!handler.has_errors());

        handler.error("bad thing", None, SourceArea::IGNORE);
        assert!(handler.has_errors());

        handler.warning("another warning", None, SourceArea::IGNORE);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_break_does_not_log() {
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("context error", &mut log);
        let report = handler.error_break("fatal", None, SourceArea::IGNORE);
        assert!(handler.has_errors());
        assert_eq!(report.message(), "context error: fatal");
        assert!(log.reports().is_empty());
    }

    #[test]
    fn test_ignored_area_has_no_line() {
        let source = SourceCode::new("test.hlsl", "x;\n");
        let mut log = MemoryLog::new();
        let mut handler = ReportHandler::new("context error", &mut log);
        handler.error("no location", Some(&source), SourceArea::IGNORE);
        assert!(!log.reports()[0].has_line());
    }
}
