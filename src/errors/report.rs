//! Diagnostic report values and log sinks
//!
//! A `Report` is an immutable diagnostic record that can travel through
//! `Result` to abort a pass; a `Log` receives submitted reports.

use std::fmt;

/// Severity of a diagnostic report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// An offending source line together with its caret/tilde marker.
/// Both strings always have the same character length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    pub line: String,
    pub marker: String,
}

/// A canonical diagnostic code, e.g. an HLSL error number like `X3004`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCode(String);

impl ErrorCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string; empty when absent
    pub fn get(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An immutable diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    severity: Severity,
    message: String,
    context: Option<LineMarker>,
}

impl Report {
    /// Create a report without source context
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            context: None,
        }
    }

    /// Create a report with the offending line and its marker.
    /// `line` and `marker` must have the same character length.
    pub fn with_line(
        severity: Severity,
        message: impl Into<String>,
        line: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        let line = line.into();
        let marker = marker.into();
        debug_assert_eq!(line.chars().count(), marker.chars().count());
        Self {
            severity,
            message: message.into(),
            context: Some(LineMarker { line, marker }),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending source line, without a trailing newline
    pub fn line(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.line.as_str())
    }

    /// The marker string highlighting the offending area
    pub fn marker(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.marker.as_str())
    }

    /// True if this report carries a line with a line marker
    pub fn has_line(&self) -> bool {
        self.context.as_ref().is_some_and(|c| !c.line.is_empty())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Report {}

/// A sink for submitted reports
pub trait Log {
    fn submit_report(&mut self, report: &Report);
}

/// Log sink that prints reports to stderr in the stable diagnostic format:
/// the message line, then the offending line and its marker when present.
#[derive(Debug, Default)]
pub struct StdLog;

impl Log for StdLog {
    fn submit_report(&mut self, report: &Report) {
        eprintln!("{}", report.message());
        if report.has_line() {
            eprintln!("{}", report.line().unwrap_or_default());
            eprintln!("{}", report.marker().unwrap_or_default());
        }
    }
}

/// Log sink that collects reports in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    reports: Vec<Report>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Count the collected reports of the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.reports
            .iter()
            .filter(|r| r.severity() == severity)
            .count()
    }

    /// Print all collected reports to the given sink, in submission order
    pub fn replay(&self, log: &mut dyn Log) {
        for report in &self.reports {
            log.submit_report(report);
        }
    }
}

impl Log for MemoryLog {
    fn submit_report(&mut self, report: &Report) {
        self.reports.push(report.clone());
    }
}
