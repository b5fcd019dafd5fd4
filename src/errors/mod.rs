//! Error handling for the cross-compiler
//!
//! Provides source positions, source areas, and structured error types
//! with location tracking for helpful diagnostic messages.

mod diagnostic;
mod handler;
mod report;

use std::fmt;
use thiserror::Error;

pub use diagnostic::{format_error, print_error, print_errors};
pub use handler::ReportHandler;
pub use report::{ErrorCode, LineMarker, Log, MemoryLog, Report, Severity, StdLog};

/// A row/column position in the source code, both one-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePosition {
    /// One-based line number
    pub row: u32,
    /// One-based column number, counted in characters
    pub column: u32,
}

impl SourcePosition {
    /// Sentinel for "no position known"
    pub const IGNORE: SourcePosition = SourcePosition { row: 0, column: 0 };

    /// Create a new source position
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Check if this is a valid position (rows and columns are one-based)
    pub fn is_valid(&self) -> bool {
        self.row >= 1 && self.column >= 1
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// A half-open area `[begin, end)` in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceArea {
    /// First position covered by the area
    pub begin: SourcePosition,
    /// First position past the area
    pub end: SourcePosition,
}

impl SourceArea {
    /// Sentinel for "no location known"
    pub const IGNORE: SourceArea = SourceArea {
        begin: SourcePosition::IGNORE,
        end: SourcePosition::IGNORE,
    };

    /// Create a new source area
    pub fn new(begin: SourcePosition, end: SourcePosition) -> Self {
        Self { begin, end }
    }

    /// Create an area covering `length` columns starting at `begin`
    pub fn with_length(begin: SourcePosition, length: u32) -> Self {
        Self {
            begin,
            end: SourcePosition::new(begin.row, begin.column + length),
        }
    }

    /// Merge two areas into one that covers both
    pub fn merge(self, other: Self) -> Self {
        if self.is_ignored() {
            return other;
        }
        if other.is_ignored() {
            return self;
        }
        Self {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }

    /// The position this area starts at
    pub fn pos(&self) -> SourcePosition {
        self.begin
    }

    /// Check if this is the "no location known" sentinel
    pub fn is_ignored(&self) -> bool {
        !self.begin.is_valid()
    }
}

impl fmt::Display for SourceArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.begin)
    }
}

/// The main error type for cross-compiler operations
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("syntax error: {message}")]
    Lexer { message: String, area: SourceArea },

    #[error("syntax error: {message}")]
    Parser { message: String, area: SourceArea },

    #[error("context error: {message}")]
    Analyzer { message: String, area: SourceArea },

    #[error("code generation error: {message}")]
    CodeGen {
        message: String,
        area: Option<SourceArea>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Get the source area associated with this error, if any
    pub fn area(&self) -> Option<SourceArea> {
        match self {
            CompileError::Lexer { area, .. } => Some(*area),
            CompileError::Parser { area, .. } => Some(*area),
            CompileError::Analyzer { area, .. } => Some(*area),
            CompileError::CodeGen { area, .. } => *area,
            CompileError::Io(_) => None,
        }
    }

    /// Create a lexer error
    pub fn lexer(message: impl Into<String>, area: SourceArea) -> Self {
        CompileError::Lexer {
            message: message.into(),
            area,
        }
    }

    /// Create a parser error
    pub fn parser(message: impl Into<String>, area: SourceArea) -> Self {
        CompileError::Parser {
            message: message.into(),
            area,
        }
    }

    /// Create an analyzer error
    pub fn analyzer(message: impl Into<String>, area: SourceArea) -> Self {
        CompileError::Analyzer {
            message: message.into(),
            area,
        }
    }

    /// Create a code generation error without a location
    pub fn codegen(message: impl Into<String>) -> Self {
        CompileError::CodeGen {
            message: message.into(),
            area: None,
        }
    }
}

/// Result type alias for cross-compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_validity() {
        assert!(SourcePosition::new(1, 1).is_valid());
        assert!(SourcePosition::new(10, 3).is_valid());
        assert!(!SourcePosition::IGNORE.is_valid());
        assert!(!SourcePosition::new(0, 5).is_valid());
    }

    #[test]
    fn test_area_merge() {
        let a = SourceArea::new(SourcePosition::new(1, 5), SourcePosition::new(1, 8));
        let b = SourceArea::new(SourcePosition::new(1, 10), SourcePosition::new(2, 1));
        let merged = a.merge(b);
        assert_eq!(merged.begin, SourcePosition::new(1, 5));
        assert_eq!(merged.end, SourcePosition::new(2, 1));

        assert_eq!(SourceArea::IGNORE.merge(a), a);
        assert_eq!(a.merge(SourceArea::IGNORE), a);
    }

    #[test]
    fn test_area_with_length() {
        assert!(SourceArea::IGNORE.is_ignored());
        let a = SourceArea::with_length(SourcePosition::new(3, 2), 4);
        assert!(!a.is_ignored());
        assert_eq!(a.end, SourcePosition::new(3, 6));
    }
}
