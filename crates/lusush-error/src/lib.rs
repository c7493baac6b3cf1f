//! Error taxonomy, parse budgets, and diagnostics for the lusush pipeline.
//!
//! [`ParseError`] is the single error vocabulary the scanner, parser, and
//! arithmetic evaluator share (spec.md §7). [`ParseBudget`]/[`BudgetTracker`]
//! bound recursion depth and recovery work so a pathological or adversarial
//! line can never hang the interactive loop. [`Diagnostic`] is the
//! `{severity, message, source-location}` shape spec.md §6 promises callers.

mod recovery;

pub use recovery::{BudgetTracker, DepthGuard, ParseBudget};

use lusush_position::SourceLocation;
use thiserror::Error;

/// Result type used throughout the scanner/parser/arithmetic crates.
pub type ParseResult<T> = Result<T, ParseError>;

/// The error taxonomy from spec.md §7. Variant names match the kinds
/// listed there; this is the only error type the core crates raise.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Malformed token: unterminated quote/here-doc, invalid UTF-8.
    #[error("lexical error at {location:?}: {message}")]
    Lex {
        message: String,
        location: SourceLocation,
    },

    /// Unexpected token, missing keyword, mismatched grouping.
    #[error("syntax error at {location:?}: {message}")]
    Syntax {
        message: String,
        location: SourceLocation,
        expected: Vec<String>,
    },

    /// Parser recursion depth exceeded.
    #[error("recursion limit exceeded at {location:?}")]
    RecursionLimit { location: SourceLocation },

    /// Allocation failure or stack overflow.
    #[error("resource exhausted: {message}")]
    Resource { message: String },

    /// Assignment to a READONLY variable.
    #[error("readonly variable: {name}")]
    ReadonlyViolation { name: String },

    /// Division by zero, negative exponent, or syntax error inside `$((...))`.
    #[error("arithmetic error: {message}")]
    Arith { message: String },

    /// Cooperative cancellation observed at a statement boundary.
    #[error("parse cancelled")]
    Cancelled,

    /// Invariant violation. Unreachable by construction; a bug if hit.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError::Syntax {
            message: message.into(),
            location,
            expected: Vec::new(),
        }
    }

    pub fn syntax_expected(
        message: impl Into<String>,
        location: SourceLocation,
        expected: Vec<String>,
    ) -> Self {
        ParseError::Syntax {
            message: message.into(),
            location,
            expected,
        }
    }

    pub fn lex(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError::Lex {
            message: message.into(),
            location,
        }
    }

    /// Render this error as the `{severity, message, source-location}`
    /// diagnostic shape spec.md §6 defines for the output surface.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (severity, location) = match self {
            ParseError::Lex { location, .. } => (Severity::Error, *location),
            ParseError::Syntax { location, .. } => (Severity::Error, *location),
            ParseError::RecursionLimit { location } => (Severity::Error, *location),
            ParseError::Resource { .. } => (Severity::Fatal, SourceLocation::start()),
            ParseError::ReadonlyViolation { .. } => (Severity::Error, SourceLocation::start()),
            ParseError::Arith { .. } => (Severity::Error, SourceLocation::start()),
            ParseError::Cancelled => (Severity::Info, SourceLocation::start()),
            ParseError::Internal { .. } => (Severity::Fatal, SourceLocation::start()),
        };
        Diagnostic {
            severity,
            message: self.to_string(),
            location,
        }
    }
}

/// Severity of a diagnostic handed to the diagnostic sink (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

/// A diagnostic emitted for the caller, independent of whether parsing
/// ultimately failed (a SYNTAX error at statement 2 of 3 still lets the
/// other two statements parse; each gets its own diagnostic).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

/// Anything that can receive diagnostics as they're produced. `ShellContext`
/// (in `lusush-shell`) owns the concrete sink; the core crates only ever see
/// this trait, per spec.md §9's "explicit shell-context record" guidance.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that simply accumulates diagnostics in order; what tests and the
/// demo binary use.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticLog {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl DiagnosticLog {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.severity, Severity::Error | Severity::Fatal))
    }
}
