use thiserror::Error;

/// The four failure modes spec.md §4.1 names for `create`/`insert`,
/// deliberately separate from `lusush-error`'s `ParseError` — this crate is
/// compiled and used independently of the scan/parse pipeline (a line
/// editor has no parser, no symbol table, nothing to diagnose through a
/// `DiagnosticSink`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("out of memory")]
    Oom,
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("position out of range")]
    OutOfRange,
    #[error("invalid parameter")]
    InvalidParameter,
}

pub type BufferResult<T> = Result<T, BufferError>;
