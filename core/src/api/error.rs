//! Public error types for the compiler API.
//!
//! Internal errors are converted to these types at the API boundary.

use core::fmt;

use crate::compiler::CompileError;
use crate::tree::Span;

/// Public error type for all compiler operations.
#[derive(Debug)]
pub enum Error {
    /// Invalid API usage (e.g. an unknown input format).
    Api(String),

    /// The program tree could not be compiled.
    ///
    /// Compilation stops at the first error, so this holds one diagnostic.
    Compilation { diagnostics: Vec<Diagnostic> },

    /// A serialized program tree could not be decoded.
    Decode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::Compilation { diagnostics } => match diagnostics.as_slice() {
                [single] => write!(f, "Compilation failed: {}", single.message),
                _ => write!(f, "Compilation failed with {} error(s)", diagnostics.len()),
            },
            Error::Decode(msg) => write!(f, "Could not decode program: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// A diagnostic message with its location in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// File declaring the function being compiled, if known.
    pub file: Option<String>,

    /// Key of the function being compiled (`pkg.Name`), if known.
    pub function: Option<String>,

    /// Byte range in the file's source. Empty when the tree has no spans.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Stable error code (e.g. "E0101") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Compilation cannot succeed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(format!("{}", err))
    }
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Error::Decode(format!("{}", err))
    }
}
