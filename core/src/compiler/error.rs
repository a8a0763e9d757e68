//! Code generation errors.
//!
//! Every failure is fatal to the compilation run. The first error aborts
//! code generation and no partial script is returned.

use core::fmt;

use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::compiler::address::AddressError;
use crate::tree::Span;
use crate::vm::DecodeError;

/// What went wrong, grouped by [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Resolution
    #[error("could not find entry function `{0}`")]
    MissingEntry(String),
    #[error("could not find package `{0}`")]
    UnknownPackage(String),
    #[error("could not resolve function `{0}`")]
    UnresolvedFunction(String),
    #[error("function `{0}` is declared more than once")]
    DuplicateFunction(String),
    #[error("unknown local variable `{0}`")]
    UnknownLocal(String),
    #[error("method receivers of type `{0}` are not supported")]
    UnsupportedReceiver(String),
    #[error("type `{ty}` has no field `{field}`")]
    UnknownField { ty: String, field: String },
    #[error("nested selectors are not supported")]
    NestedSelector,
    #[error("nested index expressions are not supported")]
    NestedIndex,
    #[error("cannot assign to this expression")]
    UnsupportedTarget,

    // Type support
    #[error("no lowering for values of type `{0}`")]
    UnsupportedType(String),
    #[error("type `{0}` has no zero value")]
    NoZeroValue(String),
    #[error("operator `{op}` is not supported on `{ty}`")]
    UnsupportedOperator { op: String, ty: String },

    // Table lookup
    #[error("unknown syscall `{namespace}.{name}`")]
    UnknownSyscall { namespace: String, name: String },
    #[error("builtin `{name}` cannot be used here: {reason}")]
    DisallowedBuiltin { name: String, reason: &'static str },

    // Malformed literals
    #[error("invalid address literal {literal:?}: {source}")]
    InvalidAddress {
        literal: String,
        source: AddressError,
    },
    #[error("byte literal element must be a constant in 0..=255")]
    InvalidByte,

    // Limits
    #[error("too many labels (limit: 65536)")]
    TooManyLabels,
    #[error("jump displacement {0} does not fit in 16 bits")]
    JumpTooFar(isize),
    #[error("push data of {0} bytes is too large")]
    DataTooLarge(usize),

    // Internal consistency
    #[error("label L{0} resolved twice")]
    LabelResolvedTwice(u16),
    #[error("jump to label L{0} which was never resolved")]
    UnresolvedLabel(u16),
    #[error("jump to unknown label L{0}")]
    UnknownLabel(u16),
    #[error("`{0}` outside of a loop")]
    OutsideLoop(&'static str),
    #[error("literal without a constant value")]
    MissingConstant,
    #[error("assignment of {rhs} values to {lhs} targets")]
    AssignMismatch { lhs: usize, rhs: usize },
    #[error("malformed script: {0}")]
    Malformed(DecodeError),
}

/// Error classes, each owning a range of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Resolution,
    TypeSupport,
    TableLookup,
    MalformedLiteral,
    Limit,
    Internal,
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        use ErrorKind::*;
        match self {
            MissingEntry(_)
            | UnknownPackage(_)
            | UnresolvedFunction(_)
            | DuplicateFunction(_)
            | UnknownLocal(_)
            | UnsupportedReceiver(_)
            | UnknownField { .. }
            | NestedSelector
            | NestedIndex
            | UnsupportedTarget => Category::Resolution,
            UnsupportedType(_) | NoZeroValue(_) | UnsupportedOperator { .. } => {
                Category::TypeSupport
            }
            UnknownSyscall { .. } | DisallowedBuiltin { .. } => Category::TableLookup,
            InvalidAddress { .. } | InvalidByte => Category::MalformedLiteral,
            TooManyLabels | JumpTooFar(_) | DataTooLarge(_) => Category::Limit,
            LabelResolvedTwice(_)
            | UnresolvedLabel(_)
            | UnknownLabel(_)
            | OutsideLoop(_)
            | MissingConstant
            | AssignMismatch { .. }
            | Malformed(_) => Category::Internal,
        }
    }

    /// Stable diagnostic code, e.g. `E0101`.
    pub fn code(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            MissingEntry(_) => "E0101",
            UnknownPackage(_) => "E0102",
            UnresolvedFunction(_) => "E0103",
            DuplicateFunction(_) => "E0104",
            UnknownLocal(_) => "E0105",
            UnsupportedReceiver(_) => "E0106",
            UnknownField { .. } => "E0107",
            NestedSelector => "E0108",
            NestedIndex => "E0109",
            UnsupportedTarget => "E0110",
            UnsupportedType(_) => "E0201",
            NoZeroValue(_) => "E0202",
            UnsupportedOperator { .. } => "E0203",
            UnknownSyscall { .. } => "E0301",
            DisallowedBuiltin { .. } => "E0302",
            InvalidAddress { .. } => "E0401",
            InvalidByte => "E0402",
            TooManyLabels => "E0501",
            JumpTooFar(_) => "E0502",
            DataTooLarge(_) => "E0503",
            LabelResolvedTwice(_) => "E0901",
            UnresolvedLabel(_) => "E0902",
            UnknownLabel(_) => "E0903",
            OutsideLoop(_) => "E0904",
            MissingConstant => "E0905",
            AssignMismatch { .. } => "E0906",
            Malformed(_) => "E0907",
        }
    }

    fn help(&self) -> Option<String> {
        use ErrorKind::*;
        match self {
            MissingEntry(name) => Some(format!("declare `func {}()` in the root package", name)),
            NestedSelector | NestedIndex => {
                Some(String::from("assign the inner value to a local variable first"))
            }
            UnsupportedReceiver(_) => Some(String::from("declare the method on a named struct type")),
            _ if self.category() == Category::Internal => Some(String::from(
                "this is a compiler bug or a malformed program tree",
            )),
            _ => None,
        }
    }
}

/// An [`ErrorKind`] plus where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub span: Span,
    /// Key of the function being compiled (`pkg.Name`).
    pub function: Option<String>,
    /// Name of the file declaring that function.
    pub file: Option<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            function: None,
            file: None,
        }
    }

    pub fn at(kind: ErrorKind, span: Span) -> Self {
        Self {
            span,
            ..Self::new(kind)
        }
    }

    /// Attach the enclosing function, keeping any location already set.
    pub fn in_function(mut self, function: &str, file: &str) -> Self {
        self.function.get_or_insert_with(|| function.to_string());
        self.file.get_or_insert_with(|| file.to_string());
        self
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            file: self.file.clone(),
            function: self.function.clone(),
            span: self.span,
            help: self.kind.help(),
            code: Some(String::from(self.kind.code())),
        }
    }
}

impl From<ErrorKind> for CompileError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Attach a source location to a bare [`ErrorKind`] result.
pub(crate) trait ResultExt<T> {
    fn at(self, span: Span) -> Result<T, CompileError>;
}

impl<T> ResultExt<T> for Result<T, ErrorKind> {
    fn at(self, span: Span) -> Result<T, CompileError> {
        self.map_err(|kind| CompileError::at(kind, span))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{} (in {})", self.kind, function),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl core::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_category() {
        let cases = [
            ErrorKind::MissingEntry("Main".into()),
            ErrorKind::NoZeroValue("map[int]int".into()),
            ErrorKind::UnknownSyscall {
                namespace: "storage".into(),
                name: "Nope".into(),
            },
            ErrorKind::InvalidByte,
            ErrorKind::JumpTooFar(40_000),
            ErrorKind::UnresolvedLabel(3),
        ];
        let prefixes: Vec<&str> = cases.iter().map(|k| &k.code()[..3]).collect();
        assert_eq!(prefixes, ["E01", "E02", "E03", "E04", "E05", "E09"]);
    }

    #[test]
    fn test_diagnostic_carries_location() {
        let err = CompileError::at(ErrorKind::UnknownLocal("x".into()), Span::new(4, 5))
            .in_function("main.Main", "main.go")
            .in_function("main.Other", "other.go");
        let diag = err.to_diagnostic();
        assert_eq!(diag.message, "unknown local variable `x`");
        assert_eq!(diag.code.as_deref(), Some("E0105"));
        assert_eq!(diag.function.as_deref(), Some("main.Main"));
        assert_eq!(diag.file.as_deref(), Some("main.go"));
        assert_eq!(diag.span, Span::new(4, 5));
        assert_eq!(err.to_string(), "unknown local variable `x` (in main.Main)");
    }
}
