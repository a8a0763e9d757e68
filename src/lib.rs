//! neoc - compile typed Go-like programs to NEO AVM bytecode
//!
//! # Overview
//!
//! The front-end (parsing and type checking) is external. It hands over a
//! fully typed [`Program`] tree, either built in memory or serialized as JSON
//! or `postcard`. `neoc` lowers it to a linked AVM script.
//!
//! # Quick Start
//!
//! ```
//! use neoc::tree::builder::{func, int, main_program, ret};
//! use neoc::tree::Type;
//! use neoc::{CompileOptions, compile};
//!
//! let program = main_program(
//!     vec![],
//!     vec![func("Main", vec![], vec![Type::Int], vec![ret(vec![int(42)])])],
//! );
//! let code = compile(&program, &CompileOptions::default()).unwrap();
//! assert_eq!(code.functions[0].name, "main.Main");
//! println!("{}", code.disassemble().unwrap());
//! ```
//!
//! # Errors
//!
//! Compilation stops at the first error. Errors carry a stable code, the
//! function being compiled and, when the tree has spans, a source location
//! that [`render_error`] turns into an annotated report.

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from neoc_core
pub use neoc_core::api::{
    CompileOptions, Diagnostic, Error, Format, Severity, compile, load_program, save_program,
};

pub use neoc_core::compiler::{Category, CompileError, ErrorKind};
pub use neoc_core::tree::{self, Program};
pub use neoc_core::vm::{self, Code, FunctionEntry, Opcode};
