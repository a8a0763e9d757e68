//! Public API of the compiler.
//!
//! # Example
//!
//! ```
//! use neoc_core::api::{CompileOptions, Format, compile, load_program};
//!
//! let tree = br#"{
//!     "root": "main",
//!     "packages": [{
//!         "name": "main",
//!         "path": "main",
//!         "files": [{
//!             "name": "main.go",
//!             "funcs": [{ "name": "Main", "body": [] }]
//!         }]
//!     }]
//! }"#;
//! let program = load_program(tree, Format::Json).unwrap();
//! let code = compile(&program, &CompileOptions::default()).unwrap();
//! assert_eq!(code.script.len(), 6);
//! ```

pub mod driver;
pub mod error;
pub mod options;

pub use driver::{Format, compile, load_program, save_program};
pub use error::{Diagnostic, Error, Severity};
pub use options::CompileOptions;
