//! Entry points: decode a program tree and compile it.

use std::path::Path;

use tracing::{debug, info_span};

use super::{CompileOptions, Error};
use crate::compiler::compile_program;
use crate::tree::Program;
use crate::vm::Code;

/// Compile a typed program to a linked AVM script.
///
/// # Example
///
/// ```
/// use neoc_core::api::{CompileOptions, compile};
/// use neoc_core::tree::builder::{func, main_program};
///
/// let program = main_program(vec![], vec![func("Main", vec![], vec![], vec![])]);
/// let code = compile(&program, &CompileOptions::default()).unwrap();
/// assert_eq!(code.functions[0].name, "main.Main");
/// ```
pub fn compile(program: &Program, options: &CompileOptions) -> Result<Code, Error> {
    let _span = info_span!("compile", root = %program.root).entered();
    let code = compile_program(program, options)?;
    debug!(
        size = code.script.len(),
        functions = code.functions.len(),
        "Compiled program"
    );
    Ok(code)
}

/// Serialization format of a program tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    /// Compact binary encoding (`postcard`).
    Postcard,
}

impl Format {
    /// Guess the format from a file extension: `.json` is JSON, anything
    /// else is the binary encoding.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Postcard,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "json" => Ok(Format::Json),
            "postcard" | "bin" => Ok(Format::Postcard),
            other => Err(Error::Api(format!("unknown tree format `{}`", other))),
        }
    }
}

/// Decode a serialized program tree.
pub fn load_program(bytes: &[u8], format: Format) -> Result<Program, Error> {
    let program: Program = match format {
        Format::Json => serde_json::from_slice(bytes)?,
        Format::Postcard => postcard::from_bytes(bytes)?,
    };
    debug!(
        root = %program.root,
        packages = program.packages.len(),
        "Loaded program tree"
    );
    Ok(program)
}

/// Encode a program tree; the inverse of [`load_program`].
pub fn save_program(program: &Program, format: Format) -> Result<Vec<u8>, Error> {
    Ok(match format {
        Format::Json => serde_json::to_vec_pretty(program)?,
        Format::Postcard => postcard::to_allocvec(program)?,
    })
}
