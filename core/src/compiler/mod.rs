//! Compiler from the typed program tree to AVM bytecode.
//!
//! ## Design
//!
//! - Two passes: code generation emits jumps against label indices, then the
//!   linker rewrites them into relative displacements
//! - Every function is registered up front so forward calls resolve
//! - Locals live in a per-call array kept on the alt stack
//! - The first error aborts compilation; no partial script is returned

mod address;
mod analysis;
mod builtins;
mod codegen;
mod emitter;
mod error;
mod labels;
mod linker;
mod scope;
mod syscalls;
mod usage;

#[cfg(test)]
mod emitter_test;

pub use address::{ADDRESS_VERSION, AddressError, decode_address};
pub use builtins::Builtin;
pub use codegen::compile_program;
pub use emitter::{Emitter, int_to_bytes};
pub use error::{Category, CompileError, ErrorKind};
pub use labels::{Label, LabelTable};
pub use linker::link;
