//! Compiler from a typed Go-like program tree to NEO AVM bytecode.

pub mod api;
pub mod compiler;
pub mod tree;
pub mod vm;
