//! Builtin functions lowered straight to opcodes.

use super::address::decode_address;
use super::codegen::CodeGen;
use super::error::{CompileError, ErrorKind, ResultExt};
use crate::tree::{Constant, Expr, Span};
use crate::vm::Opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    Append,
    Sha256,
    Sha1,
    Hash256,
    Hash160,
    VerifySignature,
    Equals,
    FromAddress,
}

impl Builtin {
    const ALL: [Builtin; 9] = [
        Builtin::Len,
        Builtin::Append,
        Builtin::Sha256,
        Builtin::Sha1,
        Builtin::Hash256,
        Builtin::Hash160,
        Builtin::VerifySignature,
        Builtin::Equals,
        Builtin::FromAddress,
    ];

    /// Package a builtin lives in; `None` for universe builtins.
    pub fn package(self) -> Option<&'static str> {
        match self {
            Builtin::Len | Builtin::Append => None,
            Builtin::Sha256
            | Builtin::Sha1
            | Builtin::Hash256
            | Builtin::Hash160
            | Builtin::VerifySignature => Some("crypto"),
            Builtin::Equals | Builtin::FromAddress => Some("util"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Append => "append",
            Builtin::Sha256 => "SHA256",
            Builtin::Sha1 => "SHA1",
            Builtin::Hash256 => "Hash256",
            Builtin::Hash160 => "Hash160",
            Builtin::VerifySignature => "VerifySignature",
            Builtin::Equals => "Equals",
            Builtin::FromAddress => "FromAddress",
        }
    }

    /// The builtin called as `package.name`, or as plain `name` for universe builtins.
    pub fn lookup(package: Option<&str>, name: &str) -> Option<Builtin> {
        Self::ALL
            .into_iter()
            .find(|b| b.package() == package && b.name() == name)
    }

    /// The builtin a call to `name` lowers to. Universe builtins yield to a
    /// declared function of the same name; qualified ones never do.
    pub fn for_call(package: Option<&str>, name: &str, declared: bool) -> Option<Builtin> {
        if package.is_none() && declared {
            return None;
        }
        Self::lookup(package, name)
    }

    /// Any builtin with this name, whatever its package.
    pub fn named(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn arity(self) -> Option<usize> {
        match self {
            Builtin::Append => None,
            Builtin::VerifySignature => Some(3),
            Builtin::Equals => Some(2),
            _ => Some(1),
        }
    }

    /// Single opcode for builtins that consume their arguments as-is.
    fn opcode(self) -> Option<Opcode> {
        match self {
            Builtin::Sha256 => Some(Opcode::Sha256),
            Builtin::Sha1 => Some(Opcode::Sha1),
            Builtin::Hash256 => Some(Opcode::Hash256),
            Builtin::Hash160 => Some(Opcode::Hash160),
            Builtin::VerifySignature => Some(Opcode::Verify),
            Builtin::Equals => Some(Opcode::Equal),
            _ => None,
        }
    }
}

fn disallowed(builtin: Builtin, reason: &'static str, span: Span) -> CompileError {
    CompileError::at(
        ErrorKind::DisallowedBuiltin {
            name: builtin.name().to_string(),
            reason,
        },
        span,
    )
}

impl CodeGen<'_> {
    /// Compile a builtin call. Arguments stay in source order.
    pub(super) fn compile_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
        spread: bool,
        span: Span,
    ) -> Result<(), CompileError> {
        if let Some(arity) = builtin.arity() {
            if args.len() != arity {
                return Err(disallowed(builtin, "wrong number of arguments", span));
            }
        }
        if spread && builtin != Builtin::Append {
            return Err(disallowed(builtin, "arguments cannot be spread", span));
        }

        match builtin {
            Builtin::Len => {
                let arg = &args[0];
                self.compile_expr(arg)?;
                self.emitter.emit(if arg.ty.is_string() {
                    Opcode::Size
                } else {
                    Opcode::ArraySize
                });
            }
            Builtin::Append => {
                let Some((target, elems)) = args.split_first() else {
                    return Err(disallowed(builtin, "missing slice argument", span));
                };
                let bytes = target.ty.is_byte_array();
                if spread && !bytes {
                    return Err(disallowed(
                        builtin,
                        "only byte slices can be spread into append",
                        span,
                    ));
                }
                self.compile_expr(target)?;
                for elem in elems {
                    self.compile_expr(elem)?;
                    if bytes {
                        self.emitter.emit(Opcode::Cat);
                    } else {
                        self.emitter.emit(Opcode::Swap);
                        self.emitter.emit(Opcode::Dup);
                        self.emitter.emit_int(2);
                        self.emitter.emit(Opcode::XSwap);
                        self.emitter.emit(Opcode::Append);
                    }
                }
            }
            Builtin::FromAddress => {
                let arg = &args[0];
                let literal = arg
                    .value
                    .as_ref()
                    .and_then(Constant::as_str)
                    .ok_or_else(|| disallowed(builtin, "address must be a constant string", span))?;
                let hash = decode_address(literal)
                    .map_err(|source| ErrorKind::InvalidAddress {
                        literal: literal.to_string(),
                        source,
                    })
                    .at(arg.span)?;
                self.emitter.emit_bytes(&hash).at(span)?;
            }
            _ => {
                for arg in args {
                    self.compile_expr(arg)?;
                }
                if let Some(op) = builtin.opcode() {
                    self.emitter.emit(op);
                }
            }
        }
        Ok(())
    }
}
