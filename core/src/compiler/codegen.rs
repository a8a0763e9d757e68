//! Tree-walking code generator.
//!
//! Every call frame keeps its locals in one array on the alt stack:
//!
//! ```text
//! entry:   PUSH <frame size>, NEWARRAY, TOALTSTACK
//! load:    DUPFROMALTSTACK, PUSH <slot>, PICKITEM
//! store:   DUPFROMALTSTACK, PUSH <slot>, PUSH2, ROLL, SETITEM
//! return:  FROMALTSTACK, DROP, RET
//! ```
//!
//! Package-level variables are captured per frame: at entry every global
//! initializer of the function's package is evaluated into the frame's own
//! slots, so frames never share mutable state.

use tracing::debug;

use super::analysis::{count_locals, terminates};
use super::builtins::Builtin;
use super::emitter::Emitter;
use super::error::{CompileError, ErrorKind, ResultExt};
use super::labels::{Label, LabelTable};
use super::linker::link;
use super::scope::{DeclRef, FuncInfo, FuncScope, FuncTable, callee_key, collect_decls};
use super::syscalls;
use super::usage::FuncUsage;
use crate::api::CompileOptions;
use crate::tree::{
    AssignOp, BinaryOp, Callee, Constant, Expr, ExprKind, FieldInit, Program, Span, Stmt,
    StructType, Type, UnaryOp, VarSpec,
};
use crate::vm::{Code, FunctionEntry, Opcode};

type Result<T, E = CompileError> = core::result::Result<T, E>;

/// Compile `program` to a linked script.
///
/// The entry function is emitted first, then every other reachable function
/// in package path, file and declaration order. Identical input always
/// yields identical bytes.
pub fn compile_program(program: &Program, options: &CompileOptions) -> Result<Code> {
    let root = program
        .package(&program.root)
        .ok_or_else(|| ErrorKind::UnknownPackage(program.root.clone()))?;
    let decls = collect_decls(program)?;

    let entry_key = format!("{}.{}", root.name, options.entry_point);
    let entry = decls
        .iter()
        .find(|d| d.key == entry_key && d.package.path == root.path)
        .ok_or_else(|| ErrorKind::MissingEntry(options.entry_point.clone()))?;

    let mut codegen = CodeGen::new();
    for decl in &decls {
        let label = codegen.labels.new_label()?;
        let package = &decl.package.name;
        let info = FuncInfo {
            label,
            external: syscalls::is_namespace(package)
                || (decl.decl.receiver.is_none()
                    && Builtin::lookup(Some(package), &decl.decl.name).is_some()),
        };
        codegen
            .funcs
            .declare(decl.key.clone(), info)
            .map_err(|kind| {
                CompileError::at(kind, decl.decl.span).in_function(&decl.key, &decl.file.name)
            })?;
    }

    let usage = if options.prune_unused {
        FuncUsage::analyze(&decls, &entry_key)
    } else {
        FuncUsage::all(&decls)
    };

    codegen.compile_func(entry)?;
    for decl in &decls {
        if decl.key == entry_key || codegen.is_external(&decl.key) {
            continue;
        }
        if !usage.is_used(&decl.key) {
            debug!(function = %decl.key, "Pruned unused function");
            continue;
        }
        codegen.compile_func(decl)?;
    }

    codegen.finish()
}

#[derive(Debug, Clone, Copy)]
struct LoopLabels {
    break_to: Label,
    continue_to: Label,
}

pub struct CodeGen<'p> {
    pub(super) emitter: Emitter,
    pub(super) labels: LabelTable,
    pub(super) funcs: FuncTable,
    /// Name of the package the current function belongs to.
    package: &'p str,
    scope: FuncScope,
    loops: Vec<LoopLabels>,
    functions: Vec<FunctionEntry>,
}

impl<'p> CodeGen<'p> {
    fn new() -> Self {
        Self {
            emitter: Emitter::new(),
            labels: LabelTable::new(),
            funcs: FuncTable::new(),
            package: "",
            scope: FuncScope::new(),
            loops: Vec::new(),
            functions: Vec::new(),
        }
    }

    fn finish(self) -> Result<Code> {
        let mut script = self.emitter.into_bytes();
        link(&mut script, &self.labels)?;
        debug!(
            size = script.len(),
            functions = self.functions.len(),
            labels = self.labels.len(),
            "Linked script"
        );
        Ok(Code {
            script,
            functions: self.functions,
        })
    }

    fn is_external(&self, key: &str) -> bool {
        self.funcs.get(key).is_some_and(|f| f.external)
    }

    // === Functions ===

    fn compile_func(&mut self, decl: &DeclRef<'p>) -> Result<()> {
        self.compile_func_body(decl)
            .map_err(|e| e.in_function(&decl.key, &decl.file.name))
    }

    fn compile_func_body(&mut self, decl: &DeclRef<'p>) -> Result<()> {
        let info = self
            .funcs
            .get(&decl.key)
            .cloned()
            .ok_or_else(|| ErrorKind::UnresolvedFunction(decl.key.clone()))?;

        let offset = self.emitter.len();
        self.labels.set(info.label, offset)?;

        let frame_size = count_locals(decl.decl) + decl.package.global_count();
        debug!(function = %decl.key, offset, frame_size, "Compiling function");
        self.functions.push(FunctionEntry {
            name: decl.key.clone(),
            offset,
            frame_size,
        });

        self.package = &decl.package.name;
        self.scope = FuncScope::new();
        self.loops.clear();

        self.emitter.emit_int(frame_size as i128);
        self.emitter.emit(Opcode::NewArray);
        self.emitter.emit(Opcode::ToAltStack);

        // Callers leave the receiver, then the first parameter, on top.
        let params: Vec<&str> = decl
            .decl
            .receiver
            .iter()
            .chain(&decl.decl.params)
            .map(|p| p.name.as_str())
            .collect();
        for name in &params {
            self.define_local(name);
        }

        // Parameters shadow package-level names.
        for spec in decl.package.globals() {
            self.compile_var_spec_except(spec, &params)?;
        }

        self.compile_block(&decl.decl.body)?;
        if !terminates(&decl.decl.body) {
            self.emit_return();
        }
        debug_assert!(self.scope.num_locals() <= frame_size);
        Ok(())
    }

    // === Emission helpers ===

    fn new_label(&mut self) -> Result<Label> {
        Ok(self.labels.new_label()?)
    }

    fn set_label(&mut self, label: Label) -> Result<()> {
        Ok(self.labels.set(label, self.emitter.len())?)
    }

    fn emit_return(&mut self) {
        self.emitter.emit(Opcode::FromAltStack);
        self.emitter.emit(Opcode::Drop);
        self.emitter.emit(Opcode::Ret);
    }

    fn emit_load_local(&mut self, slot: usize) {
        self.emitter.emit(Opcode::DupFromAltStack);
        self.emitter.emit_int(slot as i128);
        self.emitter.emit(Opcode::PickItem);
    }

    fn emit_store_local(&mut self, slot: usize) {
        self.emitter.emit(Opcode::DupFromAltStack);
        self.emitter.emit_int(slot as i128);
        self.emitter.emit_int(2);
        self.emitter.emit(Opcode::Roll);
        self.emitter.emit(Opcode::SetItem);
    }

    fn emit_load_field(&mut self, index: i128) {
        self.emitter.emit_int(index);
        self.emitter.emit(Opcode::PickItem);
    }

    /// Expects `value, container` on the stack, container on top.
    fn emit_store_field(&mut self, index: i128) {
        self.emitter.emit_int(index);
        self.emitter.emit(Opcode::Rot);
        self.emitter.emit(Opcode::SetItem);
    }

    fn load_local(&mut self, name: &str, span: Span) -> Result<()> {
        let slot = self.scope.load_local(name).at(span)?;
        self.emit_load_local(slot);
        Ok(())
    }

    /// Store the value on top of the stack into `name`, declaring it if new.
    fn define_local(&mut self, name: &str) {
        if name == "_" {
            self.emitter.emit(Opcode::Drop);
            return;
        }
        let slot = self.scope.new_local(name);
        self.emit_store_local(slot);
    }

    fn store_local(&mut self, name: &str, span: Span) -> Result<()> {
        if name == "_" {
            self.emitter.emit(Opcode::Drop);
            return Ok(());
        }
        let slot = self.scope.load_local(name).at(span)?;
        self.emit_store_local(slot);
        Ok(())
    }

    // === Statements ===

    fn compile_block(&mut self, block: &[Stmt]) -> Result<()> {
        for stmt in block {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.compile_expr(expr)?;
                for _ in 0..expr.ty.value_count() {
                    self.emitter.emit(Opcode::Drop);
                }
                Ok(())
            }
            Stmt::Assign { lhs, op, rhs } => self.compile_assign(lhs, *op, rhs),
            Stmt::Var(spec) => self.compile_var_spec(spec),
            Stmt::IncDec { target, inc } => {
                let op = if *inc { Opcode::Inc } else { Opcode::Dec };
                self.compile_update(target, |cg| {
                    cg.emitter.emit(op);
                    Ok(())
                })
            }
            Stmt::Return(results) => {
                // First result ends up on top.
                for result in results.iter().rev() {
                    self.compile_expr(result)?;
                }
                self.emit_return();
                Ok(())
            }
            Stmt::If {
                init,
                cond,
                then,
                otherwise,
            } => {
                if let Some(init) = init {
                    self.compile_stmt(init)?;
                }
                let else_label = self.new_label()?;
                self.compile_branch(cond, false, else_label)?;
                self.compile_block(then)?;
                match otherwise {
                    Some(otherwise) => {
                        let end = self.new_label()?;
                        self.emitter.emit_jump(Opcode::Jmp, end);
                        self.set_label(else_label)?;
                        self.compile_stmt(otherwise)?;
                        self.set_label(end)
                    }
                    None => self.set_label(else_label),
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    self.compile_stmt(init)?;
                }
                let top = self.new_label()?;
                let post_label = self.new_label()?;
                let end = self.new_label()?;

                self.set_label(top)?;
                if let Some(cond) = cond {
                    self.compile_branch(cond, false, end)?;
                }
                self.loops.push(LoopLabels {
                    break_to: end,
                    continue_to: post_label,
                });
                let body = self.compile_block(body);
                self.loops.pop();
                body?;

                self.set_label(post_label)?;
                if let Some(post) = post {
                    self.compile_stmt(post)?;
                }
                self.emitter.emit_jump(Opcode::Jmp, top);
                self.set_label(end)
            }
            Stmt::Block(block) => self.compile_block(block),
            Stmt::Break => {
                let target = self.loops.last().ok_or(ErrorKind::OutsideLoop("break"))?;
                self.emitter.emit_jump(Opcode::Jmp, target.break_to);
                Ok(())
            }
            Stmt::Continue => {
                let target = self
                    .loops
                    .last()
                    .ok_or(ErrorKind::OutsideLoop("continue"))?;
                self.emitter.emit_jump(Opcode::Jmp, target.continue_to);
                Ok(())
            }
        }
    }

    fn compile_var_spec(&mut self, spec: &VarSpec) -> Result<()> {
        self.compile_var_spec_except(spec, &[])
    }

    /// Compile `spec`, leaving the names in `skip` untouched.
    fn compile_var_spec_except(&mut self, spec: &VarSpec, skip: &[&str]) -> Result<()> {
        let bound = |name: &String| !skip.contains(&name.as_str());
        match spec.values.len() {
            0 => {
                let ty = spec
                    .ty
                    .as_ref()
                    .ok_or_else(|| ErrorKind::NoZeroValue(String::from("untyped")))
                    .at(spec.span)?;
                for name in spec.names.iter().filter(|n| bound(*n)) {
                    self.emit_zero_value(ty, spec.span)?;
                    self.define_local(name);
                }
            }
            n if n == spec.names.len() => {
                for (name, value) in spec.names.iter().zip(&spec.values) {
                    if bound(name) {
                        self.compile_expr(value)?;
                        self.define_local(name);
                    }
                }
            }
            1 => {
                // `var a, b = f()`
                self.compile_expr(&spec.values[0])?;
                for name in &spec.names {
                    if bound(name) {
                        self.define_local(name);
                    } else {
                        self.emitter.emit(Opcode::Drop);
                    }
                }
            }
            n => {
                return Err(CompileError::at(
                    ErrorKind::AssignMismatch {
                        lhs: spec.names.len(),
                        rhs: n,
                    },
                    spec.span,
                ));
            }
        }
        Ok(())
    }

    fn compile_assign(&mut self, lhs: &[Expr], op: AssignOp, rhs: &[Expr]) -> Result<()> {
        let mismatch = || ErrorKind::AssignMismatch {
            lhs: lhs.len(),
            rhs: rhs.len(),
        };

        if let Some(bin) = op.binary_op() {
            let ([target], [value]) = (lhs, rhs) else {
                return Err(mismatch().into());
            };
            return self.compile_update(target, |cg| {
                cg.compile_expr(value)?;
                cg.emit_binary_op(bin, &target.ty, target.span)
            });
        }

        let define = op == AssignOp::Define;
        if lhs.len() == rhs.len() {
            for value in rhs {
                self.compile_expr(value)?;
            }
            for target in lhs.iter().rev() {
                self.store_target(target, define)?;
            }
        } else if let [value] = rhs {
            // Multi-value call: its first result is on top.
            self.compile_expr(value)?;
            for target in lhs {
                self.store_target(target, define)?;
            }
        } else {
            return Err(mismatch().into());
        }
        Ok(())
    }

    /// Read `target`, apply `update` to the value on top of the stack and
    /// write the result back. A computed index is evaluated once.
    fn compile_update(
        &mut self,
        target: &Expr,
        update: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if let ExprKind::Index { base, index } = &target.kind {
            let computed = index.value.as_ref().and_then(Constant::as_int).is_none();
            if computed && !base.ty.is_string() {
                let name = base
                    .as_ident()
                    .ok_or(ErrorKind::NestedIndex)
                    .at(target.span)?;
                // container, index, container, index -> container, index, old
                self.load_local(name, base.span)?;
                self.compile_expr(index)?;
                self.emitter.emit(Opcode::Over);
                self.emitter.emit(Opcode::Over);
                self.emitter.emit(Opcode::PickItem);
                update(self)?;
                self.emitter.emit(Opcode::SetItem);
                return Ok(());
            }
        }
        self.compile_expr(target)?;
        update(self)?;
        self.store_target(target, false)
    }

    /// Pop the value on top of the stack into `target`.
    fn store_target(&mut self, target: &Expr, define: bool) -> Result<()> {
        match &target.kind {
            ExprKind::Ident(name) if define => {
                self.define_local(name);
                Ok(())
            }
            ExprKind::Ident(name) => self.store_local(name, target.span),
            ExprKind::Selector { base, field } => {
                let name = base
                    .as_ident()
                    .ok_or(ErrorKind::NestedSelector)
                    .at(target.span)?;
                let index = field_index(&base.ty, field).at(target.span)?;
                self.load_local(name, base.span)?;
                self.emit_store_field(index as i128);
                Ok(())
            }
            ExprKind::Index { base, index } => {
                let name = base
                    .as_ident()
                    .ok_or(ErrorKind::NestedIndex)
                    .at(target.span)?;
                self.load_local(name, base.span)?;
                match index.value.as_ref().and_then(Constant::as_int) {
                    Some(i) => self.emit_store_field(i),
                    None => {
                        self.compile_expr(index)?;
                        self.emitter.emit(Opcode::Rot);
                        self.emitter.emit(Opcode::SetItem);
                    }
                }
                Ok(())
            }
            _ => Err(CompileError::at(ErrorKind::UnsupportedTarget, target.span)),
        }
    }

    // === Conditions ===

    /// Jump to `target` when `cond` evaluates to `jump_if`, fall through otherwise.
    ///
    /// `&&`, `||` and `!` are lowered to control flow, so no boolean is
    /// materialized for them.
    fn compile_branch(&mut self, cond: &Expr, jump_if: bool, target: Label) -> Result<()> {
        if let Some(Constant::Bool(value)) = &cond.value {
            if *value == jump_if {
                self.emitter.emit_jump(Opcode::Jmp, target);
            }
            return Ok(());
        }

        match &cond.kind {
            ExprKind::Binary {
                op: BinaryOp::LogicalAnd,
                left,
                right,
            } => {
                if jump_if {
                    let skip = self.new_label()?;
                    self.compile_branch(left, false, skip)?;
                    self.compile_branch(right, true, target)?;
                    self.set_label(skip)
                } else {
                    self.compile_branch(left, false, target)?;
                    self.compile_branch(right, false, target)
                }
            }
            ExprKind::Binary {
                op: BinaryOp::LogicalOr,
                left,
                right,
            } => {
                if jump_if {
                    self.compile_branch(left, true, target)?;
                    self.compile_branch(right, true, target)
                } else {
                    let skip = self.new_label()?;
                    self.compile_branch(left, true, skip)?;
                    self.compile_branch(right, false, target)?;
                    self.set_label(skip)
                }
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.compile_branch(operand, !jump_if, target),
            _ => {
                self.compile_expr(cond)?;
                let op = if jump_if {
                    Opcode::JmpIf
                } else {
                    Opcode::JmpIfNot
                };
                self.emitter.emit_jump(op, target);
                Ok(())
            }
        }
    }

    /// `&&`/`||` used as a value.
    fn compile_logical_value(&mut self, expr: &Expr) -> Result<()> {
        let is_false = self.new_label()?;
        let end = self.new_label()?;
        self.compile_branch(expr, false, is_false)?;
        self.emitter.emit_bool(true);
        self.emitter.emit_jump(Opcode::Jmp, end);
        self.set_label(is_false)?;
        self.emitter.emit_bool(false);
        self.set_label(end)
    }

    // === Expressions ===

    pub(super) fn compile_expr(&mut self, expr: &Expr) -> Result<()> {
        if let Some(value) = &expr.value {
            return self.emit_constant(value, &expr.ty).at(expr.span);
        }

        match &expr.kind {
            ExprKind::Lit => Err(CompileError::at(ErrorKind::MissingConstant, expr.span)),
            ExprKind::Ident(name) => self.load_local(name, expr.span),
            ExprKind::Binary { op, left, right } => {
                if op.is_logical() {
                    return self.compile_logical_value(expr);
                }
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit_binary_op(*op, &left.ty, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let opcode = match op {
                    UnaryOp::Plus => None,
                    UnaryOp::Neg => Some(Opcode::Negate),
                    UnaryOp::Not => Some(Opcode::Not),
                    UnaryOp::BitNot => Some(Opcode::Invert),
                    other => {
                        return Err(CompileError::at(
                            ErrorKind::UnsupportedOperator {
                                op: other.to_string(),
                                ty: operand.ty.to_string(),
                            },
                            expr.span,
                        ));
                    }
                };
                self.compile_expr(operand)?;
                if let Some(opcode) = opcode {
                    self.emitter.emit(opcode);
                }
                Ok(())
            }
            ExprKind::Call {
                callee,
                args,
                spread,
            } => self.compile_call(expr, callee, args, *spread),
            ExprKind::Selector { base, field } => {
                let name = base
                    .as_ident()
                    .ok_or(ErrorKind::NestedSelector)
                    .at(expr.span)?;
                let index = field_index(&base.ty, field).at(expr.span)?;
                self.load_local(name, base.span)?;
                self.emit_load_field(index as i128);
                Ok(())
            }
            ExprKind::Index { base, index } => {
                if base.ty.is_string() {
                    return Err(CompileError::at(
                        ErrorKind::UnsupportedOperator {
                            op: String::from("[]"),
                            ty: base.ty.to_string(),
                        },
                        expr.span,
                    ));
                }
                self.compile_expr(base)?;
                match index.value.as_ref().and_then(Constant::as_int) {
                    Some(i) => self.emit_load_field(i),
                    None => {
                        self.compile_expr(index)?;
                        self.emitter.emit(Opcode::PickItem);
                    }
                }
                Ok(())
            }
            ExprKind::ArrayLit(elems) => self.compile_array_lit(expr, elems),
            ExprKind::StructLit(fields) => {
                let strct = expr
                    .ty
                    .as_struct()
                    .ok_or_else(|| ErrorKind::UnsupportedType(expr.ty.to_string()))
                    .at(expr.span)?;
                self.compile_struct(strct, fields, expr.span)
            }
            // The assertion only matters to the type checker.
            ExprKind::TypeAssert(inner) | ExprKind::Conversion(inner) => self.compile_expr(inner),
        }
    }

    fn emit_constant(&mut self, value: &Constant, ty: &Type) -> Result<(), ErrorKind> {
        match value {
            Constant::Int(n) if matches!(ty, Type::Byte) => {
                let byte = u8::try_from(*n).map_err(|_| ErrorKind::InvalidByte)?;
                self.emitter.emit_bytes(&[byte])
            }
            Constant::Int(n) => {
                self.emitter.emit_int(*n);
                Ok(())
            }
            Constant::Bool(b) => {
                self.emitter.emit_bool(*b);
                Ok(())
            }
            Constant::String(s) => self.emitter.emit_string(s),
        }
    }

    /// Emit the opcode(s) for `op` applied to two operands of type `operand`.
    fn emit_binary_op(&mut self, op: BinaryOp, operand: &Type, span: Span) -> Result<()> {
        let string = operand.is_string();
        let unsupported = || {
            CompileError::at(
                ErrorKind::UnsupportedOperator {
                    op: op.to_string(),
                    ty: operand.to_string(),
                },
                span,
            )
        };

        let opcodes: &[Opcode] = match op {
            BinaryOp::Add if string || operand.is_byte_array() => &[Opcode::Cat],
            BinaryOp::Add => &[Opcode::Add],
            BinaryOp::Eq if string => &[Opcode::Equal],
            BinaryOp::Eq => &[Opcode::NumEqual],
            BinaryOp::Neq if string => &[Opcode::Equal, Opcode::Not],
            BinaryOp::Neq => &[Opcode::NumNotEqual],
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge if string => {
                return Err(unsupported());
            }
            BinaryOp::Lt => &[Opcode::Lt],
            BinaryOp::Le => &[Opcode::Lte],
            BinaryOp::Gt => &[Opcode::Gt],
            BinaryOp::Ge => &[Opcode::Gte],
            BinaryOp::Sub => &[Opcode::Sub],
            BinaryOp::Mul => &[Opcode::Mul],
            BinaryOp::Quo => &[Opcode::Div],
            BinaryOp::Rem => &[Opcode::Mod],
            BinaryOp::And => &[Opcode::And],
            BinaryOp::Or => &[Opcode::Or],
            BinaryOp::Xor => &[Opcode::Xor],
            BinaryOp::Shl => &[Opcode::Shl],
            BinaryOp::Shr => &[Opcode::Shr],
            BinaryOp::AndNot | BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                return Err(unsupported());
            }
        };
        for opcode in opcodes {
            self.emitter.emit(*opcode);
        }
        Ok(())
    }

    fn compile_array_lit(&mut self, expr: &Expr, elems: &[Expr]) -> Result<()> {
        if expr.ty.is_byte_array() {
            let bytes = elems
                .iter()
                .map(|elem| {
                    elem.value
                        .as_ref()
                        .and_then(Constant::as_int)
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| CompileError::at(ErrorKind::InvalidByte, elem.span))
                })
                .collect::<Result<Vec<u8>>>()?;
            return self.emitter.emit_bytes(&bytes).at(expr.span);
        }

        for elem in elems.iter().rev() {
            self.compile_expr(elem)?;
        }
        self.emitter.emit_int(elems.len() as i128);
        self.emitter.emit(Opcode::Pack);
        Ok(())
    }

    /// Build a struct on the evaluation stack, storing every field in index
    /// order; fields missing from `inits` get their zero value.
    fn compile_struct(&mut self, strct: &StructType, inits: &[FieldInit], span: Span) -> Result<()> {
        if let Some(unknown) = inits.iter().find(|i| strct.field_index(&i.name).is_none()) {
            return Err(CompileError::at(
                ErrorKind::UnknownField {
                    ty: Type::Struct(strct.clone()).to_string(),
                    field: unknown.name.clone(),
                },
                unknown.value.span,
            ));
        }

        self.emitter.emit_int(strct.num_fields() as i128);
        self.emitter.emit(Opcode::NewStruct);
        for (index, field) in strct.fields.iter().enumerate() {
            self.emitter.emit(Opcode::Dup);
            self.emitter.emit_int(index as i128);
            match inits.iter().find(|i| i.name == field.name) {
                Some(init) => self.compile_expr(&init.value)?,
                None => self.emit_zero_value(&field.ty, span)?,
            }
            self.emitter.emit(Opcode::SetItem);
        }
        Ok(())
    }

    fn emit_zero_value(&mut self, ty: &Type, span: Span) -> Result<()> {
        match ty {
            Type::Int | Type::Uint => self.emitter.emit_int(0),
            Type::Byte => self.emitter.emit_bytes(&[0]).at(span)?,
            Type::Bool => self.emitter.emit_bool(false),
            Type::String => self.emitter.emit_bytes(&[]).at(span)?,
            Type::Slice(elem) if matches!(**elem, Type::Byte) => {
                self.emitter.emit_bytes(&[]).at(span)?
            }
            Type::Array(len, elem) if matches!(**elem, Type::Byte) => {
                self.emitter.emit_bytes(&vec![0; *len]).at(span)?
            }
            Type::Slice(_) => {
                self.emitter.emit_int(0);
                self.emitter.emit(Opcode::Pack);
            }
            Type::Array(len, elem) => {
                for _ in 0..*len {
                    self.emit_zero_value(elem, span)?;
                }
                self.emitter.emit_int(*len as i128);
                self.emitter.emit(Opcode::Pack);
            }
            Type::Struct(strct) => self.compile_struct(strct, &[], span)?,
            other => {
                return Err(CompileError::at(
                    ErrorKind::NoZeroValue(other.to_string()),
                    span,
                ));
            }
        }
        Ok(())
    }

    // === Calls ===

    fn compile_call(
        &mut self,
        expr: &Expr,
        callee: &Callee,
        args: &[Expr],
        spread: bool,
    ) -> Result<()> {
        let key = callee_key(self.package, callee);
        let declared = key.as_deref().and_then(|k| self.funcs.get(k)).cloned();

        match callee {
            Callee::Func { package, name } => {
                if let Some(builtin) =
                    Builtin::for_call(package.as_deref(), name, declared.is_some())
                {
                    return self.compile_builtin(builtin, args, spread, expr.span);
                }
                if let Some(namespace) = package.as_deref().filter(|ns| syscalls::is_namespace(ns))
                {
                    let api = syscalls::lookup(namespace, name)
                        .ok_or_else(|| ErrorKind::UnknownSyscall {
                            namespace: namespace.to_string(),
                            name: name.clone(),
                        })
                        .at(expr.span)?;
                    self.compile_args(None, args)?;
                    self.emitter.emit_syscall(api).at(expr.span)?;
                    // Keeps scripts byte-compatible with other NEO compilers.
                    self.emitter.emit(Opcode::Nop);
                    return Ok(());
                }
            }
            Callee::Method { name, .. } => {
                if declared.is_none() {
                    if let Some(builtin) = Builtin::named(name) {
                        return Err(CompileError::at(
                            ErrorKind::DisallowedBuiltin {
                                name: builtin.name().to_string(),
                                reason: "builtins cannot be called as methods",
                            },
                            expr.span,
                        ));
                    }
                }
            }
        }

        let info = declared
            .ok_or_else(|| {
                ErrorKind::UnresolvedFunction(key.unwrap_or_else(|| callee.name().to_string()))
            })
            .at(expr.span)?;
        let receiver = match callee {
            Callee::Method { receiver, .. } => Some(receiver.as_ref()),
            Callee::Func { .. } => None,
        };
        self.compile_args(receiver, args)?;
        self.emitter.emit_jump(Opcode::Call, info.label);
        Ok(())
    }

    /// Push the receiver and arguments left to right, then reorder them so
    /// the first one is on top.
    fn compile_args(&mut self, receiver: Option<&Expr>, args: &[Expr]) -> Result<()> {
        if let Some(receiver) = receiver {
            self.compile_expr(receiver)?;
        }
        for arg in args {
            self.compile_expr(arg)?;
        }

        let argc = args.len() + receiver.is_some() as usize;
        match argc {
            0 | 1 => {}
            2 => self.emitter.emit(Opcode::Swap),
            3 => {
                self.emitter.emit_int(2);
                self.emitter.emit(Opcode::XSwap);
            }
            n => {
                for i in 1..n {
                    self.emitter.emit_int(i as i128);
                    self.emitter.emit(Opcode::Roll);
                }
            }
        }
        Ok(())
    }
}

fn field_index(ty: &Type, field: &str) -> Result<usize, ErrorKind> {
    let strct = ty
        .as_struct()
        .ok_or_else(|| ErrorKind::UnsupportedType(ty.to_string()))?;
    strct
        .field_index(field)
        .ok_or_else(|| ErrorKind::UnknownField {
            ty: ty.to_string(),
            field: field.to_string(),
        })
}
