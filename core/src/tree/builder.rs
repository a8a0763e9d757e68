//! Terse constructors for hand-built trees.
//!
//! Expression helpers fill in the static type the front-end would have
//! computed where it follows from the operands (comparisons are `bool`,
//! field selections take the field's type, and so on).

use super::{
    AssignOp, BinaryOp, Block, Callee, Constant, Expr, ExprKind, Field, FieldInit, File,
    FuncDecl, Package, Param, Program, Span, Stmt, StructType, Type, TypeName, UnaryOp, VarSpec,
};

// === Types ===

pub fn slice_of(elem: Type) -> Type {
    Type::Slice(Box::new(elem))
}

pub fn bytes_type() -> Type {
    slice_of(Type::Byte)
}

pub fn array_of(len: usize, elem: Type) -> Type {
    Type::Array(len, Box::new(elem))
}

/// A named struct type declared in `package`.
pub fn struct_type(package: &str, name: &str, fields: &[(&str, Type)]) -> Type {
    Type::Struct(StructType {
        name: Some(TypeName {
            package: package.to_string(),
            name: name.to_string(),
        }),
        fields: fields
            .iter()
            .map(|(name, ty)| Field {
                name: name.to_string(),
                ty: ty.clone(),
            })
            .collect(),
    })
}

// === Expressions ===

pub fn int(n: i128) -> Expr {
    Expr::new(ExprKind::Lit, Type::Int).with_value(Constant::Int(n))
}

pub fn byte(b: u8) -> Expr {
    Expr::new(ExprKind::Lit, Type::Byte).with_value(Constant::Int(b as i128))
}

pub fn string(s: &str) -> Expr {
    Expr::new(ExprKind::Lit, Type::String).with_value(Constant::String(s.to_string()))
}

/// `true`/`false` are predeclared identifiers carrying a constant value.
pub fn boolean(b: bool) -> Expr {
    Expr::new(ExprKind::Ident(b.to_string()), Type::Bool).with_value(Constant::Bool(b))
}

pub fn ident(name: &str, ty: Type) -> Expr {
    Expr::new(ExprKind::Ident(name.to_string()), ty)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let ty = if op.is_comparison() || op.is_logical() {
        Type::Bool
    } else {
        left.ty.clone()
    };
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
    )
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    let ty = operand.ty.clone();
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
    )
}

/// Call to a function of the current package (or a universe builtin).
pub fn call(name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Callee::Func {
                package: None,
                name: name.to_string(),
            },
            args,
            spread: false,
        },
        ty,
    )
}

/// Package-qualified call, `package.name(args)`.
pub fn pkg_call(package: &str, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Callee::Func {
                package: Some(package.to_string()),
                name: name.to_string(),
            },
            args,
            spread: false,
        },
        ty,
    )
}

pub fn method_call(receiver: Expr, name: &str, args: Vec<Expr>, ty: Type) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Callee::Method {
                receiver: Box::new(receiver),
                name: name.to_string(),
            },
            args,
            spread: false,
        },
        ty,
    )
}

/// Marks the last argument of a call as spread (`f(xs...)`).
pub fn spread(mut call: Expr) -> Expr {
    if let ExprKind::Call { spread, .. } = &mut call.kind {
        *spread = true;
    }
    call
}

/// `base.name`; an unknown field is typed `interface{}`.
pub fn field(base: Expr, name: &str) -> Expr {
    let ty = base
        .ty
        .as_struct()
        .and_then(|s| s.fields.iter().find(|f| f.name == name))
        .map(|f| f.ty.clone())
        .unwrap_or(Type::Interface);
    Expr::new(
        ExprKind::Selector {
            base: Box::new(base),
            field: name.to_string(),
        },
        ty,
    )
}

pub fn index(base: Expr, index: Expr) -> Expr {
    let ty = match &base.ty {
        Type::Slice(elem) | Type::Array(_, elem) => (**elem).clone(),
        Type::Map(_, value) => (**value).clone(),
        Type::String => Type::Byte,
        _ => Type::Interface,
    };
    Expr::new(
        ExprKind::Index {
            base: Box::new(base),
            index: Box::new(index),
        },
        ty,
    )
}

pub fn slice_lit(elem: Type, elems: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::ArrayLit(elems), slice_of(elem))
}

pub fn struct_lit(ty: Type, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::new(
        ExprKind::StructLit(
            fields
                .into_iter()
                .map(|(name, value)| FieldInit {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        ),
        ty,
    )
}

/// `ty(inner)`; a constant operand stays constant.
pub fn convert(inner: Expr, ty: Type) -> Expr {
    let value = inner.value.clone();
    Expr {
        kind: ExprKind::Conversion(Box::new(inner)),
        ty,
        value,
        span: Span::default(),
    }
}

pub fn assert_type(inner: Expr, ty: Type) -> Expr {
    Expr::new(ExprKind::TypeAssert(Box::new(inner)), ty)
}

// === Statements ===

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

/// `name := value`
pub fn define(name: &str, value: Expr) -> Stmt {
    let target = ident(name, value.ty.clone());
    Stmt::Assign {
        lhs: vec![target],
        op: AssignOp::Define,
        rhs: vec![value],
    }
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    assign_op(AssignOp::Assign, target, value)
}

pub fn assign_op(op: AssignOp, target: Expr, value: Expr) -> Stmt {
    Stmt::Assign {
        lhs: vec![target],
        op,
        rhs: vec![value],
    }
}

/// `a, b := f()` and friends.
pub fn assign_many(op: AssignOp, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
    Stmt::Assign { lhs, op, rhs }
}

pub fn var(name: &str, ty: Type, value: Option<Expr>) -> Stmt {
    Stmt::Var(global(name, ty, value))
}

pub fn inc(target: Expr) -> Stmt {
    Stmt::IncDec { target, inc: true }
}

pub fn dec(target: Expr) -> Stmt {
    Stmt::IncDec { target, inc: false }
}

pub fn ret(results: Vec<Expr>) -> Stmt {
    Stmt::Return(results)
}

pub fn if_(cond: Expr, then: Block, otherwise: Option<Stmt>) -> Stmt {
    Stmt::If {
        init: None,
        cond,
        then,
        otherwise: otherwise.map(Box::new),
    }
}

pub fn for_(init: Option<Stmt>, cond: Option<Expr>, post: Option<Stmt>, body: Block) -> Stmt {
    Stmt::For {
        init: init.map(Box::new),
        cond,
        post: post.map(Box::new),
        body,
    }
}

// === Declarations ===

pub fn param(name: &str, ty: Type) -> Param {
    Param {
        name: name.to_string(),
        ty,
    }
}

pub fn func(name: &str, params: Vec<Param>, results: Vec<Type>, body: Block) -> FuncDecl {
    FuncDecl {
        name: name.to_string(),
        receiver: None,
        params,
        results,
        body,
        span: Span::default(),
    }
}

pub fn method(
    receiver: Param,
    name: &str,
    params: Vec<Param>,
    results: Vec<Type>,
    body: Block,
) -> FuncDecl {
    FuncDecl {
        receiver: Some(receiver),
        ..func(name, params, results, body)
    }
}

/// A single-name `var` spec, at package level or inside a function.
pub fn global(name: &str, ty: Type, value: Option<Expr>) -> VarSpec {
    VarSpec {
        names: vec![name.to_string()],
        ty: Some(ty),
        values: value.into_iter().collect(),
        span: Span::default(),
    }
}

pub fn file(name: &str, globals: Vec<VarSpec>, funcs: Vec<FuncDecl>) -> File {
    File {
        name: name.to_string(),
        source: None,
        globals,
        funcs,
    }
}

pub fn package(name: &str, path: &str, files: Vec<File>) -> Package {
    Package {
        name: name.to_string(),
        path: path.to_string(),
        files,
    }
}

pub fn program(root: &str, packages: Vec<Package>) -> Program {
    Program {
        root: root.to_string(),
        packages,
    }
}

/// Single-file `main` package holding `funcs`.
pub fn main_program(globals: Vec<VarSpec>, funcs: Vec<FuncDecl>) -> Program {
    program(
        "main",
        vec![package("main", "main", vec![file("main.go", globals, funcs)])],
    )
}
