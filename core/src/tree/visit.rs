//! Read-only traversal over statements and expressions.
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to keep descending.

use super::{Callee, Expr, ExprKind, FuncDecl, Stmt, VarSpec};

pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_var_spec(&mut self, spec: &VarSpec) {
        walk_var_spec(self, spec);
    }
}

pub fn walk_func<V: Visitor + ?Sized>(visitor: &mut V, decl: &FuncDecl) {
    for stmt in &decl.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_var_spec<V: Visitor + ?Sized>(visitor: &mut V, spec: &VarSpec) {
    for value in &spec.values {
        visitor.visit_expr(value);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(expr) => visitor.visit_expr(expr),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Var(spec) => visitor.visit_var_spec(spec),
        Stmt::IncDec { target, .. } => visitor.visit_expr(target),
        Stmt::Return(results) => {
            for expr in results {
                visitor.visit_expr(expr);
            }
        }
        Stmt::If {
            init,
            cond,
            then,
            otherwise,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            visitor.visit_expr(cond);
            for stmt in then {
                visitor.visit_stmt(stmt);
            }
            if let Some(otherwise) = otherwise {
                visitor.visit_stmt(otherwise);
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            for stmt in body {
                visitor.visit_stmt(stmt);
            }
            if let Some(post) = post {
                visitor.visit_stmt(post);
            }
        }
        Stmt::Block(block) => {
            for stmt in block {
                visitor.visit_stmt(stmt);
            }
        }
        Stmt::Break | Stmt::Continue => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Lit | ExprKind::Ident(_) => {}
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Call { callee, args, .. } => {
            if let Callee::Method { receiver, .. } = callee {
                visitor.visit_expr(receiver);
            }
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Selector { base, .. } => visitor.visit_expr(base),
        ExprKind::Index { base, index } => {
            visitor.visit_expr(base);
            visitor.visit_expr(index);
        }
        ExprKind::ArrayLit(elems) => {
            for elem in elems {
                visitor.visit_expr(elem);
            }
        }
        ExprKind::StructLit(fields) => {
            for field in fields {
                visitor.visit_expr(&field.value);
            }
        }
        ExprKind::TypeAssert(inner) | ExprKind::Conversion(inner) => visitor.visit_expr(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{BinaryOp, Type, builder::*};

    #[derive(Default)]
    struct CallNames(Vec<String>);

    impl Visitor for CallNames {
        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Call { callee, .. } = &expr.kind {
                self.0.push(callee.name().to_string());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_walk_reaches_nested_calls() {
        let decl = func(
            "Main",
            vec![],
            vec![],
            vec![
                define("x", call("f", vec![call("g", vec![], Type::Int)], Type::Int)),
                if_(
                    binary(BinaryOp::Lt, ident("x", Type::Int), int(3)),
                    vec![expr_stmt(call("h", vec![], Type::Void))],
                    None,
                ),
            ],
        );
        let mut names = CallNames::default();
        walk_func(&mut names, &decl);
        assert_eq!(names.0, vec!["f", "g", "h"]);
    }
}
