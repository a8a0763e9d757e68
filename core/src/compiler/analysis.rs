//! Per-function analyses run before a body is compiled.

use hashbrown::HashSet;

use crate::tree::visit::{Visitor, walk_stmt};
use crate::tree::{AssignOp, Expr, FuncDecl, Stmt};

/// Number of distinct local names a function declares: receiver, parameters,
/// `:=` targets and `var` names. The blank identifier takes no slot.
pub fn count_locals(decl: &FuncDecl) -> usize {
    #[derive(Default)]
    struct Names(HashSet<String>);

    impl Names {
        fn add(&mut self, name: &str) {
            if name != "_" {
                self.0.insert(name.to_string());
            }
        }
    }

    impl Visitor for Names {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            match stmt {
                Stmt::Assign {
                    lhs,
                    op: AssignOp::Define,
                    ..
                } => {
                    for name in lhs.iter().filter_map(Expr::as_ident) {
                        self.add(name);
                    }
                }
                Stmt::Var(spec) => {
                    for name in &spec.names {
                        self.add(name);
                    }
                }
                _ => {}
            }
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, _expr: &Expr) {}
    }

    let mut names = Names::default();
    for p in decl.receiver.iter().chain(&decl.params) {
        names.add(&p.name);
    }
    for stmt in &decl.body {
        names.visit_stmt(stmt);
    }
    names.0.len()
}

/// Whether control can never fall off the end of `block`.
pub fn terminates(block: &[Stmt]) -> bool {
    match block.last() {
        Some(Stmt::Return(_)) => true,
        Some(Stmt::Block(inner)) => terminates(inner),
        Some(Stmt::If {
            then,
            otherwise: Some(otherwise),
            ..
        }) => terminates(then) && terminates(core::slice::from_ref(otherwise.as_ref())),
        Some(Stmt::For {
            cond: None, body, ..
        }) => !breaks_out(body),
        _ => false,
    }
}

/// Whether `block` contains a `break` for the enclosing loop.
fn breaks_out(block: &[Stmt]) -> bool {
    block.iter().any(|stmt| match stmt {
        Stmt::Break => true,
        Stmt::Block(inner) => breaks_out(inner),
        Stmt::If {
            then, otherwise, ..
        } => {
            breaks_out(then)
                || otherwise
                    .as_deref()
                    .is_some_and(|s| breaks_out(core::slice::from_ref(s)))
        }
        // A nested loop owns its breaks.
        _ => false,
    })
}
