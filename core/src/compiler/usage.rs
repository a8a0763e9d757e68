//! Reachability of functions from the entry point.

use hashbrown::{HashMap, HashSet};

use super::builtins::Builtin;
use super::scope::{DeclRef, callee_key};
use crate::tree::visit::{Visitor, walk_expr, walk_func};
use crate::tree::{Callee, Expr, ExprKind};

/// The set of functions transitively called from the entry function.
///
/// Package-level initializers count as code of every function in their
/// package, since each frame evaluates them on entry.
#[derive(Debug, Clone)]
pub struct FuncUsage {
    used: HashSet<String>,
}

impl FuncUsage {
    pub fn analyze(decls: &[DeclRef<'_>], entry: &str) -> Self {
        let by_key: HashMap<&str, &DeclRef<'_>> =
            decls.iter().map(|d| (d.key.as_str(), d)).collect();
        let declared: HashSet<&str> = by_key.keys().copied().collect();

        let mut used = HashSet::new();
        used.insert(entry.to_string());
        let mut pending = vec![entry.to_string()];

        while let Some(key) = pending.pop() {
            let Some(decl) = by_key.get(key.as_str()) else {
                continue;
            };
            let mut calls = Calls {
                package: &decl.package.name,
                declared: &declared,
                keys: Vec::new(),
            };
            walk_func(&mut calls, decl.decl);
            for spec in decl.package.globals() {
                calls.visit_var_spec(spec);
            }
            for callee in calls.keys {
                if used.insert(callee.clone()) {
                    pending.push(callee);
                }
            }
        }

        Self { used }
    }

    /// Every declaration counts as used.
    pub fn all(decls: &[DeclRef<'_>]) -> Self {
        Self {
            used: decls.iter().map(|d| d.key.clone()).collect(),
        }
    }

    pub fn is_used(&self, key: &str) -> bool {
        self.used.contains(key)
    }
}

/// Declared functions called from a body; builtin calls never reach a declaration.
struct Calls<'a> {
    package: &'a str,
    declared: &'a HashSet<&'a str>,
    keys: Vec<String>,
}

impl Visitor for Calls<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Call { callee, .. } = &expr.kind {
            if let Some(key) = callee_key(self.package, callee) {
                let builtin = match callee {
                    Callee::Func { package, name } => Builtin::for_call(
                        package.as_deref(),
                        name,
                        self.declared.contains(key.as_str()),
                    )
                    .is_some(),
                    Callee::Method { .. } => false,
                };
                if !builtin {
                    self.keys.push(key);
                }
            }
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::scope::collect_decls;
    use crate::tree::Type;
    use crate::tree::builder::*;

    #[test]
    fn test_transitive_and_cross_package() {
        let program = program(
            "main",
            vec![
                package(
                    "main",
                    "main",
                    vec![file(
                        "main.go",
                        vec![],
                        vec![
                            func(
                                "Main",
                                vec![],
                                vec![],
                                vec![expr_stmt(call("a", vec![], Type::Void))],
                            ),
                            func(
                                "a",
                                vec![],
                                vec![],
                                vec![expr_stmt(pkg_call("util2", "B", vec![], Type::Void))],
                            ),
                            func("unused", vec![], vec![], vec![]),
                        ],
                    )],
                ),
                package(
                    "util2",
                    "example.com/util2",
                    vec![file(
                        "util.go",
                        vec![global("seed", Type::Int, Some(call("seed", vec![], Type::Int)))],
                        vec![
                            func("B", vec![], vec![], vec![]),
                            func("seed", vec![], vec![Type::Int], vec![ret(vec![int(4)])]),
                            func("C", vec![], vec![], vec![]),
                        ],
                    )],
                ),
            ],
        );
        let decls = collect_decls(&program).unwrap();
        let usage = FuncUsage::analyze(&decls, "main.Main");

        assert!(usage.is_used("main.Main"));
        assert!(usage.is_used("main.a"));
        assert!(usage.is_used("util2.B"));
        // Called from a package-level initializer of a reachable package.
        assert!(usage.is_used("util2.seed"));
        assert!(!usage.is_used("main.unused"));
        assert!(!usage.is_used("util2.C"));

        let all = FuncUsage::all(&decls);
        assert!(all.is_used("main.unused"));
    }

    #[test]
    fn test_builtin_calls_do_not_reach_stubs() {
        let program = program(
            "main",
            vec![
                package(
                    "main",
                    "main",
                    vec![file(
                        "main.go",
                        vec![],
                        vec![
                            func(
                                "Main",
                                vec![],
                                vec![Type::Int],
                                vec![
                                    expr_stmt(pkg_call(
                                        "crypto",
                                        "SHA256",
                                        vec![string("a")],
                                        bytes_type(),
                                    )),
                                    ret(vec![call("len", vec![string("ab")], Type::Int)]),
                                ],
                            ),
                            func(
                                "len",
                                vec![param("s", Type::String)],
                                vec![Type::Int],
                                vec![ret(vec![int(2)])],
                            ),
                        ],
                    )],
                ),
                package(
                    "crypto",
                    "crypto",
                    vec![file(
                        "crypto.go",
                        vec![],
                        vec![func(
                            "SHA256",
                            vec![param("b", bytes_type())],
                            vec![bytes_type()],
                            vec![ret(vec![ident("b", bytes_type())])],
                        )],
                    )],
                ),
            ],
        );
        let decls = collect_decls(&program).unwrap();
        let usage = FuncUsage::analyze(&decls, "main.Main");
        assert!(!usage.is_used("crypto.SHA256"));
        // A declared `len` shadows the universe builtin.
        assert!(usage.is_used("main.len"));
    }

    #[test]
    fn test_methods_are_reached_through_receiver_type() {
        let point = struct_type("main", "Point", &[("X", Type::Int)]);
        let program = main_program(
            vec![],
            vec![
                func(
                    "Main",
                    vec![],
                    vec![Type::Int],
                    vec![
                        define("p", struct_lit(point.clone(), vec![])),
                        ret(vec![method_call(
                            ident("p", point.clone()),
                            "Len",
                            vec![],
                            Type::Int,
                        )]),
                    ],
                ),
                method(
                    param("p", point.clone()),
                    "Len",
                    vec![],
                    vec![Type::Int],
                    vec![ret(vec![int(1)])],
                ),
                method(param("p", point), "Other", vec![], vec![], vec![]),
            ],
        );
        let decls = collect_decls(&program).unwrap();
        let usage = FuncUsage::analyze(&decls, "main.Main");
        assert!(usage.is_used("main.Point.Len"));
        assert!(!usage.is_used("main.Point.Other"));
    }
}
