#![allow(dead_code)]

use neoc::tree::builder::*;
use neoc::tree::{AssignOp, BinaryOp, Program, Stmt, Type};
use once_cell::sync::Lazy;

/// Collapse the column padding of a disassembly listing so expectations can
/// be written one instruction per line without aligning columns.
pub fn normalize(listing: &str) -> String {
    listing
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `compile_case!(name, program: <Program>, listing: "...")` checks the full
/// disassembly; `error: "E0101"` checks the diagnostic code instead.
#[macro_export]
macro_rules! compile_case {
    ($name:ident, program: $program:expr, listing: $listing:expr $(,)?) => {
        #[test]
        fn $name() {
            let program = $program;
            let code = neoc::compile(&program, &neoc::CompileOptions::default()).unwrap();
            let listing = code.disassemble().unwrap();
            pretty_assertions::assert_eq!(cases::normalize(&listing), cases::normalize($listing));
        }
    };
    ($name:ident, program: $program:expr, error: $code:expr $(,)?) => {
        #[test]
        fn $name() {
            let program = $program;
            match neoc::compile(&program, &neoc::CompileOptions::default()) {
                Err(neoc::Error::Compilation { diagnostics }) => {
                    pretty_assertions::assert_eq!(diagnostics.len(), 1);
                    pretty_assertions::assert_eq!(diagnostics[0].code.as_deref(), Some($code));
                }
                other => panic!("expected a compilation error, got {:?}", other),
            }
        }
    };
}

/// A small token-like contract touching most of the lowering rules:
/// globals, structs and methods, loops, short circuit, syscalls and helpers
/// in a second package.
pub static SAMPLE: Lazy<Program> = Lazy::new(|| {
    let account = struct_type(
        "main",
        "Account",
        &[("Owner", bytes_type()), ("Balance", Type::Int)],
    );
    let acct = || ident("a", account.clone());
    let n = || ident("n", Type::Int);
    let total = || ident("total", Type::Int);

    let main_file = file(
        "main.go",
        vec![
            global("decimals", Type::Int, Some(int(8))),
            global("symbol", Type::String, Some(string("NEO"))),
        ],
        vec![
            func(
                "Main",
                vec![param("op", Type::String), param("n", Type::Int)],
                vec![Type::Int],
                vec![
                    if_(
                        binary(
                            BinaryOp::LogicalOr,
                            binary(BinaryOp::Eq, ident("op", Type::String), string("sum")),
                            binary(BinaryOp::Eq, ident("op", Type::String), string("total")),
                        ),
                        vec![ret(vec![call("sum", vec![n()], Type::Int)])],
                        None,
                    ),
                    define(
                        "a",
                        struct_lit(account.clone(), vec![("Balance", n())]),
                    ),
                    expr_stmt(method_call(
                        acct(),
                        "Deposit",
                        vec![int(100), boolean(true)],
                        Type::Void,
                    )),
                    expr_stmt(pkg_call(
                        "runtime",
                        "Notify",
                        vec![ident("symbol", Type::String)],
                        Type::Void,
                    )),
                    ret(vec![binary(
                        BinaryOp::Mul,
                        field(acct(), "Balance"),
                        pkg_call("mathx", "Pow10", vec![ident("decimals", Type::Int)], Type::Int),
                    )]),
                ],
            ),
            func(
                "sum",
                vec![param("n", Type::Int)],
                vec![Type::Int],
                vec![
                    define("total", int(0)),
                    for_(
                        Some(define("i", int(1))),
                        None,
                        Some(inc(ident("i", Type::Int))),
                        vec![
                            if_(
                                binary(BinaryOp::Gt, ident("i", Type::Int), n()),
                                vec![Stmt::Break],
                                None,
                            ),
                            if_(
                                binary(
                                    BinaryOp::Eq,
                                    binary(BinaryOp::Rem, ident("i", Type::Int), int(2)),
                                    int(0),
                                ),
                                vec![Stmt::Continue],
                                None,
                            ),
                            assign_op(AssignOp::Add, total(), ident("i", Type::Int)),
                        ],
                    ),
                    ret(vec![total()]),
                ],
            ),
            method(
                param("a", account.clone()),
                "Deposit",
                vec![param("amount", Type::Int), param("notify", Type::Bool)],
                vec![],
                vec![
                    assign_op(AssignOp::Add, field(acct(), "Balance"), ident("amount", Type::Int)),
                    if_(
                        binary(
                            BinaryOp::LogicalAnd,
                            ident("notify", Type::Bool),
                            binary(BinaryOp::Gt, ident("amount", Type::Int), int(0)),
                        ),
                        vec![expr_stmt(pkg_call(
                            "runtime",
                            "Log",
                            vec![string("deposit")],
                            Type::Void,
                        ))],
                        None,
                    ),
                ],
            ),
            func("unused", vec![], vec![], vec![]),
        ],
    );

    let mathx = package(
        "mathx",
        "example.com/mathx",
        vec![file(
            "mathx.go",
            vec![],
            vec![
                func(
                    "Pow10",
                    vec![param("e", Type::Int)],
                    vec![Type::Int],
                    vec![
                        define("r", int(1)),
                        for_(
                            None,
                            Some(binary(BinaryOp::Gt, ident("e", Type::Int), int(0))),
                            Some(Stmt::IncDec {
                                target: ident("e", Type::Int),
                                inc: false,
                            }),
                            vec![assign_op(AssignOp::Mul, ident("r", Type::Int), int(10))],
                        ),
                        ret(vec![ident("r", Type::Int)]),
                    ],
                ),
                func("Unused", vec![], vec![], vec![]),
            ],
        )],
    );

    program(
        "main",
        vec![package("main", "main", vec![main_file]), mathx],
    )
});
