mod cases;

use neoc::tree::builder::*;
use neoc::tree::{BinaryOp, Stmt, Type};

compile_case!(
    missing_entry,
    program: main_program(vec![], vec![func("main", vec![], vec![], vec![])]),
    error: "E0101",
);

compile_case!(
    unresolved_call,
    program: main_program(
        vec![],
        vec![func(
            "Main",
            vec![],
            vec![],
            vec![expr_stmt(call("missing", vec![], Type::Void))],
        )],
    ),
    error: "E0103",
);

compile_case!(
    duplicate_function,
    program: main_program(
        vec![],
        vec![
            func("Main", vec![], vec![], vec![]),
            func("Main", vec![], vec![], vec![]),
        ],
    ),
    error: "E0104",
);

compile_case!(
    method_on_basic_type,
    program: main_program(
        vec![],
        vec![
            func("Main", vec![], vec![], vec![]),
            method(param("n", Type::Int), "Double", vec![], vec![], vec![]),
        ],
    ),
    error: "E0106",
);

compile_case!(
    string_ordering,
    program: main_program(
        vec![],
        vec![func(
            "Main",
            vec![param("s", Type::String)],
            vec![Type::Bool],
            vec![ret(vec![binary(BinaryOp::Ge, ident("s", Type::String), string("a"))])],
        )],
    ),
    error: "E0203",
);

compile_case!(
    unknown_syscall,
    program: main_program(
        vec![],
        vec![func(
            "Main",
            vec![],
            vec![],
            vec![expr_stmt(pkg_call("runtime", "Explode", vec![], Type::Void))],
        )],
    ),
    error: "E0301",
);

compile_case!(
    malformed_address,
    program: main_program(
        vec![],
        vec![func(
            "Main",
            vec![],
            vec![],
            vec![define(
                "owner",
                pkg_call("util", "FromAddress", vec![string("not-an-address")], bytes_type()),
            )],
        )],
    ),
    error: "E0401",
);

compile_case!(
    continue_outside_loop,
    program: main_program(vec![], vec![func("Main", vec![], vec![], vec![Stmt::Continue])]),
    error: "E0904",
);

#[test]
fn error_names_the_function_and_file() {
    let program = main_program(
        vec![],
        vec![
            func(
                "Main",
                vec![],
                vec![],
                vec![expr_stmt(call("helper", vec![], Type::Void))],
            ),
            func(
                "helper",
                vec![],
                vec![Type::Int],
                vec![ret(vec![ident("nope", Type::Int)])],
            ),
        ],
    );
    let err = neoc::compile(&program, &neoc::CompileOptions::default()).unwrap_err();
    let neoc::Error::Compilation { diagnostics } = err else {
        panic!("expected a compilation error");
    };
    let diag = &diagnostics[0];
    assert_eq!(diag.function.as_deref(), Some("main.helper"));
    assert_eq!(diag.file.as_deref(), Some("main.go"));
    assert_eq!(diag.message, "unknown local variable `nope`");
}
