mod cases;

use neoc::{CompileOptions, Format, compile, load_program, render_error_to_string_no_color, save_program};
use pretty_assertions::assert_eq;

use cases::SAMPLE;

const COUNTER: &[u8] = include_bytes!("data/counter.json");
const BROKEN: &[u8] = include_bytes!("data/broken.json");

#[test]
fn json_tree_compiles() {
    let program = load_program(COUNTER, Format::Json).unwrap();
    let code = compile(&program, &CompileOptions::default()).unwrap();
    assert_eq!(
        cases::normalize(&code.disassemble().unwrap()),
        cases::normalize(
            "
            main.Main:
            0 PUSH2
            1 NEWARRAY
            2 TOALTSTACK
            3 DUPFROMALTSTACK
            4 PUSH0
            5 PUSH2
            6 ROLL
            7 SETITEM
            8 PUSH2
            9 DUPFROMALTSTACK
            10 PUSH1
            11 PUSH2
            12 ROLL
            13 SETITEM
            14 DUPFROMALTSTACK
            15 PUSH0
            16 PICKITEM
            17 DUPFROMALTSTACK
            18 PUSH1
            19 PICKITEM
            20 MUL
            21 FROMALTSTACK
            22 DROP
            23 RET
            "
        )
    );
}

#[test]
fn serialized_trees_compile_identically() {
    let expected = compile(&SAMPLE, &CompileOptions::default()).unwrap();
    for format in [Format::Json, Format::Postcard] {
        let bytes = save_program(&SAMPLE, format).unwrap();
        let program = load_program(&bytes, format).unwrap();
        assert_eq!(program, *SAMPLE);
        let code = compile(&program, &CompileOptions::default()).unwrap();
        assert_eq!(code.script, expected.script, "{:?}", format);
    }
}

#[test]
fn diagnostics_point_into_the_source() {
    let program = load_program(BROKEN, Format::Json).unwrap();
    let err = compile(&program, &CompileOptions::default()).unwrap_err();
    let output = render_error_to_string_no_color(&err, Some(&program));
    assert!(output.contains("[E0105]"), "{}", output);
    assert!(output.contains("broken.go"), "{}", output);
    assert!(output.contains("return missing"), "{}", output);
}

#[test]
fn truncated_postcard_is_a_decode_error() {
    let bytes = save_program(&SAMPLE, Format::Postcard).unwrap();
    let err = load_program(&bytes[..bytes.len() / 2], Format::Postcard).unwrap_err();
    assert!(matches!(err, neoc::Error::Decode(_)));
}
