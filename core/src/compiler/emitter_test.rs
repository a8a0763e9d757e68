//! Tests for the instruction emitter.

use pretty_assertions::assert_eq;

use crate::compiler::emitter::{Emitter, int_to_bytes};
use crate::compiler::labels::LabelTable;
use crate::vm::Opcode;

fn int(n: i128) -> Vec<u8> {
    let mut e = Emitter::new();
    e.emit_int(n);
    e.into_bytes()
}

fn bytes(data: &[u8]) -> Vec<u8> {
    let mut e = Emitter::new();
    e.emit_bytes(data).unwrap();
    e.into_bytes()
}

#[test]
fn test_small_integers_use_constant_opcodes() {
    assert_eq!(int(-1), vec![Opcode::PushM1 as u8]);
    assert_eq!(int(0), vec![Opcode::Push0 as u8]);
    assert_eq!(int(1), vec![Opcode::Push1 as u8]);
    assert_eq!(int(2), vec![Opcode::Push2 as u8]);
    assert_eq!(int(15), vec![Opcode::Push15 as u8]);
}

#[test]
fn test_larger_integers_use_push_bytes() {
    assert_eq!(int(16), vec![0x01, 0x10]);
    assert_eq!(int(127), vec![0x01, 0x7f]);
    assert_eq!(int(128), vec![0x02, 0x80, 0x00]);
    assert_eq!(int(256), vec![0x02, 0x00, 0x01]);
    assert_eq!(int(1_000_000), vec![0x03, 0x40, 0x42, 0x0f]);
}

#[test]
fn test_negative_integers_keep_their_sign() {
    assert_eq!(int(-2), vec![0x01, 0xfe]);
    assert_eq!(int(-128), vec![0x01, 0x80]);
    assert_eq!(int(-129), vec![0x02, 0x7f, 0xff]);
}

#[test]
fn test_int_to_bytes_is_minimal() {
    assert_eq!(int_to_bytes(0), vec![0x00]);
    assert_eq!(int_to_bytes(-1), vec![0xff]);
    assert_eq!(int_to_bytes(i64::MAX as i128).len(), 8);
    assert_eq!(int_to_bytes(i64::MIN as i128).len(), 8);
    assert_eq!(int_to_bytes(u64::MAX as i128).len(), 9);
}

#[test]
fn test_byte_string_prefix_forms() {
    assert_eq!(bytes(b""), vec![0x00]);
    assert_eq!(bytes(b"ab"), vec![0x02, b'a', b'b']);

    let max_short = vec![7u8; 75];
    assert_eq!(bytes(&max_short)[0], Opcode::PushBytes75 as u8);
    assert_eq!(bytes(&max_short).len(), 76);

    let data1 = vec![7u8; 76];
    assert_eq!(bytes(&data1)[..2], [Opcode::PushData1 as u8, 76]);

    let data2 = vec![7u8; 256];
    assert_eq!(bytes(&data2)[..3], [Opcode::PushData2 as u8, 0x00, 0x01]);

    let data4 = vec![7u8; 0x10000];
    let out = bytes(&data4);
    assert_eq!(out[..5], [Opcode::PushData4 as u8, 0x00, 0x00, 0x01, 0x00]);
    assert_eq!(out.len(), 5 + 0x10000);
}

#[test]
fn test_booleans() {
    let mut e = Emitter::new();
    e.emit_bool(true);
    e.emit_bool(false);
    assert_eq!(e.as_bytes(), &[Opcode::Push1 as u8, Opcode::Push0 as u8]);
}

#[test]
fn test_jump_operand_is_label_index() {
    let mut labels = LabelTable::new();
    let _ = labels.new_label().unwrap();
    let second = labels.new_label().unwrap();

    let mut e = Emitter::new();
    e.emit_jump(Opcode::JmpIfNot, second);
    assert_eq!(e.as_bytes(), &[Opcode::JmpIfNot as u8, 0x01, 0x00]);
}

#[test]
fn test_syscall_is_length_prefixed() {
    let mut e = Emitter::new();
    e.emit_syscall("Neo.Runtime.Log").unwrap();
    let out = e.into_bytes();
    assert_eq!(out[0], Opcode::Syscall as u8);
    assert_eq!(out[1] as usize, "Neo.Runtime.Log".len());
    assert_eq!(&out[2..], b"Neo.Runtime.Log");
}
