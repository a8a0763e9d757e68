//! Append-only byte sink for AVM instructions.

use super::error::ErrorKind;
use super::labels::Label;
use crate::vm::Opcode;

/// Growable script buffer with typed push helpers.
///
/// Plain appends cannot fail; only payloads too large for their length
/// prefix are rejected.
#[derive(Debug, Default)]
pub struct Emitter {
    buf: Vec<u8>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next emitted byte.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn emit(&mut self, op: Opcode) {
        self.buf.push(op as u8);
    }

    /// Push an integer using the most compact encoding.
    pub fn emit_int(&mut self, n: i128) {
        match n {
            -1 => self.emit(Opcode::PushM1),
            0 => self.emit(Opcode::Push0),
            // PUSH16 is left unused, as other NEO compilers do.
            _ => match i64::try_from(n)
                .ok()
                .filter(|&n| n <= 15)
                .and_then(Opcode::push_small)
            {
                Some(op) => self.emit(op),
                None => self.emit_short_bytes(&int_to_bytes(n)),
            },
        }
    }

    pub fn emit_bool(&mut self, b: bool) {
        self.emit(if b { Opcode::PUSHT } else { Opcode::PUSHF });
    }

    pub fn emit_string(&mut self, s: &str) -> Result<(), ErrorKind> {
        self.emit_bytes(s.as_bytes())
    }

    /// Push a byte string, choosing `PUSHBYTESn` or the smallest `PUSHDATA` form.
    pub fn emit_bytes(&mut self, data: &[u8]) -> Result<(), ErrorKind> {
        let len = data.len();
        if len <= 75 {
            self.emit_short_bytes(data);
            return Ok(());
        }
        if let Ok(n) = u8::try_from(len) {
            self.emit(Opcode::PushData1);
            self.buf.push(n);
        } else if let Ok(n) = u16::try_from(len) {
            self.emit(Opcode::PushData2);
            self.buf.extend_from_slice(&n.to_le_bytes());
        } else if let Ok(n) = u32::try_from(len) {
            self.emit(Opcode::PushData4);
            self.buf.extend_from_slice(&n.to_le_bytes());
        } else {
            return Err(ErrorKind::DataTooLarge(len));
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn emit_short_bytes(&mut self, data: &[u8]) {
        match Opcode::push_bytes(data.len()) {
            Some(op) => self.emit(op),
            None => {
                debug_assert!(data.is_empty(), "{} bytes is not a short push", data.len());
                self.emit(Opcode::Push0);
            }
        }
        self.buf.extend_from_slice(data);
    }

    /// Emit a jump or call whose operand is `label`'s index until linked.
    pub fn emit_jump(&mut self, op: Opcode, label: Label) {
        debug_assert!(op.is_jump());
        self.emit(op);
        self.buf.extend_from_slice(&label.index().to_le_bytes());
    }

    /// `SYSCALL` followed by the length-prefixed interop api name.
    pub fn emit_syscall(&mut self, api: &str) -> Result<(), ErrorKind> {
        let len = u8::try_from(api.len()).map_err(|_| ErrorKind::DataTooLarge(api.len()))?;
        self.emit(Opcode::Syscall);
        self.buf.push(len);
        self.buf.extend_from_slice(api.as_bytes());
        Ok(())
    }
}

/// Minimal little-endian two's complement encoding of `n`.
pub fn int_to_bytes(n: i128) -> Vec<u8> {
    let mut bytes = n.to_le_bytes().to_vec();
    while bytes.len() > 1 {
        let top = bytes[bytes.len() - 1];
        let next_sign = bytes[bytes.len() - 2] & 0x80;
        let redundant = (top == 0x00 && next_sign == 0) || (top == 0xff && next_sign != 0);
        if !redundant {
            break;
        }
        bytes.pop();
    }
    bytes
}
