//! Rewrites jump and call operands from label indices to displacements.

use tracing::trace;

use super::error::ErrorKind;
use super::labels::LabelTable;
use crate::vm::Instructions;

/// Patch every `JMP`/`JMPIF`/`JMPIFNOT`/`CALL` in `script` in place.
///
/// The script is decoded instruction by instruction, so bytes inside push
/// payloads are never mistaken for jumps. The patched operand is
/// `target - instruction_offset` as a little-endian `i16`.
pub fn link(script: &mut [u8], labels: &LabelTable) -> Result<(), ErrorKind> {
    let mut patches = Vec::new();
    for instr in Instructions::new(script) {
        let instr = instr.map_err(ErrorKind::Malformed)?;
        if !instr.opcode.is_jump() {
            continue;
        }
        let index = u16::from_le_bytes([instr.operand[0], instr.operand[1]]);
        let target = labels.resolve(index)?;
        let displacement = target as isize - instr.offset as isize;
        let displacement =
            i16::try_from(displacement).map_err(|_| ErrorKind::JumpTooFar(displacement))?;
        patches.push((instr.offset, displacement));
    }

    for (offset, displacement) in patches {
        trace!(offset, displacement, "Patched jump");
        script[offset + 1..offset + 3].copy_from_slice(&displacement.to_le_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::emitter::Emitter;
    use crate::vm::{Instructions, Opcode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forward_and_backward_jumps() {
        let mut labels = LabelTable::new();
        let top = labels.new_label().unwrap();
        let end = labels.new_label().unwrap();

        let mut e = Emitter::new();
        labels.set(top, e.len()).unwrap();
        e.emit(Opcode::Push1); // 0
        e.emit_jump(Opcode::JmpIfNot, end); // 1
        e.emit_jump(Opcode::Jmp, top); // 4
        labels.set(end, e.len()).unwrap();
        e.emit(Opcode::Ret); // 7

        let mut script = e.into_bytes();
        link(&mut script, &labels).unwrap();

        let jumps: Vec<(usize, Option<usize>)> = Instructions::new(&script)
            .map(|i| i.unwrap())
            .filter(|i| i.opcode.is_jump())
            .map(|i| (i.offset, i.jump_target()))
            .collect();
        assert_eq!(jumps, vec![(1, Some(7)), (4, Some(0))]);
        assert_eq!(script[5..7], (-4i16).to_le_bytes());
    }

    #[test]
    fn test_push_payload_is_not_patched() {
        let labels = LabelTable::new();
        let mut e = Emitter::new();
        // Payload bytes look like `JMP 0x0000`.
        e.emit_bytes(&[Opcode::Jmp as u8, 0x00, 0x00]).unwrap();
        let mut script = e.into_bytes();
        let before = script.clone();
        link(&mut script, &labels).unwrap();
        assert_eq!(script, before);
    }

    #[test]
    fn test_unresolved_label_is_an_error() {
        let mut labels = LabelTable::new();
        let dangling = labels.new_label().unwrap();
        let mut e = Emitter::new();
        e.emit_jump(Opcode::Jmp, dangling);
        let mut script = e.into_bytes();
        assert_eq!(
            link(&mut script, &labels),
            Err(ErrorKind::UnresolvedLabel(0))
        );
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let labels = LabelTable::new();
        let mut script = vec![Opcode::Call as u8, 0x05, 0x00];
        assert_eq!(link(&mut script, &labels), Err(ErrorKind::UnknownLabel(5)));
    }

    #[test]
    fn test_displacement_must_fit_in_i16() {
        let mut labels = LabelTable::new();
        let far = labels.new_label().unwrap();
        let mut e = Emitter::new();
        e.emit_jump(Opcode::Jmp, far);
        for _ in 0..40_000 {
            e.emit(Opcode::Nop);
        }
        labels.set(far, e.len()).unwrap();
        let mut script = e.into_bytes();
        assert_eq!(
            link(&mut script, &labels),
            Err(ErrorKind::JumpTooFar(40_003))
        );
    }
}
