use core::fmt::{self, Write as _};

use hashbrown::{HashMap, HashSet};
use thiserror::Error;

use crate::vm::{Opcode, OperandSize};

/// A compiled script plus the entry offsets of the functions it contains.
#[derive(Clone, PartialEq, Eq)]
pub struct Code {
    /// Linked bytecode, ready to be executed.
    pub script: Vec<u8>,
    /// Function entry points, in emission order.
    pub functions: Vec<FunctionEntry>,
}

/// Where a compiled function starts and how large its locals array is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    pub offset: usize,
    pub frame_size: usize,
}

impl Code {
    /// Wrap a raw script (e.g. loaded from an `.avm` file) without function metadata.
    pub fn from_script(script: Vec<u8>) -> Self {
        Self {
            script,
            functions: Vec::new(),
        }
    }

    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.script)
    }

    /// Render a labelled listing of the script.
    pub fn disassemble(&self) -> Result<String, DecodeError> {
        let mut out = String::new();
        write_listing(&mut out, &self.script, &self.functions)?;
        Ok(out)
    }
}

/// One decoded instruction, borrowing its operand from the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Offset of the opcode byte.
    pub offset: usize,
    pub opcode: Opcode,
    /// Operand payload (without the length prefix of `PUSHDATA*`/`SYSCALL`).
    pub operand: &'a [u8],
    /// Encoded size in bytes, opcode included.
    pub size: usize,
}

impl Instruction<'_> {
    /// Signed displacement of a jump or call.
    pub fn displacement(&self) -> Option<i16> {
        if !self.opcode.is_jump() {
            return None;
        }
        Some(i16::from_le_bytes([self.operand[0], self.operand[1]]))
    }

    /// Absolute target of a jump or call, if it lands inside `0..=usize::MAX`.
    pub fn jump_target(&self) -> Option<usize> {
        let displacement = self.displacement()?;
        self.offset.checked_add_signed(displacement as isize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode 0x{byte:02X} at offset {offset}")]
    InvalidOpcode { offset: usize, byte: u8 },
    #[error("truncated {opcode} operand at offset {offset}")]
    Truncated { offset: usize, opcode: Opcode },
}

/// Iterator decoding a script instruction by instruction.
///
/// Push payloads are skipped as a whole, so bytes inside them are never
/// mistaken for opcodes.
pub struct Instructions<'a> {
    script: &'a [u8],
    pc: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self {
            script,
            pc: 0,
            failed: false,
        }
    }

    fn decode_at(&self, offset: usize) -> Result<Instruction<'a>, DecodeError> {
        let byte = self.script[offset];
        let opcode =
            Opcode::try_from(byte).map_err(|_| DecodeError::InvalidOpcode { offset, byte })?;
        let truncated = DecodeError::Truncated { offset, opcode };

        let (prefix, len) = match opcode.operand_size() {
            OperandSize::Fixed(n) => (0, n),
            OperandSize::Prefixed(width) => {
                let bytes = self
                    .script
                    .get(offset + 1..offset + 1 + width)
                    .ok_or(truncated.clone())?;
                let mut le = [0u8; 8];
                le[..width].copy_from_slice(bytes);
                (width, u64::from_le_bytes(le) as usize)
            }
        };

        let start = offset + 1 + prefix;
        let operand = start
            .checked_add(len)
            .and_then(|end| self.script.get(start..end))
            .ok_or(truncated)?;

        Ok(Instruction {
            offset,
            opcode,
            operand,
            size: 1 + prefix + len,
        })
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.script.len() {
            return None;
        }
        match self.decode_at(self.pc) {
            Ok(instr) => {
                self.pc += instr.size;
                Some(Ok(instr))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn format_operand(instr: &Instruction<'_>) -> String {
    match instr.opcode {
        Opcode::Syscall => format!("{:?}", String::from_utf8_lossy(instr.operand)),
        _ if instr.operand.is_empty() => String::new(),
        _ => {
            let mut hex = String::from("0x");
            for byte in instr.operand {
                let _ = write!(hex, "{:02x}", byte);
            }
            hex
        }
    }
}

fn write_listing(
    out: &mut String,
    script: &[u8],
    functions: &[FunctionEntry],
) -> Result<(), DecodeError> {
    let instructions = Instructions::new(script).collect::<Result<Vec<_>, _>>()?;

    // First pass: collect all jump targets to determine which addresses need labels
    let jump_targets: HashSet<usize> = instructions
        .iter()
        .filter(|instr| instr.opcode != Opcode::Call)
        .filter_map(|instr| instr.jump_target())
        .collect();

    // Assign label numbers to targets (sorted for deterministic output)
    let mut sorted_targets: Vec<_> = jump_targets.into_iter().collect();
    sorted_targets.sort();
    let label_map: HashMap<usize, usize> = sorted_targets
        .into_iter()
        .enumerate()
        .map(|(i, addr)| (addr, i))
        .collect();
    let function_map: HashMap<usize, &str> = functions
        .iter()
        .map(|f| (f.offset, f.name.as_str()))
        .collect();

    // Second pass: print instructions with labels
    for instr in &instructions {
        if let Some(name) = function_map.get(&instr.offset) {
            let _ = writeln!(out, "{}:", name);
        }

        let label_prefix = label_map
            .get(&instr.offset)
            .map(|l| format!("L{}:", l))
            .unwrap_or_default();

        let operand = match instr.displacement() {
            Some(displacement) => {
                let target = instr.jump_target();
                let target_name = target
                    .and_then(|t| {
                        label_map
                            .get(&t)
                            .map(|l| format!("L{}", l))
                            .or_else(|| function_map.get(&t).map(|n| n.to_string()))
                    })
                    .unwrap_or_else(|| match target {
                        Some(t) => format!("@{}", t),
                        None => String::from("@?"),
                    });
                format!("{:+} (to {})", displacement, target_name)
            }
            None => format_operand(instr),
        };

        if operand.is_empty() {
            let _ = writeln!(out, "    {:4} {:>4}  {}", instr.offset, label_prefix, instr.opcode);
        } else {
            let _ = writeln!(
                out,
                "    {:4} {:>4}  {} {}",
                instr.offset, label_prefix, instr.opcode, operand
            );
        }
    }
    Ok(())
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code {{")?;
        writeln!(f, "  size: {}", self.script.len())?;
        writeln!(f, "  instructions:")?;
        match self.disassemble() {
            Ok(listing) => f.write_str(&listing)?,
            Err(err) => writeln!(f, "    <{}>", err)?,
        }
        write!(f, "}}")
    }
}
