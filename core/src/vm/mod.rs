mod code;
mod instruction_set;

pub use code::{Code, DecodeError, FunctionEntry, Instruction, Instructions};
pub use instruction_set::{InvalidOpcode, Opcode, OperandSize};
