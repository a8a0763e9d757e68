//! AVM Instructions - Variable-Length Byte Format
//!
//! This module defines the instruction set of the stack-based virtual machine
//! that compiled scripts run on.
//!
//! # Instruction Format
//!
//! Every instruction starts with a one-byte opcode, optionally followed by an
//! operand whose size depends on the opcode:
//! ```text
//! ┌────────────┬──────────────────────────────┐
//! │   Opcode   │  Operand (0..N bytes)        │
//! │  (8 bits)  │                              │
//! └────────────┴──────────────────────────────┘
//! ```
//!
//! - `PUSHBYTES1..PUSHBYTES75`: the opcode value itself is the payload length.
//! - `PUSHDATA1/2/4`: a 1, 2 or 4 byte little-endian length, then the payload.
//! - `JMP`, `JMPIF`, `JMPIFNOT`, `CALL`: a 2-byte little-endian signed displacement,
//!   relative to the offset of the jump opcode itself.
//! - `SYSCALL`: a 1-byte length, then the interop api name.
//! - `APPCALL`, `TAILCALL`: a 20-byte script hash.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`.
//! The VM also has an auxiliary ("alt") stack; compiled functions keep their
//! locals array on it for the duration of a call.

use core::fmt;

macro_rules! opcodes {
    ($( $(#[$doc:meta])* $name:ident = $byte:literal => $mnemonic:literal, )*) => {
        /// A single VM opcode (exactly one byte).
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Opcode {
            $( $(#[$doc])* $name = $byte, )*
        }

        impl Opcode {
            /// Assembly mnemonic, as printed by disassemblers.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Self::$name => $mnemonic, )*
                }
            }
        }

        impl TryFrom<u8> for Opcode {
            type Error = InvalidOpcode;

            fn try_from(byte: u8) -> Result<Self, Self::Error> {
                match byte {
                    $( $byte => Ok(Self::$name), )*
                    other => Err(InvalidOpcode(other)),
                }
            }
        }
    };
}

opcodes! {
    // ========================================================================
    // Constants (0x00 - 0x60)
    // ========================================================================
    /// Push an empty byte array (also the `false` / zero value)
    /// Stack: [...] -> [..., []]
    Push0 = 0x00 => "PUSH0",

    /// Push the next N bytes (N = opcode value, 1 to 75)
    /// Operand: N bytes | Stack: [...] -> [..., bytes]
    PushBytes1 = 0x01 => "PUSHBYTES1",
    PushBytes2 = 0x02 => "PUSHBYTES2",
    PushBytes3 = 0x03 => "PUSHBYTES3",
    PushBytes4 = 0x04 => "PUSHBYTES4",
    PushBytes5 = 0x05 => "PUSHBYTES5",
    PushBytes6 = 0x06 => "PUSHBYTES6",
    PushBytes7 = 0x07 => "PUSHBYTES7",
    PushBytes8 = 0x08 => "PUSHBYTES8",
    PushBytes9 = 0x09 => "PUSHBYTES9",
    PushBytes10 = 0x0A => "PUSHBYTES10",
    PushBytes11 = 0x0B => "PUSHBYTES11",
    PushBytes12 = 0x0C => "PUSHBYTES12",
    PushBytes13 = 0x0D => "PUSHBYTES13",
    PushBytes14 = 0x0E => "PUSHBYTES14",
    PushBytes15 = 0x0F => "PUSHBYTES15",
    PushBytes16 = 0x10 => "PUSHBYTES16",
    PushBytes17 = 0x11 => "PUSHBYTES17",
    PushBytes18 = 0x12 => "PUSHBYTES18",
    PushBytes19 = 0x13 => "PUSHBYTES19",
    PushBytes20 = 0x14 => "PUSHBYTES20",
    PushBytes21 = 0x15 => "PUSHBYTES21",
    PushBytes22 = 0x16 => "PUSHBYTES22",
    PushBytes23 = 0x17 => "PUSHBYTES23",
    PushBytes24 = 0x18 => "PUSHBYTES24",
    PushBytes25 = 0x19 => "PUSHBYTES25",
    PushBytes26 = 0x1A => "PUSHBYTES26",
    PushBytes27 = 0x1B => "PUSHBYTES27",
    PushBytes28 = 0x1C => "PUSHBYTES28",
    PushBytes29 = 0x1D => "PUSHBYTES29",
    PushBytes30 = 0x1E => "PUSHBYTES30",
    PushBytes31 = 0x1F => "PUSHBYTES31",
    PushBytes32 = 0x20 => "PUSHBYTES32",
    PushBytes33 = 0x21 => "PUSHBYTES33",
    PushBytes34 = 0x22 => "PUSHBYTES34",
    PushBytes35 = 0x23 => "PUSHBYTES35",
    PushBytes36 = 0x24 => "PUSHBYTES36",
    PushBytes37 = 0x25 => "PUSHBYTES37",
    PushBytes38 = 0x26 => "PUSHBYTES38",
    PushBytes39 = 0x27 => "PUSHBYTES39",
    PushBytes40 = 0x28 => "PUSHBYTES40",
    PushBytes41 = 0x29 => "PUSHBYTES41",
    PushBytes42 = 0x2A => "PUSHBYTES42",
    PushBytes43 = 0x2B => "PUSHBYTES43",
    PushBytes44 = 0x2C => "PUSHBYTES44",
    PushBytes45 = 0x2D => "PUSHBYTES45",
    PushBytes46 = 0x2E => "PUSHBYTES46",
    PushBytes47 = 0x2F => "PUSHBYTES47",
    PushBytes48 = 0x30 => "PUSHBYTES48",
    PushBytes49 = 0x31 => "PUSHBYTES49",
    PushBytes50 = 0x32 => "PUSHBYTES50",
    PushBytes51 = 0x33 => "PUSHBYTES51",
    PushBytes52 = 0x34 => "PUSHBYTES52",
    PushBytes53 = 0x35 => "PUSHBYTES53",
    PushBytes54 = 0x36 => "PUSHBYTES54",
    PushBytes55 = 0x37 => "PUSHBYTES55",
    PushBytes56 = 0x38 => "PUSHBYTES56",
    PushBytes57 = 0x39 => "PUSHBYTES57",
    PushBytes58 = 0x3A => "PUSHBYTES58",
    PushBytes59 = 0x3B => "PUSHBYTES59",
    PushBytes60 = 0x3C => "PUSHBYTES60",
    PushBytes61 = 0x3D => "PUSHBYTES61",
    PushBytes62 = 0x3E => "PUSHBYTES62",
    PushBytes63 = 0x3F => "PUSHBYTES63",
    PushBytes64 = 0x40 => "PUSHBYTES64",
    PushBytes65 = 0x41 => "PUSHBYTES65",
    PushBytes66 = 0x42 => "PUSHBYTES66",
    PushBytes67 = 0x43 => "PUSHBYTES67",
    PushBytes68 = 0x44 => "PUSHBYTES68",
    PushBytes69 = 0x45 => "PUSHBYTES69",
    PushBytes70 = 0x46 => "PUSHBYTES70",
    PushBytes71 = 0x47 => "PUSHBYTES71",
    PushBytes72 = 0x48 => "PUSHBYTES72",
    PushBytes73 = 0x49 => "PUSHBYTES73",
    PushBytes74 = 0x4A => "PUSHBYTES74",
    PushBytes75 = 0x4B => "PUSHBYTES75",

    /// Push data with a 1-byte length prefix
    /// Operand: u8 len, len bytes | Stack: [...] -> [..., bytes]
    PushData1 = 0x4C => "PUSHDATA1",
    /// Push data with a 2-byte length prefix
    PushData2 = 0x4D => "PUSHDATA2",
    /// Push data with a 4-byte length prefix
    PushData4 = 0x4E => "PUSHDATA4",

    /// Push the integer -1
    PushM1 = 0x4F => "PUSHM1",

    /// Push the integer N (1 to 16); PUSH1 doubles as `true`
    /// Stack: [...] -> [..., N]
    Push1 = 0x51 => "PUSH1",
    Push2 = 0x52 => "PUSH2",
    Push3 = 0x53 => "PUSH3",
    Push4 = 0x54 => "PUSH4",
    Push5 = 0x55 => "PUSH5",
    Push6 = 0x56 => "PUSH6",
    Push7 = 0x57 => "PUSH7",
    Push8 = 0x58 => "PUSH8",
    Push9 = 0x59 => "PUSH9",
    Push10 = 0x5A => "PUSH10",
    Push11 = 0x5B => "PUSH11",
    Push12 = 0x5C => "PUSH12",
    Push13 = 0x5D => "PUSH13",
    Push14 = 0x5E => "PUSH14",
    Push15 = 0x5F => "PUSH15",
    Push16 = 0x60 => "PUSH16",

    // ========================================================================
    // Flow Control (0x61 - 0x69)
    // ========================================================================
    /// No operation
    Nop = 0x61 => "NOP",

    /// Unconditional jump
    /// Operand: i16 displacement | Stack: [...] -> [...]
    Jmp = 0x62 => "JMP",

    /// Pop and jump if true
    /// Operand: i16 displacement | Stack: [..., cond] -> [...]
    JmpIf = 0x63 => "JMPIF",

    /// Pop and jump if false
    /// Operand: i16 displacement | Stack: [..., cond] -> [...]
    JmpIfNot = 0x64 => "JMPIFNOT",

    /// Call a function in the same script
    /// Operand: i16 displacement | Stack: [..., args] -> [..., results]
    Call = 0x65 => "CALL",

    /// Return from the current function
    Ret = 0x66 => "RET",

    /// Call another contract
    /// Operand: 20-byte script hash
    AppCall = 0x67 => "APPCALL",

    /// Call an interop service of the host
    /// Operand: u8 len, api name | Stack: [..., args] -> [..., results]
    Syscall = 0x68 => "SYSCALL",

    /// Tail call another contract
    /// Operand: 20-byte script hash
    TailCall = 0x69 => "TAILCALL",

    // ========================================================================
    // Stack (0x6A - 0x7D)
    // ========================================================================
    /// Copy the top of the alt stack onto the evaluation stack
    /// Stack: [...] -> [..., alt_top]
    DupFromAltStack = 0x6A => "DUPFROMALTSTACK",

    /// Move the top value onto the alt stack
    /// Stack: [..., a] -> [...]
    ToAltStack = 0x6B => "TOALTSTACK",

    /// Move the top of the alt stack onto the evaluation stack
    /// Stack: [...] -> [..., alt_top]
    FromAltStack = 0x6C => "FROMALTSTACK",

    /// Remove the item N back in the stack
    /// Stack: [..., n] -> [...]
    XDrop = 0x6D => "XDROP",

    /// Swap the top item with the item N back in the stack
    /// Stack: [..., aN, ..., a0, n] -> [..., a0, ..., aN]
    XSwap = 0x72 => "XSWAP",

    /// Copy the top item and insert it N back in the stack
    XTuck = 0x73 => "XTUCK",

    /// Push the number of stack items
    Depth = 0x74 => "DEPTH",

    /// Pop top value
    /// Stack: [..., a] -> [...]
    Drop = 0x75 => "DROP",

    /// Duplicate top value
    /// Stack: [..., a] -> [..., a, a]
    Dup = 0x76 => "DUP",

    /// Remove the second-to-top item
    Nip = 0x77 => "NIP",

    /// Copy the second-to-top item to the top
    Over = 0x78 => "OVER",

    /// Copy the item N back to the top
    Pick = 0x79 => "PICK",

    /// Move the item N back to the top
    /// Stack: [..., aN, ..., a0, n] -> [..., ..., a0, aN]
    Roll = 0x7A => "ROLL",

    /// Move the third item to the top
    /// Stack: [..., a, b, c] -> [..., b, c, a]
    Rot = 0x7B => "ROT",

    /// Swap top two values
    /// Stack: [..., a, b] -> [..., b, a]
    Swap = 0x7C => "SWAP",

    /// Copy the top item below the second-to-top item
    Tuck = 0x7D => "TUCK",

    // ========================================================================
    // Splice (0x7E - 0x82)
    // ========================================================================
    /// Concatenate two byte strings
    /// Stack: [..., a, b] -> [..., a ++ b]
    Cat = 0x7E => "CAT",
    Substr = 0x7F => "SUBSTR",
    Left = 0x80 => "LEFT",
    Right = 0x81 => "RIGHT",

    /// Length of a byte string
    /// Stack: [..., bytes] -> [..., len]
    Size = 0x82 => "SIZE",

    // ========================================================================
    // Bitwise Logic (0x83 - 0x87)
    // ========================================================================
    Invert = 0x83 => "INVERT",
    And = 0x84 => "AND",
    Or = 0x85 => "OR",
    Xor = 0x86 => "XOR",

    /// Structural (byte-wise) equality
    /// Stack: [..., a, b] -> [..., a == b]
    Equal = 0x87 => "EQUAL",

    // ========================================================================
    // Arithmetic (0x8B - 0xA5)
    // ========================================================================
    Inc = 0x8B => "INC",
    Dec = 0x8C => "DEC",
    Sign = 0x8D => "SIGN",
    Negate = 0x8F => "NEGATE",
    Abs = 0x90 => "ABS",
    Not = 0x91 => "NOT",
    Nz = 0x92 => "NZ",
    Add = 0x93 => "ADD",
    Sub = 0x94 => "SUB",
    Mul = 0x95 => "MUL",
    Div = 0x96 => "DIV",
    Mod = 0x97 => "MOD",
    Shl = 0x98 => "SHL",
    Shr = 0x99 => "SHR",
    BoolAnd = 0x9A => "BOOLAND",
    BoolOr = 0x9B => "BOOLOR",

    /// Numeric equality
    /// Stack: [..., a: Int, b: Int] -> [..., a == b]
    NumEqual = 0x9C => "NUMEQUAL",
    NumNotEqual = 0x9E => "NUMNOTEQUAL",
    Lt = 0x9F => "LT",
    Gt = 0xA0 => "GT",
    Lte = 0xA1 => "LTE",
    Gte = 0xA2 => "GTE",
    Min = 0xA3 => "MIN",
    Max = 0xA4 => "MAX",
    Within = 0xA5 => "WITHIN",

    // ========================================================================
    // Crypto (0xA7 - 0xAE)
    // ========================================================================
    Sha1 = 0xA7 => "SHA1",
    Sha256 = 0xA8 => "SHA256",
    Hash160 = 0xA9 => "HASH160",
    Hash256 = 0xAA => "HASH256",
    CheckSig = 0xAC => "CHECKSIG",
    Verify = 0xAD => "VERIFY",
    CheckMultiSig = 0xAE => "CHECKMULTISIG",

    // ========================================================================
    // Arrays & Structs (0xC0 - 0xCD)
    // ========================================================================
    /// Number of items in an array (or bytes in a byte string)
    ArraySize = 0xC0 => "ARRAYSIZE",

    /// Pack N items into an array
    /// Stack: [..., aN-1, ..., a0, n] -> [..., [a0, ..., aN-1]]
    Pack = 0xC1 => "PACK",
    Unpack = 0xC2 => "UNPACK",

    /// Fetch an item by index or key
    /// Stack: [..., item, key] -> [..., item[key]]
    PickItem = 0xC3 => "PICKITEM",

    /// Store an item by index or key
    /// Stack: [..., item, key, value] -> [...]
    SetItem = 0xC4 => "SETITEM",

    /// Allocate an array of N default items
    /// Stack: [..., n] -> [..., array]
    NewArray = 0xC5 => "NEWARRAY",

    /// Allocate a struct of N default items
    /// Stack: [..., n] -> [..., struct]
    NewStruct = 0xC6 => "NEWSTRUCT",
    NewMap = 0xC7 => "NEWMAP",

    /// Append an item to an array in place
    /// Stack: [..., array, item] -> [...]
    Append = 0xC8 => "APPEND",
    Reverse = 0xC9 => "REVERSE",
    Remove = 0xCA => "REMOVE",
    HasKey = 0xCB => "HASKEY",
    Keys = 0xCC => "KEYS",
    Values = 0xCD => "VALUES",

    // ========================================================================
    // Exceptions (0xF0 - 0xF1)
    // ========================================================================
    Throw = 0xF0 => "THROW",
    ThrowIfNot = 0xF1 => "THROWIFNOT",
}
static_assertions::assert_eq_size!(Opcode, u8);

/// How many operand bytes follow an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSize {
    /// A fixed number of bytes (possibly zero).
    Fixed(usize),
    /// A little-endian length of the given width, then that many bytes.
    Prefixed(usize),
}

impl Opcode {
    /// Alias of `PUSH0`.
    pub const PUSHF: Opcode = Opcode::Push0;
    /// Alias of `PUSH1`.
    pub const PUSHT: Opcode = Opcode::Push1;

    /// Size of the operand that follows this opcode.
    pub const fn operand_size(self) -> OperandSize {
        match self {
            Self::PushData1 | Self::Syscall => OperandSize::Prefixed(1),
            Self::PushData2 => OperandSize::Prefixed(2),
            Self::PushData4 => OperandSize::Prefixed(4),
            Self::Jmp | Self::JmpIf | Self::JmpIfNot | Self::Call => OperandSize::Fixed(2),
            Self::AppCall | Self::TailCall => OperandSize::Fixed(20),
            op if (op as u8) >= Self::PushBytes1 as u8 && (op as u8) <= Self::PushBytes75 as u8 => {
                OperandSize::Fixed(op as u8 as usize)
            }
            _ => OperandSize::Fixed(0),
        }
    }

    /// Whether the operand is a 2-byte displacement patched by the linker.
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jmp | Self::JmpIf | Self::JmpIfNot | Self::Call)
    }

    /// The `PUSHBYTESn` opcode for a payload of `len` bytes (1 to 75).
    pub fn push_bytes(len: usize) -> Option<Opcode> {
        match len {
            1..=75 => Opcode::try_from(len as u8).ok(),
            _ => None,
        }
    }

    /// The `PUSHn` opcode for `n` in 1 to 16.
    pub fn push_small(n: i64) -> Option<Opcode> {
        match n {
            1..=16 => Opcode::try_from(Self::Push1 as u8 + (n as u8 - 1)).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOpcode(pub u8);

impl fmt::Display for InvalidOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid opcode: 0x{:02X}", self.0)
    }
}

impl core::error::Error for InvalidOpcode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_size() {
        assert_eq!(core::mem::size_of::<Opcode>(), 1);
    }

    #[test]
    fn test_byte_values() {
        assert_eq!(Opcode::Push0 as u8, 0x00);
        assert_eq!(Opcode::PushBytes75 as u8, 0x4B);
        assert_eq!(Opcode::Push1 as u8, 0x51);
        assert_eq!(Opcode::Push16 as u8, 0x60);
        assert_eq!(Opcode::Jmp as u8, 0x62);
        assert_eq!(Opcode::DupFromAltStack as u8, 0x6A);
        assert_eq!(Opcode::PickItem as u8, 0xC3);
        assert_eq!(Opcode::ThrowIfNot as u8, 0xF1);
    }

    #[test]
    fn test_try_from_round_trips_every_opcode() {
        for byte in 0..=u8::MAX {
            if let Ok(op) = Opcode::try_from(byte) {
                assert_eq!(op as u8, byte);
            }
        }
        assert_eq!(Opcode::try_from(0x50), Err(InvalidOpcode(0x50)));
        assert_eq!(Opcode::try_from(0x6E), Err(InvalidOpcode(0x6E)));
    }

    #[test]
    fn test_operand_sizes() {
        assert_eq!(Opcode::Push0.operand_size(), OperandSize::Fixed(0));
        assert_eq!(Opcode::PushBytes1.operand_size(), OperandSize::Fixed(1));
        assert_eq!(Opcode::PushBytes75.operand_size(), OperandSize::Fixed(75));
        assert_eq!(Opcode::PushData2.operand_size(), OperandSize::Prefixed(2));
        assert_eq!(Opcode::Syscall.operand_size(), OperandSize::Prefixed(1));
        assert_eq!(Opcode::Call.operand_size(), OperandSize::Fixed(2));
        assert_eq!(Opcode::AppCall.operand_size(), OperandSize::Fixed(20));
        assert_eq!(Opcode::Add.operand_size(), OperandSize::Fixed(0));
    }

    #[test]
    fn test_small_ints() {
        assert_eq!(Opcode::push_small(1), Some(Opcode::Push1));
        assert_eq!(Opcode::push_small(16), Some(Opcode::Push16));
        assert_eq!(Opcode::push_small(17), None);
        assert_eq!(Opcode::push_bytes(20), Some(Opcode::PushBytes20));
        assert_eq!(Opcode::push_bytes(76), None);
    }

    #[test]
    fn test_jumps() {
        assert!(Opcode::Jmp.is_jump());
        assert!(Opcode::Call.is_jump());
        assert!(!Opcode::Ret.is_jump());
        assert!(!Opcode::Syscall.is_jump());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Opcode::DupFromAltStack), "DUPFROMALTSTACK");
        assert_eq!(format!("{}", Opcode::PUSHT), "PUSH1");
    }
}
