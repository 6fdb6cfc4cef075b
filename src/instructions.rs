use super::constants;
use super::Word;
use num::FromPrimitive;
use num::traits::ToPrimitive;
use num_derive::{FromPrimitive, ToPrimitive};
use util::{EnumFromStr, ParseEnumError};
use util_derive::EnumFromStr;

/// The eight opcodes VSCPU understands. Each has an immediate variant,
/// selected by bit 28 of the instruction word rather than by a distinct
/// opcode value. See [`Instruction::decode`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum Opcode {
    ADD,
    NAND,
    SRL,
    LT,
    CP,
    CPI,
    BZJ,
    MUL,
}

impl Opcode {
    /// Parses a mnemonic as written in VSCPU source, e.g. `ADD` or `CPi`.
    /// The trailing `i` (lowercase, by convention) marks the immediate
    /// variant; everything before it must name one of the eight opcodes.
    pub fn parse_mnemonic(mnemonic: &str) -> Result<(Opcode, bool), ParseEnumError> {
        if let Some(base) = mnemonic.strip_suffix('i') {
            Ok((EnumFromStr::from_str(base)?, true))
        } else {
            Ok((EnumFromStr::from_str(mnemonic)?, false))
        }
    }

    /// Renders the mnemonic the way the encoder and lowering output expect:
    /// the opcode name, suffixed with `i` when `immediate` is set.
    pub fn mnemonic(self, immediate: bool) -> String {
        let name = format!("{:?}", self);
        if immediate {
            format!("{}i", name)
        } else {
            name
        }
    }
}

/// A decoded instruction word: `op | i | arg0 | arg1`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub immediate: bool,
    pub arg0: u32,
    pub arg1: u32,
}

impl Instruction {
    pub fn new(opcode: Opcode, immediate: bool, arg0: u32, arg1: u32) -> Instruction {
        Instruction {
            opcode,
            immediate,
            arg0: arg0 & constants::ARG_MASK,
            arg1: arg1 & constants::ARG_MASK,
        }
    }

    /// Packs the instruction into its 32-bit word form:
    /// `(opcode << 29) | (immediate << 28) | (arg0 << 14) | arg1`.
    pub fn encode(self) -> Word {
        let opcode = self.opcode.to_u32().unwrap();
        (opcode << constants::OPCODE_OFFSET)
            | ((self.immediate as u32) << constants::IMMEDIATE_FLAG_OFFSET)
            | ((self.arg0 & constants::ARG_MASK) << constants::ARG0_OFFSET)
            | (self.arg1 & constants::ARG_MASK)
    }

    /// Unpacks a 32-bit instruction word. Returns `None` if the top 3 bits
    /// do not name one of the eight opcodes.
    pub fn decode(word: Word) -> Option<Instruction> {
        let opcode_value = (word & constants::OPCODE_MASK) >> constants::OPCODE_OFFSET;
        let opcode = Opcode::from_u32(opcode_value)?;
        let immediate = (word & constants::IMMEDIATE_FLAG_MASK) != 0;
        let arg0 = (word >> constants::ARG0_OFFSET) & constants::ARG_MASK;
        let arg1 = word & constants::ARG_MASK;

        Some(Instruction::new(opcode, immediate, arg0, arg1))
    }
}
