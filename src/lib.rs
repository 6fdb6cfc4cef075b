extern crate num;
#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod instructions;
pub mod memory;
pub mod processor;

/// VSCPU's only data type: an unsigned 32-bit word. All arithmetic on it
/// wraps modulo 2^32.
pub type Word = u32;

/// A memory address. Only the low 14 bits are ever significant; values are
/// masked to that range wherever they are decoded from an instruction word.
pub type Address = u32;

pub use instructions::{Instruction, Opcode};
pub use memory::Memory;
pub use processor::{PauseReason, Processor, State, Step};

#[cfg(test)]
mod test;
