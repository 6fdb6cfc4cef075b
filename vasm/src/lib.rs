//! Assembler for the [vscpu](../vscpu/index.html) virtual machine.
//!
//! [`assemble`] takes a compiler's raw pseudo-assembly output (labeled
//! basic blocks, conditional branches, signed operands, multi-op lines)
//! and turns it into loader entries ready for [`vscpu::Memory::load`].
//!
//! The work happens in two stages. [`lower`](lowering) runs the fixed
//! thirteen-pass Lowering Pipeline (§4.C) that turns raw lines into
//! canonical, addressed VSCPU source. [`encoder`] then turns each
//! canonical line into a 32-bit instruction word or a bare data word.

pub mod encoder;
pub mod error;
pub mod lexer;
pub mod lowering;
pub mod number;

pub use encoder::LoaderEntry;
pub use error::Error;
pub use vscpu::{Instruction, Opcode};

/// Lowers and encodes a complete program, source to loader entries.
pub fn assemble(input: &str) -> Result<Vec<LoaderEntry>, Error> {
    let canonical = lowering::lower(input)?;
    let entries = encoder::encode(&canonical)?;
    Ok(entries)
}
