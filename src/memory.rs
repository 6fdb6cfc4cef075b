//! The Memory Image: a fixed-size word array paired with an *initialized*
//! bit per word (§3, §4.E). Reading an uninitialized word is a fault; the
//! loader and the interpreter are the only writers.

use super::constants::MEM_SIZE;
use super::{Address, Word};
use std::io::{self, BufRead, Write};

/// A single memory cell: its value plus whether it has ever been written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cell {
    value: Word,
    initialized: bool,
}

pub struct Memory {
    cells: Box<[Cell; MEM_SIZE]>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            cells: Box::new([Cell::default(); MEM_SIZE]),
        }
    }

    pub fn is_initialized(&self, addr: Address) -> bool {
        self.cells[addr as usize].initialized
    }

    /// Reads a word without checking the initialized bit. Callers that must
    /// honor the uninitialized-read discipline should check
    /// [`Memory::is_initialized`] first; the interpreter does this itself.
    pub fn peek(&self, addr: Address) -> Word {
        self.cells[addr as usize].value
    }

    /// Writes a word and marks it initialized. All values are masked to 32
    /// bits by the `Word` type itself, so no further masking is needed here.
    pub fn set(&mut self, addr: Address, value: Word) {
        let cell = &mut self.cells[addr as usize];
        cell.value = value;
        cell.initialized = true;
    }

    /// Marks a cell initialized without touching its value. Used by the
    /// interpreter, which marks an instruction's destination initialized
    /// before it knows whether the instruction will actually write it.
    pub fn touch(&mut self, addr: Address) {
        self.cells[addr as usize].initialized = true;
    }

    /// Every initialized address, in ascending order, with its value.
    pub fn initialized_words(&self) -> impl Iterator<Item = (Address, Word)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.initialized)
            .map(|(addr, cell)| (addr as Address, cell.value))
    }

    /// Loads `addr value` pairs, one per line, marking each `addr`
    /// initialized. Both fields accept decimal or `0x`-prefixed hex, and a
    /// trailing colon after the address is tolerated (§6 "Loader file").
    pub fn load<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut words = line.split_whitespace();
            let addr_tok = words.next().ok_or_else(|| malformed(line))?;
            let value_tok = words.next().ok_or_else(|| malformed(line))?;

            let addr_tok = addr_tok.trim_end_matches(':');
            let addr = parse_number(addr_tok).ok_or_else(|| malformed(line))?;
            let value = parse_number(value_tok).ok_or_else(|| malformed(line))?;

            if addr as usize >= MEM_SIZE {
                return Err(malformed(line));
            }

            self.set(addr, value);
        }
        Ok(())
    }

    /// Writes every initialized address as `addr: value\n`, in ascending
    /// address order, decimal-formatted.
    pub fn dump_decimal<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (addr, value) in self.initialized_words() {
            writeln!(writer, "{}: {}", addr, value)?;
        }
        Ok(())
    }

    /// As [`Memory::dump_decimal`], but with `0x`-prefixed hex values.
    pub fn dump_hex<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (addr, value) in self.initialized_words() {
            writeln!(writer, "{}: 0x{:X}", addr, value)?;
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

fn malformed(line: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed loader line: \"{}\"", line),
    )
}

/// Parses a decimal or `0x`-prefixed hexadecimal unsigned integer (§4.A).
pub fn parse_number(text: &str) -> Option<Word> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Word::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}
