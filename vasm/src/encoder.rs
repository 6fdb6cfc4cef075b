//! §4.D: turns each canonical, addressed line the lowering pipeline
//! produces into a loader entry. Either a bare data word, or a 32-bit
//! instruction word packed from its three tokens.

use crate::error::EncodeError;
use crate::number::parse_unsigned;
use vscpu::{Instruction, Opcode};

/// One `addr value` pair, ready to be written to a loader file or fed
/// straight into [`vscpu::Memory::load`].
pub type LoaderEntry = (u32, u32);

/// Encodes every line, in order. A single malformed or unencodable line
/// aborts the whole assembly. The encoder never emits a partial image.
pub fn encode(lines: &[String]) -> Result<Vec<LoaderEntry>, EncodeError> {
    lines.iter().map(|line| encode_line(line)).collect()
}

fn encode_line(line: &str) -> Result<LoaderEntry, EncodeError> {
    let (addr_part, rest) = line
        .split_once(':')
        .ok_or_else(|| EncodeError::Malformed(line.to_string()))?;
    let addr: u32 = addr_part
        .trim()
        .parse()
        .map_err(|_| EncodeError::Malformed(line.to_string()))?;

    let words: Vec<&str> = rest.split_whitespace().collect();
    match words.len() {
        1 => {
            let value =
                parse_unsigned(words[0]).ok_or_else(|| EncodeError::Malformed(line.to_string()))?;
            Ok((addr, value))
        }
        3 => {
            let (opcode, immediate) = Opcode::parse_mnemonic(words[0])
                .map_err(|_| EncodeError::UnknownMnemonic(words[0].to_string()))?;
            let a = parse_unsigned(words[1]).ok_or_else(|| EncodeError::Malformed(line.to_string()))?;
            let b = parse_unsigned(words[2]).ok_or_else(|| EncodeError::Malformed(line.to_string()))?;
            let instr = Instruction::new(opcode, immediate, a, b);
            Ok((addr, instr.encode()))
        }
        _ => Err(EncodeError::Malformed(line.to_string())),
    }
}

/// Renders loader entries as the plain-text `addr value` form
/// [`vscpu::Memory::load`] reads, one pair per line, hex-formatted.
pub fn render_loader_text(entries: &[LoaderEntry]) -> String {
    let mut out = String::new();
    for (addr, value) in entries {
        out.push_str(&format!("{} 0x{:X}\n", addr, value));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encodes_data_line() {
        let lines = vec!["16316: 4294967295".to_string()];
        assert_eq!(encode(&lines).unwrap(), vec![(16316, 0xFFFFFFFF)]);
    }

    #[test]
    fn encodes_instruction_line() {
        let lines = vec!["0: CP 100 42".to_string()];
        let entries = encode(&lines).unwrap();
        let instr = Instruction::new(Opcode::CP, false, 100, 42);
        assert_eq!(entries, vec![(0, instr.encode())]);
    }

    #[test]
    fn encodes_immediate_instruction_line() {
        let lines = vec!["3: BZJi 1 0".to_string()];
        let entries = encode(&lines).unwrap();
        let instr = Instruction::new(Opcode::BZJ, true, 1, 0);
        assert_eq!(entries, vec![(3, instr.encode())]);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let lines = vec!["0: FOO 1 2".to_string()];
        assert!(matches!(encode(&lines), Err(EncodeError::UnknownMnemonic(_))));
    }

    #[test]
    fn rejects_malformed_line() {
        let lines = vec!["not a canonical line".to_string()];
        assert!(encode(&lines).is_err());
    }

    #[test]
    fn loader_text_round_trips_through_memory_load() {
        let entries = vec![(100u32, 42u32), (16316, 0xFFFFFFFF)];
        let text = render_loader_text(&entries);
        let mut mem = vscpu::Memory::new();
        mem.load(text.as_bytes()).unwrap();
        assert_eq!(mem.peek(100), 42);
        assert_eq!(mem.peek(16316), 0xFFFFFFFF);
    }
}
