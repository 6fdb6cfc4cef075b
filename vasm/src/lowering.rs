//! §4.C: the Lowering Pipeline. Thirteen text-to-text passes, each pure
//! (`Vec<String> -> Vec<String>`, bar the two that thread the block-name
//! map), run in a fixed order that is load-bearing.

use crate::error::LowerError;
use crate::lexer::{block_label, is_block_header_line, is_block_ref};
use crate::number::parse_signed;
use std::collections::HashMap;
use vscpu::constants;

const NOISE: [&str; 4] = [".cfi", ".size", ".ident", ".section"];
const UNSUPPORTED_OPS: [&str; 5] = ["nop", "ret", "restore", "call", "savei"];
const BRANCH_MNEMONICS: [&str; 6] = ["bg", "bge", "bl", "ble", "be", "bne"];

/// Runs the raw compiler output through all thirteen passes and returns the
/// canonical, addressed VSCPU source (`addr: MNEM a b` / `addr: value`
/// lines), ready for the encoder.
pub fn lower(input: &str) -> Result<Vec<String>, LowerError> {
    let lines: Vec<String> = input.lines().map(|l| l.to_string()).collect();

    let lines = skip_header(lines);
    let lines = strip_line_numbers(lines);
    let lines = drop_noise(lines);
    let lines = divide_multi_op_lines(lines);
    let lines = drop_unsupported(lines);
    let lines = collapse_adjacent_block_headers(lines);
    let lines = rewrite_high_level(lines);
    let lines = lower_negative_literals(lines);
    let lines = lower_conditional_branches(lines);
    let (lines, labels) = number_blocks(lines);
    let lines = resolve_block_references(lines, &labels)?;
    let lines = prefix_addresses(lines);
    let lines = append_static_lines(lines);

    Ok(lines)
}

/// Pass 1: drop everything up to and including the first line that begins
/// with the digit `0` (the compiler's banner text).
fn skip_header(lines: Vec<String>) -> Vec<String> {
    let mut iter = lines.into_iter();
    for line in iter.by_ref() {
        if line.starts_with('0') {
            break;
        }
    }
    iter.collect()
}

/// Pass 2: remove a leading `^[0-9]+:` from each line.
fn strip_line_numbers(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            let digits_end = line
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(line.len());
            if digits_end > 0 && line[digits_end..].starts_with(':') {
                line[digits_end + 1..].to_string()
            } else {
                line
            }
        })
        .collect()
}

/// Pass 3: drop assembler-directive noise and blank lines.
fn drop_noise(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !NOISE.iter().any(|noise| line.contains(noise)))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Pass 4: a line with 1 or 3 words passes through. A line with 6 or more
/// words, a multiple of three, not starting a block, is split into
/// tab-indented three-word lines.
fn divide_multi_op_lines(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        let words: Vec<&str> = line.split_whitespace().collect();
        let n = words.len();
        let starts_block = line.trim_start().starts_with('.') || line.trim_start().starts_with('!');
        if n >= 6 && n % 3 == 0 && !starts_block {
            for chunk in words.chunks(3) {
                out.push(format!("\t{}", chunk.join(" ")));
            }
        } else {
            out.push(line);
        }
    }
    out
}

/// Pass 5: drop lines beginning `\t-` or `\t\\`, and lines whose opcode is
/// one of the unmodeled pseudo-ops.
fn drop_unsupported(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| {
            if line.starts_with("\t-") || line.starts_with("\t\\") {
                return false;
            }
            let first = line
                .trim_start_matches('\t')
                .split_whitespace()
                .next()
                .unwrap_or("");
            !UNSUPPORTED_OPS.contains(&first)
        })
        .collect()
}

/// Pass 6: when two consecutive lines are both block headers, keep only
/// the later one. This is the "collapsed-label bug": the earlier label's
/// name is simply gone, and pass 11 turns any reference to it into an
/// error rather than silently resolving to the wrong address.
fn collapse_adjacent_block_headers(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in lines {
        if is_block_header_line(&line) {
            if let Some(last) = out.last() {
                if is_block_header_line(last) {
                    out.pop();
                }
            }
        }
        out.push(line);
    }
    out
}

/// Pass 7: `mov b, a` (the compiler always writes the source operand
/// first, with a trailing comma) becomes `CPi a b`; a `CPI` that
/// dereferences the frame anchor always resolves to itself, so it
/// collapses to a plain `CP`.
fn rewrite_high_level(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() < 3 {
                return line;
            }
            match words[0] {
                "mov" => {
                    let src = words[1].trim_end_matches(',');
                    let dst = words[2];
                    format!("CPi {} {}", dst, src)
                }
                "CPI" if words[2] == "16349" => format!("CP {} {}", words[1], words[2]),
                _ => line,
            }
        })
        .collect()
}

/// Pass 8: a three-word instruction whose third operand is a negative
/// literal `-v` is replaced with three lines that stash `v` in scratch,
/// negate it via `MUL` against the constant `-1` cell, then re-issue the
/// original opcode (stripped of its immediate suffix) against the scratch
/// cell instead of the literal.
fn lower_negative_literals(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .flat_map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() != 3 {
                return vec![line];
            }
            match parse_signed(words[2]) {
                Some(v) if v < 0 => {
                    let magnitude = (-(v as i64)) as u32;
                    let mnemonic = &words[0][..words[0].len().saturating_sub(1)];
                    vec![
                        format!("CPi {} {}", constants::NEGATE_SCRATCH_ADDR, magnitude),
                        format!("MUL {} {}", constants::NEGATE_SCRATCH_ADDR, constants::NEG_ONE_ADDR),
                        format!("{} {} {}", mnemonic, words[1], constants::NEGATE_SCRATCH_ADDR),
                    ]
                }
                _ => vec![line],
            }
        })
        .collect()
}

/// Pass 9: `bg|bge|bl|ble|be|bne target` becomes the `NAND`/`BZJ`/`ADD`
/// sequence that reads the preceding comparison's scratch cells (16317
/// holds zero iff `a >= b`; 16318 holds zero iff `a <= b`).
fn lower_conditional_branches(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .flat_map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() || !BRANCH_MNEMONICS.contains(&words[0]) {
                return vec![line];
            }
            let target = words.get(1).copied().unwrap_or("");
            match words[0] {
                "bg" => vec![
                    "NAND 16318 16318".to_string(),
                    format!("BZJ {} 16318", target),
                ],
                "bge" => vec![format!("BZJ {} 16317", target)],
                "bl" => vec![
                    "NAND 16317 16317".to_string(),
                    format!("BZJ {} 16317", target),
                ],
                "ble" => vec![format!("BZJ {} 16318", target)],
                "be" => vec![
                    "ADD 16317 16318".to_string(),
                    format!("BZJ {} 16317", target),
                ],
                "bne" => vec![
                    "ADD 16317 16318".to_string(),
                    "NAND 16317 16317".to_string(),
                    format!("BZJ {} 16317", target),
                ],
                _ => unreachable!(),
            }
        })
        .collect()
}

/// Pass 10: each block header expands into an unconditional forwarding
/// jump plus a one-word landing pad holding the address of whatever
/// follows it; the label is mapped to the landing pad's own address, so
/// any other `BZJ` that later references it dereferences the pad to reach
/// real code.
fn number_blocks(lines: Vec<String>) -> (Vec<String>, HashMap<String, u32>) {
    let mut counter: u32 = 0;
    let mut out = Vec::new();
    let mut labels = HashMap::new();

    for line in lines {
        if is_block_header_line(&line) {
            let n = counter;
            out.push(format!("BZJi {} 0", n + 1));
            labels.insert(block_label(&line), n + 1);
            out.push(format!("{}", n + 2));
            counter += 2;
        } else {
            out.push(line);
            counter += 1;
        }
    }

    (out, labels)
}

/// Pass 11: substitute every block-reference token that appears in the
/// label map with its numeric address. A reference to a label the
/// collapsed-header pass ate is a fatal error.
fn resolve_block_references(
    lines: Vec<String>,
    labels: &HashMap<String, u32>,
) -> Result<Vec<String>, LowerError> {
    lines
        .into_iter()
        .map(|line| {
            let resolved: Result<Vec<String>, LowerError> = line
                .split_whitespace()
                .map(|word| {
                    if is_block_ref(word) {
                        labels
                            .get(word)
                            .map(|addr| addr.to_string())
                            .ok_or_else(|| LowerError::UnresolvedLabel {
                                label: word.to_string(),
                                line: line.clone(),
                            })
                    } else {
                        Ok(word.to_string())
                    }
                })
                .collect();
            resolved.map(|words| words.join(" "))
        })
        .collect()
}

/// Pass 12: prefix every line with its 0-based position in the list.
fn prefix_addresses(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| format!("{}: {}", i, line))
        .collect()
}

/// Pass 13: append the three reserved-address initializers the loader
/// expects to find already set (§3).
fn append_static_lines(mut lines: Vec<String>) -> Vec<String> {
    lines.push(format!("{}: {}", constants::NEG_ONE_ADDR, 0xFFFFFFFFu32));
    lines.push(format!("{}: {}", constants::ZERO_ADDR, 0));
    lines.push(format!(
        "{}: {}",
        constants::FRAME_ANCHOR_ADDR,
        constants::FRAME_ANCHOR_VALUE
    ));
    lines
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skip_header_drops_banner_through_first_zero_line() {
        let lines = vec![
            "banner".to_string(),
            "more banner".to_string(),
            "0: foo".to_string(),
            "1: bar".to_string(),
        ];
        assert_eq!(skip_header(lines), vec!["1: bar".to_string()]);
    }

    #[test]
    fn strip_line_numbers_removes_prefix_only() {
        let lines = vec!["12:\tADD 5 6".to_string(), "no prefix".to_string()];
        assert_eq!(
            strip_line_numbers(lines),
            vec!["\tADD 5 6".to_string(), "no prefix".to_string()]
        );
    }

    #[test]
    fn drop_noise_removes_directives_and_blanks() {
        let lines = vec![
            "\t.cfi_startproc".to_string(),
            "".to_string(),
            "   ".to_string(),
            "ADD 5 6".to_string(),
        ];
        assert_eq!(drop_noise(lines), vec!["ADD 5 6".to_string()]);
    }

    #[test]
    fn divide_multi_op_lines_splits_sixtuples() {
        let lines = vec!["ADD 1 2 NAND 3 4".to_string()];
        assert_eq!(
            divide_multi_op_lines(lines),
            vec!["\tADD 1 2".to_string(), "\tNAND 3 4".to_string()]
        );
    }

    #[test]
    fn divide_multi_op_lines_leaves_block_headers_alone() {
        let lines = vec![".L1: a b c d e f".to_string()];
        assert_eq!(divide_multi_op_lines(lines.clone()), lines);
    }

    #[test]
    fn drop_unsupported_filters_pseudo_ops_and_dashes() {
        let lines = vec![
            "\t-4".to_string(),
            "nop".to_string(),
            "ADD 5 6".to_string(),
        ];
        assert_eq!(drop_unsupported(lines), vec!["ADD 5 6".to_string()]);
    }

    #[test]
    fn collapse_keeps_latter_of_adjacent_headers() {
        let lines = vec![".L1:".to_string(), ".L2:".to_string(), "ADD 5 6".to_string()];
        assert_eq!(
            collapse_adjacent_block_headers(lines),
            vec![".L2:".to_string(), "ADD 5 6".to_string()]
        );
    }

    #[test]
    fn rewrite_mov_swaps_operand_order() {
        let lines = vec!["mov 7, 100".to_string()];
        assert_eq!(rewrite_high_level(lines), vec!["CPi 100 7".to_string()]);
    }

    #[test]
    fn rewrite_cpi_of_frame_anchor_becomes_cp() {
        let lines = vec!["CPI 5 16349".to_string()];
        assert_eq!(rewrite_high_level(lines), vec!["CP 5 16349".to_string()]);
    }

    #[test]
    fn lower_negative_literal_emits_three_lines() {
        let lines = vec!["ADDi 5 -7".to_string()];
        let lowered = lower_negative_literals(lines);
        assert_eq!(
            lowered,
            vec![
                "CPi 16315 7".to_string(),
                "MUL 16315 16316".to_string(),
                "ADD 5 16315".to_string(),
            ]
        );
    }

    #[test]
    fn lower_negative_literal_passes_through_positive() {
        let lines = vec!["ADDi 5 7".to_string()];
        assert_eq!(lower_negative_literals(lines.clone()), lines);
    }

    #[test]
    fn lower_branch_bl_expands_to_nand_and_bzj() {
        let lines = vec!["bl .L1".to_string()];
        assert_eq!(
            lower_conditional_branches(lines),
            vec!["NAND 16317 16317".to_string(), "BZJ .L1 16317".to_string()]
        );
    }

    #[test]
    fn number_blocks_maps_label_to_landing_pad_address() {
        let lines = vec![".L1:".to_string(), "ADD 5 6".to_string()];
        let (out, labels) = number_blocks(lines);
        assert_eq!(
            out,
            vec!["BZJi 1 0".to_string(), "2".to_string(), "ADD 5 6".to_string()]
        );
        assert_eq!(labels.get(".L1"), Some(&1));
    }

    #[test]
    fn resolve_block_references_substitutes_known_labels() {
        let mut labels = HashMap::new();
        labels.insert(".L1".to_string(), 7u32);
        let lines = vec!["BZJ .L1 16317".to_string()];
        assert_eq!(
            resolve_block_references(lines, &labels).unwrap(),
            vec!["BZJ 7 16317".to_string()]
        );
    }

    #[test]
    fn resolve_block_references_errors_on_unknown_label() {
        let labels = HashMap::new();
        let lines = vec!["BZJ .L1 16317".to_string()];
        assert!(resolve_block_references(lines, &labels).is_err());
    }

    #[test]
    fn full_pipeline_lowers_identity_program() {
        let input = "banner\n0:skip this line\n1:CP 100 42\n2:\tBZJi .SELF 0\n.SELF:\n";
        let out = lower(input).unwrap();
        assert_eq!(out[0], "0: CP 100 42");
        assert!(out.iter().any(|l| l.starts_with("16316: ")));
        assert!(out.iter().any(|l| l.starts_with("16319: ")));
        assert!(out.iter().any(|l| l.starts_with("16349: ")));
    }
}
