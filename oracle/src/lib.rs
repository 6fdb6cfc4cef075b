//! §4.G: the Test Oracle. Loads `tests/find.json`, locates the named case
//! (or starts a fresh one), scans a memory dump for the scratch-cell
//! "memory region" above address 16314, and records whether each `match`/
//! `no_match` value showed up there.
//!
//! Grounded on `examples/original_source/check_outs.py`: that script
//! compares `match`/`no_match` entries against the *values* captured from
//! the region, not the addresses themselves (`int(line) == int(match)`
//! where `line` is a value sliced out of the dump). This is preserved here
//! rather than reinterpreted as an address lookup, since it is the one
//! external-harness behavior spec.md §4.G actually describes in terms
//! traceable to that script.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use vscpu::memory::parse_number;
use vscpu::Word;

/// The lowest address the memory-region heuristic will start capturing at.
/// One past [`vscpu::constants::RESERVED_BASE`]'s predecessor. The region
/// begins strictly after this address.
pub const REGION_THRESHOLD: Word = 16314;
/// The heuristic stops capturing once two consecutive addresses in the
/// region are farther apart than this.
pub const REGION_GAP_LIMIT: Word = 10;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::Json(err) => write!(f, "malformed tests/find.json: {}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

/// One test case from `tests/find.json`. `found` is rewritten on every
/// run; `match`/`no_match` are supplied by the harness and never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub name: String,
    #[serde(rename = "match")]
    pub match_values: Vec<Word>,
    pub no_match: Vec<Word>,
    #[serde(default)]
    pub found: Vec<HashMap<String, String>>,
}

impl Case {
    fn fresh(name: &str) -> Case {
        Case {
            name: name.to_string(),
            match_values: Vec::new(),
            no_match: Vec::new(),
            found: Vec::new(),
        }
    }
}

/// Scans a memory dump (decimal or hex, `addr: value` per line) and
/// returns the values captured in the heuristic memory region: start at
/// the first address greater than [`REGION_THRESHOLD`], keep going while
/// consecutive addresses stay within [`REGION_GAP_LIMIT`] of each other,
/// stop at the first larger gap.
pub fn memory_region(dump: &str) -> Vec<Word> {
    let mut region = Vec::new();
    let mut prev_addr: Option<Word> = None;

    for line in dump.lines() {
        let (addr_part, value_part) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };
        let addr: Word = match addr_part.trim().parse() {
            Ok(addr) => addr,
            Err(_) => continue,
        };

        if prev_addr.is_none() {
            if addr <= REGION_THRESHOLD {
                continue;
            }
        } else if let Some(prev) = prev_addr {
            if addr > prev + REGION_GAP_LIMIT {
                break;
            }
        }

        if let Some(value) = parse_number(value_part.trim()) {
            region.push(value);
        }
        prev_addr = Some(addr);
    }

    region
}

/// Records, for each `match` value, `"1"` if it appears in `region` and
/// `"0"` otherwise.
fn record_matches(case: &mut Case, region: &[Word]) {
    for &value in &case.match_values {
        let present = region.contains(&value);
        let mut entry = HashMap::with_capacity(1);
        entry.insert(value.to_string(), if present { "1" } else { "0" }.to_string());
        case.found.push(entry);
    }
}

/// Records, for each `no_match` value, the complementary encoding: `"0"`
/// if it appears in `region` (it shouldn't have), `"1"` if it doesn't.
fn record_no_matches(case: &mut Case, region: &[Word]) {
    for &value in &case.no_match {
        let present = region.contains(&value);
        let mut entry = HashMap::with_capacity(1);
        entry.insert(value.to_string(), if present { "0" } else { "1" }.to_string());
        case.found.push(entry);
    }
}

/// Reads `find_json_path`, locates (or creates) the case named
/// `dump_name`, scans `dump` for its memory region, rewrites the case's
/// `found` list, and writes the whole array back out.
pub fn check(dump_name: &str, dump: &str, find_json_path: &Path) -> Result<Case, Error> {
    let mut cases: Vec<Case> = match fs::read_to_string(find_json_path) {
        Ok(text) if !text.trim().is_empty() => serde_json::from_str(&text)?,
        _ => Vec::new(),
    };

    let mut case = match cases.iter().position(|c| c.name == dump_name) {
        Some(idx) => cases.remove(idx),
        None => Case::fresh(dump_name),
    };

    let region = memory_region(dump);
    case.found.clear();
    record_matches(&mut case, &region);
    record_no_matches(&mut case, &region);

    cases.push(case.clone());
    fs::write(find_json_path, serde_json::to_string_pretty(&cases)?)?;

    Ok(case)
}
