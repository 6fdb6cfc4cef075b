//! The driver binary's core: load a named program through the filesystem
//! layout of §6 ("Filesystem layout"), run it in batch (`q`) or interactive
//! (`r`) mode, and dump the resulting memory image.
//!
//! `main.rs` is a thin CLI wrapper; everything that touches `vscpu`/`vasm`
//! directly lives here so it can be driven from tests without a process.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use vscpu::{Memory, PauseReason, Processor, Step};

#[derive(Debug)]
pub enum Error {
    Vasm(vasm::Error),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Vasm(err) => write!(f, "Assembling input failed: {}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<vasm::Error> for Error {
    fn from(err: vasm::Error) -> Error {
        Error::Vasm(err)
    }
}

/// The four directories of the fixed filesystem layout (§6), rooted at a
/// base directory (`tests/` by default, overridable so tests don't have to
/// share the real working directory's `tests/` folder).
#[derive(Clone, Debug)]
pub struct Layout {
    results: PathBuf,
    ins: PathBuf,
    douts: PathBuf,
    houts: PathBuf,
}

impl Layout {
    pub fn new<P: AsRef<Path>>(base: P) -> Layout {
        let base = base.as_ref();
        Layout {
            results: base.join("results"),
            ins: base.join("ins"),
            douts: base.join("douts"),
            houts: base.join("houts"),
        }
    }

    fn results_path(&self, name: &str) -> PathBuf {
        self.results.join(format!("{}.asm", name))
    }

    fn ins_path(&self, name: &str) -> PathBuf {
        self.ins.join(format!("{}.in", name))
    }

    fn dout_path(&self, name: &str) -> PathBuf {
        self.douts.join(format!("{}.dout", name))
    }

    fn hout_path(&self, name: &str) -> PathBuf {
        self.houts.join(format!("{}.hout", name))
    }
}

impl Default for Layout {
    fn default() -> Layout {
        Layout::new("tests")
    }
}

/// Reads `<results>/<name>.asm`, lowers and encodes it with `vasm`, writes
/// the loader entries to `<ins>/<name>.in`, and loads them into a fresh
/// [`Memory`] (mirroring the original driver's `memgen` + `readmem` pair,
/// which always round-trips the encoded program through a file before
/// execution).
pub fn assemble_and_load(layout: &Layout, name: &str) -> Result<Memory, Error> {
    let source = fs::read_to_string(layout.results_path(name))?;
    let entries = vasm::assemble(&source)?;
    let loader_text = vasm::encoder::render_loader_text(&entries);

    let ins_path = layout.ins_path(name);
    if let Some(parent) = ins_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&ins_path, &loader_text)?;

    let mut mem = Memory::new();
    mem.load(loader_text.as_bytes())?;
    Ok(mem)
}

/// Writes the decimal and hex dumps to `<douts>/<name>.dout` and
/// `<houts>/<name>.hout`.
pub fn dump_outputs(layout: &Layout, name: &str, mem: &Memory) -> Result<(), Error> {
    let dout_path = layout.dout_path(name);
    if let Some(parent) = dout_path.parent() {
        fs::create_dir_all(parent)?;
    }
    mem.dump_decimal(fs::File::create(&dout_path)?)?;

    let hout_path = layout.hout_path(name);
    if let Some(parent) = hout_path.parent() {
        fs::create_dir_all(parent)?;
    }
    mem.dump_hex(fs::File::create(&hout_path)?)?;

    Ok(())
}

/// The two run modes of §6: `Batch` ("q") stops at the first pause and
/// never prompts; `Interactive` ("r") prompts the driver for recovery input
/// on every pause, the way the original's `>>>` REPL did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Batch,
    Interactive,
}

/// Steps the machine to completion under `mode`. Every pause is reported
/// on `output` first (§7's uninitialized-read diagnostic); in `Interactive`
/// mode the driver then prompts on `output` and reads `addr value` pairs
/// (or `exit`) from `input`, exactly as the original's `VALIDARGS`-gated
/// REPL loop did, reusing [`Memory::load`]'s own line grammar to validate
/// what was typed instead of re-deriving it.
pub fn run<R: BufRead, W: Write>(
    mem: &mut Memory,
    mode: Mode,
    mut input: R,
    mut output: W,
) -> io::Result<Step> {
    let mut proc = Processor::new();
    loop {
        let step = proc.step(mem);
        match step {
            Step::Continue => continue,
            Step::Halted => return Ok(step),
            Step::Paused(reason) => {
                report_pause(reason, &mut output)?;
                if mode == Mode::Batch {
                    return Ok(step);
                }
                if !recover_interactively(&mut proc, mem, &mut input, &mut output)? {
                    return Ok(step);
                }
            }
        }
    }
}

fn report_pause<W: Write>(reason: PauseReason, output: &mut W) -> io::Result<()> {
    if let PauseReason::UninitializedRead(addr) = reason {
        writeln!(output, "Accessed garbage data at mem[{}]", addr)?;
    }
    Ok(())
}

/// Prompts until the driver either supplies a valid `addr value` pair
/// (returns `true`, having resumed `proc`) or types `exit` / closes its
/// input (returns `false`).
fn recover_interactively<R: BufRead, W: Write>(
    proc: &mut Processor,
    mem: &mut Memory,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    loop {
        write!(output, ">>> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        let line = line.trim();
        if line == "exit" {
            return Ok(false);
        }

        match mem.load(line.as_bytes()) {
            Ok(()) => {
                proc.resume();
                return Ok(true);
            }
            Err(_) => writeln!(output, "Unexpected input")?,
        }
    }
}
