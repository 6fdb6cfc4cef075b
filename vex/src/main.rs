#[macro_use]
extern crate clap;

use clap::Arg;
use std::io::{self, BufRead, Write};

use vex::{Layout, Mode};

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("NAME")
                .help("Test name; loads tests/results/<NAME>.asm")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("MODE")
                .help("'r' runs interactively, 'q' runs to pause and exits")
                .possible_values(&["r", "q"])
                .index(2),
        )
        .get_matches();

    let name = matches.value_of("NAME").unwrap();
    let mode_arg = matches.value_of("MODE");

    if let Err(err) = drive(name, mode_arg) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn drive(name: &str, mode_arg: Option<&str>) -> Result<(), vex::Error> {
    println!("Processing:  {}", name);

    let layout = Layout::default();
    let mut mem = vex::assemble_and_load(&layout, name)?;

    let stdin = io::stdin();
    let mut cmd = mode_arg.map(str::to_string);
    while cmd.as_deref() != Some("q") && cmd.as_deref() != Some("r") {
        println!("\nProgram parsed successfully.");
        println!("Enter 'r' to run 'q' to quit");
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        cmd = Some(line.trim().to_string());
    }

    let mode = if cmd.as_deref() == Some("q") {
        Mode::Batch
    } else {
        Mode::Interactive
    };

    let stdout = io::stdout();
    let step = vex::run(&mut mem, mode, stdin.lock(), stdout.lock())?;

    if step == vscpu::Step::Halted {
        eprintln!("New PC is outside memory bounds. Exiting...");
    }

    vex::dump_outputs(&layout, name, &mem)?;
    io::stdout().flush()?;
    Ok(())
}
