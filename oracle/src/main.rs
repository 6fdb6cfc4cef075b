#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum Error {
    Oracle(oracle::Error),
    Io(std::io::Error, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "reading \"{}\" failed: {}", path.display(), err),
            Error::Oracle(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("DUMP")
                .help("Memory dump file to check (its path is used as the case name)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("find")
                .long("find")
                .takes_value(true)
                .value_name("FIND_JSON")
                .default_value("tests/find.json")
                .help("JSON file of match/no_match cases to update"),
        )
        .get_matches();

    let dump_path = matches.value_of("DUMP").unwrap();
    let find_json_path = matches.value_of("find").unwrap();

    if let Err(err) = run(dump_path, find_json_path) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(dump_path: &str, find_json_path: &str) -> Result<(), Error> {
    let dump = fs::read_to_string(dump_path)
        .map_err(|err| Error::Io(err, PathBuf::from(dump_path)))?;

    let case = oracle::check(dump_path, &dump, Path::new(find_json_path)).map_err(Error::Oracle)?;

    for entry in &case.found {
        for (value, found) in entry {
            println!("{}: {}", value, found);
        }
    }

    Ok(())
}
