use std::env;
use std::fs;
use std::io::{self, Write};

use anyhow::Error;
use clap::{App, AppSettings};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use bfsat::archive::{ArchiveEntry, ArchiveParser};
use bfsat::solver::Solver;

mod config;
mod trials;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("BFSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is bfsat {}", env!("CARGO_PKG_VERSION"));
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("bfsat")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .setting(AppSettings::ArgsNegateSubcommands)
        .setting(AppSettings::VersionlessSubcommands)
        .arg_from_usage("[INPUT] 'The archive or DIMACS CNF file to check (stdin if omitted)'")
        .subcommand(trials::trials_args())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("trials") {
        return trials::trials_main(matches);
    }

    init_logging();
    banner();

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    let mut tally = Tally::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    ArchiveParser::parse_incremental(file, |parser| {
        for entry in parser.take_entries() {
            solve_entry(&entry, &mut tally, &mut out)?;
        }
        Ok(())
    })?;

    Ok(tally.exit_code())
}

/// Results of all formulas of the input.
#[derive(Default)]
struct Tally {
    satisfiable: usize,
    unsatisfiable: usize,
    mismatches: usize,
}

impl Tally {
    fn exit_code(&self) -> i32 {
        if self.mismatches > 0 {
            1
        } else if self.unsatisfiable == 0 && self.satisfiable > 0 {
            10
        } else if self.satisfiable == 0 && self.unsatisfiable > 0 {
            20
        } else {
            0
        }
    }
}

fn solve_entry(
    entry: &ArchiveEntry,
    tally: &mut Tally,
    out: &mut impl Write,
) -> Result<(), Error> {
    if let Some(tag) = entry.tag {
        writeln!(out, "c problem {}", tag.problem_id)?;
    }

    let mut solver = Solver::new();
    solver.add_formula(&entry.formula);

    let satisfied = solver.solve()?;

    if satisfied {
        tally.satisfiable += 1;
        writeln!(out, "s SATISFIABLE")?;
        write!(out, "v")?;
        for lit in solver.model().unwrap_or_default() {
            write!(out, " {}", lit)?;
        }
        writeln!(out, " 0")?;
    } else {
        tally.unsatisfiable += 1;
        writeln!(out, "s UNSATISFIABLE")?;
    }

    if let Some(tag) = entry.tag {
        if let Some(expected) = tag.result.satisfied() {
            if expected != satisfied {
                tally.mismatches += 1;
                error!(
                    "problem {}: archive records {} but the formula is {}",
                    tag.problem_id,
                    tag.result,
                    if satisfied {
                        "satisfiable"
                    } else {
                        "unsatisfiable"
                    }
                );
            }
        }
    }

    Ok(())
}
