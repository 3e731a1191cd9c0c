use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Error};
use clap::{values_t, App, Arg, ArgMatches, SubCommand};
use log::info;

use bfsat::archive::{write_entry, ArchiveEntry, EntryTag, ResultTag};
use bfsat::generate::generate;
use bfsat::check_from_zero;

use crate::config::{HarnessConfig, HarnessConfigUpdate};

use super::{banner, init_logging};

mod report;

use report::{result_row, summary_row, CaseSummary};

/// Measurement of a single trial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub var_count: usize,
    pub elapsed: Duration,
    pub satisfied: bool,
}

pub fn trials_args() -> App<'static, 'static> {
    SubCommand::with_name("trials")
        .about("Generate random formulas, check them and record timings")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'bfsat trials -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
}

pub fn trials_main(matches: &ArgMatches) -> Result<i32, Error> {
    if values_t!(matches, "config-option", String)
        .unwrap_or_default()
        .iter()
        .any(|option| option == "help")
    {
        print!("{}", HarnessConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let config = harness_config(matches)?;

    let start = Instant::now();
    let samples = run_to_files(&config)?;

    info!(
        "Checked {} formulas in {:.3}s",
        samples.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(0)
}

/// Combine the defaults with the configuration file and all `-C` options, in that order.
fn harness_config(matches: &ArgMatches) -> Result<HarnessConfig, Error> {
    let mut config_update = HarnessConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)
            .with_context(|| format!("cannot open config file '{}'", config_path))?
            .read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in values_t!(matches, "config-option", String).unwrap_or_default() {
        config_update.merge(toml::from_str(&config_option)?);
    }

    let mut config = HarnessConfig::default();
    config.apply(&config_update);
    config.validate()?;
    Ok(config)
}

/// Run all trials, writing to the files named in the configuration.
pub fn run_to_files(config: &HarnessConfig) -> Result<Vec<Sample>, Error> {
    info!("Writing results to '{}'", config.results_file.display());
    info!("Writing trace to '{}'", config.trace_file.display());
    info!("Writing formulas to '{}'", config.archive_file.display());

    let mut results = create_output(&config.results_file)?;
    let mut trace = create_output(&config.trace_file)?;
    let mut archive = create_output(&config.archive_file)?;

    let samples = run_cases(config, &mut results, &mut trace, &mut archive)?;

    results.flush()?;
    trace.flush()?;
    archive.flush()?;

    Ok(samples)
}

fn create_output(path: &Path) -> Result<io::BufWriter<fs::File>, Error> {
    let file =
        fs::File::create(path).with_context(|| format!("cannot create '{}'", path.display()))?;
    Ok(io::BufWriter::new(file))
}

/// Generate and check the formulas of every case.
///
/// Problem ids count up from `first_problem` across all cases and seed the generator, so a run
/// is reproducible apart from its timings.
pub fn run_cases(
    config: &HarnessConfig,
    results: &mut impl Write,
    trace: &mut impl Write,
    archive: &mut impl Write,
) -> Result<Vec<Sample>, Error> {
    let mut samples = vec![];
    let mut problem_id = config.first_problem;
    let mut sat_total = 0;
    let mut unsat_total = 0;

    if !config.show_answer {
        info!("S/U will not be shown in the archive, tags use ?");
    }

    for (case_index, case) in config.cases.iter().enumerate() {
        info!(
            "Case {}: {} trials, {} variables, {} clauses, {} literals per clause",
            case_index + 1,
            case.trials,
            case.var_count,
            case.clause_count,
            case.lits_per_clause
        );

        let params = case.params();
        let mut summary = CaseSummary::default();

        for _ in 0..case.trials {
            let formula = generate(&params, problem_id)?;

            let start = Instant::now();
            let outcome = check_from_zero(&formula, case.var_count)?;
            let elapsed = start.elapsed();

            let elapsed_us = elapsed.as_micros() as u64;
            summary.record(outcome.satisfied, elapsed_us);

            let row = result_row(problem_id, case, &outcome, elapsed_us);
            info!("{}", row);
            writeln!(results, "{}", row)?;
            writeln!(trace, "{}", row)?;

            let result = if config.show_answer {
                ResultTag::from_result(outcome.satisfied)
            } else {
                ResultTag::Unknown
            };
            let tag = EntryTag {
                problem_id,
                lits_per_clause: case.lits_per_clause,
                result,
            };
            write_entry(archive, &ArchiveEntry::new(tag, formula))?;

            samples.push(Sample {
                var_count: case.var_count,
                elapsed,
                satisfied: outcome.satisfied,
            });
            problem_id += 1;
        }

        for line in summary.lines().iter() {
            info!("{}", line);
            writeln!(trace, "{}", line)?;
        }

        sat_total += summary.sat_count();
        unsat_total += summary.unsat_count();
    }

    writeln!(
        results,
        "{}",
        summary_row(&config.archive_name(), samples.len(), sat_total, unsat_total)
    )?;

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    use bfsat::archive::ArchiveParser;
    use bfsat::generate::GeneratorParams;

    use crate::config::TrialCase;

    fn small_config() -> HarnessConfig {
        HarnessConfig {
            cases: vec![TrialCase::from([3, 5, 2, 3]), TrialCase::from([2, 6, 1, 2])],
            first_problem: 7,
            ..HarnessConfig::default()
        }
    }

    fn lines(output: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(output)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn writes_rows_summaries_and_archive() -> Result<(), Error> {
        let config = small_config();

        let mut results: Vec<u8> = vec![];
        let mut trace: Vec<u8> = vec![];
        let mut archive: Vec<u8> = vec![];

        let samples = run_cases(&config, &mut results, &mut trace, &mut archive)?;

        assert_eq!(samples.len(), 5);
        assert_eq!(
            samples.iter().map(|s| s.var_count).collect::<Vec<_>>(),
            vec![3, 3, 3, 2, 2]
        );

        let results = lines(&results);
        assert_eq!(results.len(), 6);
        for (row, id) in results[..5].iter().zip(7..) {
            assert!(row.starts_with(&format!("{},", id)));
        }
        assert!(results[0].starts_with("7,3,5,2,10,"));
        assert!(results[3].starts_with("10,2,6,1,6,"));

        let sat = samples.iter().filter(|s| s.satisfied).count();
        assert_eq!(
            results[5],
            format!("cnffile,TheBoss,5,{},{},5,5", sat, 5 - sat)
        );

        let trace = lines(&trace);
        assert_eq!(trace.len(), 5 + 2 * 3);
        assert_eq!(trace[..3], results[..3]);
        assert!(trace[3].starts_with("# Satisfied = "));
        assert!(trace[4].starts_with("Max Sat Time = "));
        assert!(trace[5].starts_with("Ave Sat Time = "));
        assert_eq!(trace[6..8], results[3..5]);

        let entries = ArchiveParser::parse(&archive[..])?;
        assert_eq!(entries.len(), 5);
        for ((entry, sample), id) in entries.iter().zip(samples.iter()).zip(7..) {
            let tag = entry.tag.unwrap();
            assert_eq!(tag.problem_id, id);
            assert_eq!(tag.result, ResultTag::from_result(sample.satisfied));

            let case = if id < 10 { config.cases[0] } else { config.cases[1] };
            assert_eq!(tag.lits_per_clause, case.lits_per_clause);
            assert_eq!(entry.formula, generate(&case.params(), id)?);
        }

        Ok(())
    }

    #[test]
    fn satisfiable_rows_carry_the_assignment() -> Result<(), Error> {
        let config = HarnessConfig {
            cases: vec![TrialCase::from([4, 0, 3, 1])],
            ..HarnessConfig::default()
        };

        let mut results: Vec<u8> = vec![];
        run_cases(&config, &mut results, &mut io::sink(), &mut io::sink())?;

        let results = lines(&results);
        let fields: Vec<_> = results[0].split(',').collect();
        assert_eq!(fields[..7], ["3", "4", "0", "3", "0", "S", "1"]);
        assert_eq!(fields[8..], ["1", "0", "0", "0"]);
        assert_eq!(results[1], "cnffile,TheBoss,1,1,0,1,1");

        Ok(())
    }

    #[test]
    fn hidden_answers() -> Result<(), Error> {
        let config = HarnessConfig {
            show_answer: false,
            ..small_config()
        };

        let mut archive: Vec<u8> = vec![];
        run_cases(&config, &mut io::sink(), &mut io::sink(), &mut archive)?;

        let entries = ArchiveParser::parse(&archive[..])?;
        assert!(entries
            .iter()
            .all(|entry| entry.tag.map(|tag| tag.result) == Some(ResultTag::Unknown)));

        Ok(())
    }

    #[test]
    fn same_config_same_formulas() -> Result<(), Error> {
        let config = small_config();

        let mut first: Vec<u8> = vec![];
        let mut second: Vec<u8> = vec![];
        run_cases(&config, &mut io::sink(), &mut io::sink(), &mut first)?;
        run_cases(&config, &mut io::sink(), &mut io::sink(), &mut second)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn config_from_file_and_options() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("trials.toml");
        let archive_path = dir.path().join("wffs.cnf");

        let mut config_file = fs::File::create(&config_path)?;
        writeln!(config_file, "cases = [[3, 4, 2, 2]]")?;
        writeln!(config_file, "first_problem = 1")?;
        writeln!(
            config_file,
            "results_file = {:?}",
            dir.path().join("results.csv").display().to_string()
        )?;
        writeln!(
            config_file,
            "trace_file = {:?}",
            dir.path().join("trace.csv").display().to_string()
        )?;
        drop(config_file);

        let archive_option = format!(
            "archive_file = {:?}",
            archive_path.display().to_string()
        );

        let matches = trials_args().get_matches_from(vec![
            "trials",
            "--config",
            config_path.to_str().unwrap(),
            "-C",
            "first_problem = 20",
            "-C",
            &archive_option,
        ]);

        let config = harness_config(&matches)?;
        assert_eq!(config.first_problem, 20);
        assert_eq!(config.cases, vec![TrialCase::from([3, 4, 2, 2])]);
        assert_eq!(config.archive_name(), "wffs");

        let samples = run_to_files(&config)?;
        assert_eq!(samples.len(), 2);

        let results = fs::read_to_string(dir.path().join("results.csv"))?;
        assert_eq!(results.lines().count(), 3);
        assert!(results.lines().last().unwrap().starts_with("wffs,TheBoss,2,"));

        let entries = ArchiveParser::parse(fs::File::open(&archive_path)?)?;
        let params = GeneratorParams {
            var_count: 3,
            clause_count: 4,
            lits_per_clause: 2,
        };
        assert_eq!(entries[0].formula, generate(&params, 20)?);
        assert_eq!(entries[1].formula, generate(&params, 21)?);

        Ok(())
    }

    #[test]
    fn rejects_bad_options() {
        let matches = trials_args().get_matches_from(vec!["trials", "-C", "first_problem = -1"]);
        assert!(harness_config(&matches).is_err());

        let matches =
            trials_args().get_matches_from(vec!["trials", "-C", "cases = [[70, 1, 1, 1]]"]);
        assert!(harness_config(&matches).is_err());
    }
}
