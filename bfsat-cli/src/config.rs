//! Trial harness configuration.
use std::path::{Path, PathBuf};

use anyhow::{bail, Error};
use serde::Deserialize;

use bfsat::generate::GeneratorParams;
use bfsat::search::MAX_VAR_COUNT;

/// One line of the case table: a formula shape and how many formulas to try.
///
/// Written as `[variables, clauses, literals per clause, trials]` in configuration files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "[usize; 4]")]
pub struct TrialCase {
    pub var_count: usize,
    pub clause_count: usize,
    pub lits_per_clause: usize,
    pub trials: usize,
}

impl From<[usize; 4]> for TrialCase {
    fn from([var_count, clause_count, lits_per_clause, trials]: [usize; 4]) -> TrialCase {
        TrialCase {
            var_count,
            clause_count,
            lits_per_clause,
            trials,
        }
    }
}

impl TrialCase {
    pub fn params(&self) -> GeneratorParams {
        GeneratorParams {
            var_count: self.var_count,
            clause_count: self.clause_count,
            lits_per_clause: self.lits_per_clause,
        }
    }
}

/// Parameters of a trial run.
#[derive(Clone, Debug, PartialEq)]
pub struct HarnessConfig {
    /// Formula shapes to generate, in order.
    pub cases: Vec<TrialCase>,
    /// Problem id of the first formula. Ids also seed the generator.
    pub first_problem: u64,
    /// One row per formula plus a final summary row.
    pub results_file: PathBuf,
    /// One row per formula plus per case statistics.
    pub trace_file: PathBuf,
    /// Every generated formula.
    pub archive_file: PathBuf,
    /// Record the result in archive tags, `?` otherwise.
    pub show_answer: bool,
}

/// The case table of the reference experiment: 8 sizes for each of 5 clause widths.
const DEFAULT_CASES: [[usize; 4]; 40] = [
    [4, 10, 2, 10],
    [8, 16, 2, 10],
    [12, 24, 2, 10],
    [16, 32, 2, 10],
    [18, 36, 2, 10],
    [20, 40, 2, 10],
    [22, 44, 2, 10],
    [24, 48, 2, 10],
    [4, 20, 3, 10],
    [8, 40, 3, 10],
    [12, 60, 3, 10],
    [16, 80, 3, 10],
    [18, 90, 3, 10],
    [20, 100, 3, 10],
    [22, 110, 3, 10],
    [24, 120, 3, 10],
    [4, 40, 4, 10],
    [8, 80, 4, 10],
    [12, 120, 4, 10],
    [16, 160, 4, 10],
    [18, 180, 4, 10],
    [20, 200, 4, 10],
    [22, 220, 4, 10],
    [24, 240, 4, 10],
    [4, 40, 5, 10],
    [8, 80, 5, 10],
    [12, 120, 5, 10],
    [16, 160, 5, 10],
    [18, 180, 5, 10],
    [20, 200, 5, 10],
    [22, 220, 5, 10],
    [24, 240, 5, 10],
    [4, 40, 6, 10],
    [8, 80, 6, 10],
    [12, 120, 6, 10],
    [16, 160, 6, 10],
    [18, 180, 6, 10],
    [20, 200, 6, 10],
    [22, 220, 6, 10],
    [24, 240, 6, 10],
];

impl Default for HarnessConfig {
    fn default() -> HarnessConfig {
        HarnessConfig {
            cases: DEFAULT_CASES.iter().cloned().map(TrialCase::from).collect(),
            first_problem: 3,
            results_file: PathBuf::from("resultsfile.csv"),
            trace_file: PathBuf::from("tracefile.csv"),
            archive_file: PathBuf::from("cnffile.cnf"),
            show_answer: true,
        }
    }
}

impl HarnessConfig {
    /// Apply all options set in an update.
    pub fn apply(&mut self, update: &HarnessConfigUpdate) {
        if let Some(cases) = &update.cases {
            self.cases = cases.clone();
        }
        if let Some(first_problem) = update.first_problem {
            self.first_problem = first_problem;
        }
        if let Some(results_file) = &update.results_file {
            self.results_file = results_file.clone();
        }
        if let Some(trace_file) = &update.trace_file {
            self.trace_file = trace_file.clone();
        }
        if let Some(archive_file) = &update.archive_file {
            self.archive_file = archive_file.clone();
        }
        if let Some(show_answer) = update.show_answer {
            self.show_answer = show_answer;
        }
    }

    /// Reject cases the checker or generator cannot run.
    pub fn validate(&self) -> Result<(), Error> {
        for (index, case) in self.cases.iter().enumerate() {
            if case.var_count > MAX_VAR_COUNT {
                bail!(
                    "case {}: {} variables exceed the supported maximum of {}",
                    index + 1,
                    case.var_count,
                    MAX_VAR_COUNT
                );
            }
            if case.var_count == 0 && case.lits_per_clause > 0 && case.clause_count > 0 {
                bail!(
                    "case {}: clauses with {} literals need at least one variable",
                    index + 1,
                    case.lits_per_clause
                );
            }
        }
        Ok(())
    }

    /// Name used for the archive in the summary row, the archive file name without extension.
    pub fn archive_name(&self) -> String {
        self.archive_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Option list shown for `-C help`.
    pub fn help() -> String {
        let defaults = HarnessConfig::default();
        let mut help = String::new();
        let mut option = |name: &str, doc: &str, default: String| {
            help.push_str(&format!("{}:\n    {} (Default: {})\n", name, doc, default));
        };
        option(
            "cases",
            "List of [variables, clauses, literals per clause, trials].",
            format!("{} cases, see documentation", defaults.cases.len()),
        );
        option(
            "first_problem",
            "Id of the first generated formula, also its random seed.",
            defaults.first_problem.to_string(),
        );
        option(
            "results_file",
            "Path of the results file.",
            display_path(&defaults.results_file),
        );
        option(
            "trace_file",
            "Path of the trace file.",
            display_path(&defaults.trace_file),
        );
        option(
            "archive_file",
            "Path of the formula archive.",
            display_path(&defaults.archive_file),
        );
        option(
            "show_answer",
            "Record S or U in archive tags instead of ?.",
            defaults.show_answer.to_string(),
        );
        help
    }
}

fn display_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}

/// A partial configuration, as read from a file or a single `-C` option.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfigUpdate {
    pub cases: Option<Vec<TrialCase>>,
    pub first_problem: Option<u64>,
    pub results_file: Option<PathBuf>,
    pub trace_file: Option<PathBuf>,
    pub archive_file: Option<PathBuf>,
    pub show_answer: Option<bool>,
}

impl HarnessConfigUpdate {
    pub fn new() -> HarnessConfigUpdate {
        HarnessConfigUpdate::default()
    }

    /// Overwrite the options set in `other`.
    pub fn merge(&mut self, other: HarnessConfigUpdate) {
        macro_rules! merge_fields {
            ($( $field:ident ),*) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        merge_fields!(
            cases,
            first_problem,
            results_file,
            trace_file,
            archive_file,
            show_answer
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_case_table() {
        let config = HarnessConfig::default();

        assert_eq!(config.cases.len(), 40);
        assert_eq!(config.cases[0], TrialCase::from([4, 10, 2, 10]));
        assert_eq!(config.cases[1], TrialCase::from([8, 16, 2, 10]));
        assert_eq!(config.cases[8], TrialCase::from([4, 20, 3, 10]));
        assert_eq!(config.cases[17], TrialCase::from([8, 80, 4, 10]));
        assert_eq!(config.cases[39], TrialCase::from([24, 240, 6, 10]));
        assert_eq!(config.first_problem, 3);
        assert_eq!(config.archive_name(), "cnffile");
        config.validate().unwrap();
    }

    #[test]
    fn updates_merge_in_order() -> Result<(), Error> {
        let mut update = HarnessConfigUpdate::new();
        update.merge(toml::from_str(
            "first_problem = 10\nshow_answer = false\ncases = [[3, 5, 2, 1], [4, 6, 3, 2]]\n",
        )?);
        update.merge(toml::from_str("first_problem = 20")?);
        update.merge(toml::from_str("archive_file = \"out/wffs.cnf\"")?);

        let mut config = HarnessConfig::default();
        config.apply(&update);

        assert_eq!(config.first_problem, 20);
        assert!(!config.show_answer);
        assert_eq!(
            config.cases,
            vec![TrialCase::from([3, 5, 2, 1]), TrialCase::from([4, 6, 3, 2])]
        );
        assert_eq!(config.archive_name(), "wffs");
        assert_eq!(config.results_file, PathBuf::from("resultsfile.csv"));

        Ok(())
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(toml::from_str::<HarnessConfigUpdate>("seed = 3").is_err());
        assert!(toml::from_str::<HarnessConfigUpdate>("cases = [[1, 2, 3]]").is_err());
    }

    #[test]
    fn rejects_unsearchable_cases() {
        let mut config = HarnessConfig::default();
        config.cases = vec![TrialCase::from([MAX_VAR_COUNT + 1, 1, 1, 1])];
        assert!(config.validate().is_err());

        config.cases = vec![TrialCase::from([0, 3, 2, 1])];
        assert!(config.validate().is_err());

        config.cases = vec![TrialCase::from([0, 3, 0, 1])];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn help_lists_all_options() {
        let help = HarnessConfig::help();
        for name in [
            "cases",
            "first_problem",
            "results_file",
            "trace_file",
            "archive_file",
            "show_answer",
        ]
        .iter()
        {
            assert!(help.contains(&format!("{}:\n", name)));
        }
    }
}
