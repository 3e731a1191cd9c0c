//! Result rows and per case statistics.
use bfsat::archive::ResultTag;
use bfsat::SearchOutcome;

use crate::config::TrialCase;

/// A results row:
/// `id,vars,clauses,lits per clause,total lits,S|U,1,microseconds[,bit]*`.
///
/// The assignment bits are only present for satisfiable formulas.
pub fn result_row(
    problem_id: u64,
    case: &TrialCase,
    outcome: &SearchOutcome,
    elapsed_us: u64,
) -> String {
    let mut row = format!(
        "{},{},{},{},{},{},1,{}",
        problem_id,
        case.var_count,
        case.clause_count,
        case.lits_per_clause,
        case.clause_count * case.lits_per_clause,
        ResultTag::from_result(outcome.satisfied),
        elapsed_us
    );
    if let Some(assignment) = &outcome.assignment {
        for bit in assignment.bits() {
            row.push(',');
            row.push(char::from(b'0' + bit));
        }
    }
    row
}

/// Timing statistics of the trials of one case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaseSummary {
    trials: usize,
    sat_count: usize,
    unsat_count: usize,
    sat_time_total: u64,
    unsat_time_total: u64,
    sat_time_max: u64,
    unsat_time_max: u64,
}

impl CaseSummary {
    pub fn record(&mut self, satisfied: bool, elapsed_us: u64) {
        self.trials += 1;
        if satisfied {
            self.sat_count += 1;
            self.sat_time_total += elapsed_us;
            self.sat_time_max = self.sat_time_max.max(elapsed_us);
        } else {
            self.unsat_count += 1;
            self.unsat_time_total += elapsed_us;
            self.unsat_time_max = self.unsat_time_max.max(elapsed_us);
        }
    }

    pub fn sat_count(&self) -> usize {
        self.sat_count
    }

    pub fn unsat_count(&self) -> usize {
        self.unsat_count
    }

    /// Summary lines for logs and the trace file.
    ///
    /// Both averages divide by the number of trials of the case, not by the number of
    /// satisfiable or unsatisfiable trials. They always show a fractional part, e.g. `10.0`.
    pub fn lines(&self) -> [String; 3] {
        let trials = self.trials.max(1) as f64;
        [
            format!(
                "# Satisfied = {}. # Unsatisfied = {}",
                self.sat_count, self.unsat_count
            ),
            format!(
                "Max Sat Time = {}. Max Unsat Time = {}",
                self.sat_time_max, self.unsat_time_max
            ),
            format!(
                "Ave Sat Time = {:?}. Ave UnSat Time = {:?}",
                self.sat_time_total as f64 / trials,
                self.unsat_time_total as f64 / trials
            ),
        ]
    }
}

/// Final results row: `archive,TheBoss,formulas,sat,unsat,formulas,formulas`.
pub fn summary_row(archive_name: &str, formulas: usize, sat: usize, unsat: usize) -> String {
    format!(
        "{},TheBoss,{},{},{},{},{}",
        archive_name, formulas, sat, unsat, formulas, formulas
    )
}
