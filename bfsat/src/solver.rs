//! Boolean satisfiability solver.
use std::io;

use anyhow::Error;
use log::info;

use crate::archive::ArchiveParser;
use crate::assignment::Assignment;
use crate::cnf::CnfFormula;
use crate::lit::Lit;
use crate::search::{check, SearchError, SearchOutcome};

/// A brute force satisfiability solver.
///
/// Collects clauses, then searches all assignments of its variables. Adding clauses or changing
/// the variable count discards the result of a previous search.
#[derive(Default)]
pub struct Solver {
    formula: CnfFormula,
    start: Option<Assignment>,
    outcome: Option<SearchOutcome>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        self.formula.extend_formula(formula);
        self.outcome = None;
    }

    /// Reads and adds all formulas of an archive or DIMACS CNF input.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = ArchiveParser::parse_incremental(input, |parser| {
            for entry in parser.take_entries() {
                self.add_formula(&entry.formula);
            }
            Ok(())
        })?;

        info!(
            "Parsed {} formula(s), {} variables and {} clauses in total",
            parser.entry_count(),
            self.formula.var_count(),
            self.formula.len()
        );

        Ok(())
    }

    /// Include variables up to `count` in the search even if no clause uses them.
    pub fn set_var_count(&mut self, count: usize) {
        self.formula.set_var_count(count);
        self.outcome = None;
    }

    /// Number of variables the search covers.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    /// The assignment preceding the first candidate of the next search.
    ///
    /// Defaults to all-false. It has to cover exactly `var_count()` variables when solving.
    pub fn set_start(&mut self, start: Assignment) {
        self.start = Some(start);
        self.outcome = None;
    }

    /// Check the satisfiability of the current formula.
    pub fn solve(&mut self) -> Result<bool, SearchError> {
        let var_count = self.formula.var_count();
        let start = self
            .start
            .clone()
            .unwrap_or_else(|| Assignment::new(var_count));
        let outcome = check(&self.formula, var_count, start)?;
        let satisfied = outcome.satisfied;
        self.outcome = Some(outcome);
        Ok(satisfied)
    }

    /// Outcome of the last search, if still current.
    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    /// Satisfying assignment found by the last search.
    pub fn assignment(&self) -> Option<&Assignment> {
        self.outcome.as_ref()?.assignment.as_ref()
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        self.assignment().map(Assignment::model)
    }

    /// Number of candidates evaluated by the last search.
    pub fn steps(&self) -> Option<u64> {
        self.outcome.as_ref().map(|outcome| outcome.steps)
    }
}
