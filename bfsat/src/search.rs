//! Exhaustive search for a satisfying assignment.
use log::{debug, trace};
use thiserror::Error;

use crate::assignment::Assignment;
use crate::cnf::CnfFormula;
use crate::eval::formula_is_satisfied;
use crate::lit::Lit;

/// Largest number of variables a search accepts.
///
/// The number of candidates, `2^n`, must fit the step counter.
pub const MAX_VAR_COUNT: usize = 63;

/// Reasons a search cannot be started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error(
        "clause {}: literal {} references a variable outside of 1..={}",
        clause,
        lit,
        var_count
    )]
    InvalidFormula {
        clause: usize,
        lit: Lit,
        var_count: usize,
    },
    #[error(
        "start assignment covers {} variables while the search covers {}",
        len,
        var_count
    )]
    AssignmentLength { len: usize, var_count: usize },
    #[error(
        "{} variables exceed the supported maximum of {}",
        var_count,
        MAX_VAR_COUNT
    )]
    TooManyVariables { var_count: usize },
}

/// Result of a completed search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Whether a satisfying assignment was found.
    ///
    /// As the whole assignment space is searched, `false` means the formula is unsatisfiable.
    pub satisfied: bool,
    /// The first satisfying assignment in enumeration order, present iff `satisfied`.
    pub assignment: Option<Assignment>,
    /// Number of candidate assignments evaluated.
    pub steps: u64,
}

/// Check that a search over `var_count` variables can evaluate every literal of the formula.
pub fn validate(formula: &CnfFormula, var_count: usize) -> Result<(), SearchError> {
    if var_count > MAX_VAR_COUNT {
        return Err(SearchError::TooManyVariables { var_count });
    }
    for (clause_index, clause) in formula.iter().enumerate() {
        if let Some(&lit) = clause.iter().find(|lit| lit.index() >= var_count) {
            return Err(SearchError::InvalidFormula {
                clause: clause_index,
                lit,
                var_count,
            });
        }
    }
    Ok(())
}

/// Search the assignments of `var_count` variables for one satisfying `formula`.
///
/// `start` is the assignment *preceding* the first candidate: every step first advances the
/// assignment in counting order (see [`Assignment::advance`]) and then evaluates the formula.
/// Starting from all-false therefore tests all-false last, as the `2^n`-th candidate.
///
/// The search stops at the first satisfying assignment. After `2^n` steps every assignment has
/// been tested and the formula is unsatisfiable. With zero variables exactly one step evaluates
/// the formula under the empty assignment.
pub fn check(
    formula: &CnfFormula,
    var_count: usize,
    start: Assignment,
) -> Result<SearchOutcome, SearchError> {
    validate(formula, var_count)?;
    if start.var_count() != var_count {
        return Err(SearchError::AssignmentLength {
            len: start.var_count(),
            var_count,
        });
    }

    let total = 1u64 << var_count;
    let mut assignment = start;

    trace!(
        "searching {} assignments of {} variables for {} clauses",
        total,
        var_count,
        formula.len()
    );

    for step in 1..=total {
        assignment.advance();
        if formula_is_satisfied(formula, &assignment) {
            debug!("satisfying assignment found after {} of {} steps", step, total);
            return Ok(SearchOutcome {
                satisfied: true,
                assignment: Some(assignment),
                steps: step,
            });
        }
    }

    debug!("all {} assignments falsify the formula", total);
    Ok(SearchOutcome {
        satisfied: false,
        assignment: None,
        steps: total,
    })
}

/// [`check`] starting from the all-false assignment.
pub fn check_from_zero(
    formula: &CnfFormula,
    var_count: usize,
) -> Result<SearchOutcome, SearchError> {
    check(formula, var_count, Assignment::new(var_count))
}
