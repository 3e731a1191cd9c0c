//! Evaluation of clauses and formulas under a full assignment.
//!
//! Every literal's variable must be covered by the assignment, see
//! [`search::validate`](crate::search::validate).
use crate::assignment::Assignment;
use crate::cnf::CnfFormula;
use crate::lit::Lit;

/// A clause is satisfied when any of its literals is true. Stops at the first true literal.
#[inline]
pub fn clause_is_satisfied(clause: &[Lit], assignment: &Assignment) -> bool {
    clause.iter().any(|&lit| assignment.lit_is_true(lit))
}

/// A formula is satisfied when all of its clauses are. Stops at the first false clause.
#[inline]
pub fn formula_is_satisfied(formula: &CnfFormula, assignment: &Assignment) -> bool {
    formula
        .iter()
        .all(|clause| clause_is_satisfied(clause, assignment))
}

/// Position of the first clause falsified by the assignment.
pub fn first_false_clause(formula: &CnfFormula, assignment: &Assignment) -> Option<usize> {
    formula
        .iter()
        .position(|clause| !clause_is_satisfied(clause, assignment))
}

#[cfg(test)]
mod tests {
    use super::*;

    use bfsat_formula::{cnf_formula, lits};

    #[test]
    fn clause_needs_one_true_literal() {
        let assignment = Assignment::from_values(vec![false, true, false]);

        assert!(clause_is_satisfied(&lits![1, 2], &assignment));
        assert!(clause_is_satisfied(&lits![-1, -1], &assignment));
        assert!(!clause_is_satisfied(&lits![1, -2, 3], &assignment));
        assert!(!clause_is_satisfied(&[], &assignment));
    }

    #[test]
    fn formula_needs_all_clauses() {
        let formula = cnf_formula![
            1, -2, -2;
            2, 3, 3;
            -1, -3, -3;
        ];

        let satisfying = Assignment::from_values(vec![true, true, false]);
        assert!(formula_is_satisfied(&formula, &satisfying));
        assert_eq!(first_false_clause(&formula, &satisfying), None);

        let falsifying = Assignment::from_values(vec![false, true, false]);
        assert!(!formula_is_satisfied(&formula, &falsifying));
        assert_eq!(first_false_clause(&formula, &falsifying), Some(0));
    }

    #[test]
    fn empty_formula_is_true() {
        assert!(formula_is_satisfied(&CnfFormula::new(), &Assignment::new(0)));
        assert!(formula_is_satisfied(&CnfFormula::new(), &Assignment::new(4)));
    }
}
