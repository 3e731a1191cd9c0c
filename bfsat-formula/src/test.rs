//! Formula generators for tests of the brute force checker.
//!
//! All of these stay small enough to enumerate every assignment.
use proptest::{prelude::*, *};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// Every clause over variables `1..=vars` that contains each variable exactly once.
///
/// Each of the `2^vars` clauses rules out exactly one assignment, so the formula is
/// unsatisfiable and every assignment falsifies exactly one clause.
pub fn all_sign_combinations(vars: usize) -> CnfFormula {
    let mut formula = CnfFormula::new();
    for signs in 0..(1u64 << vars) {
        formula.add_clause(
            (0..vars).map(|index| Lit::from_var(Var::from_index(index), signs & (1 << index) != 0)),
        );
    }
    formula.set_var_count(vars);
    formula
}

/// Generate small hard unsat instances.
///
/// Implementation of http://www.cs.qub.ac.uk/~i.spence/sgen/ but with random partitions. A
/// formula with `blocks` blocks has `4 * blocks + 1` variables.
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|polarity, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = polarity
                .into_iter()
                .enumerate()
                .map(|(index, polarity)| Lit::from_index(index, polarity))
                .collect::<Vec<_>>();

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                for block in lits.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                clauses.push(vec![
                                    block[a] ^ invert,
                                    block[b] ^ invert,
                                    block[c] ^ invert,
                                ]);
                            }
                        }
                    }
                }
                let lit_a = lits[lits.len() - 1];
                for b in 0..4 {
                    for c in 0..b {
                        clauses.push(vec![lit_a ^ invert, lits[b] ^ invert, lits[c] ^ invert]);
                    }
                }
            }

            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// Generate a formula with a planted solution.
///
/// A random full assignment is drawn first. Every clause gets `clause_len` random literals and
/// then one of them is replaced by a literal that is true under the planted assignment. The
/// returned vector holds the planted value of each variable, 0-based.
pub fn planted_sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    clause_len: impl Strategy<Value = usize>,
) -> impl Strategy<Value = (Vec<bool>, CnfFormula)> {
    (vars, clause_count, clause_len).prop_flat_map(|(vars, clause_count, clause_len)| {
        collection::vec(bool::ANY, vars).prop_perturb(move |planted, mut rng| {
            let mut formula = CnfFormula::new();
            let mut clause = vec![];

            for _ in 0..clause_count {
                clause.clear();
                for _ in 0..clause_len.max(1) {
                    let index = rng.gen_range(0, vars);
                    clause.push(Lit::from_index(index, rng.gen()));
                }
                let fixed = rng.gen_range(0, clause.len());
                let index = clause[fixed].index();
                clause[fixed] = Lit::from_index(index, planted[index]);
                formula.add_clause(&clause);
            }

            formula.set_var_count(vars);
            (planted, formula)
        })
    })
}
