//! Seeded random formulas.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::cnf::CnfFormula;
use crate::lit::Var;

/// Shape of a generated formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GeneratorParams {
    pub var_count: usize,
    pub clause_count: usize,
    pub lits_per_clause: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error(
        "cannot draw {} literals per clause without any variables",
        lits_per_clause
    )]
    NoVariables { lits_per_clause: usize },
    #[error("{} variables exceed the supported maximum of {}", var_count, Var::max_count())]
    TooManyVariables { var_count: usize },
}

/// Generate a random formula, fully determined by `params` and `seed`.
pub fn generate(params: &GeneratorParams, seed: u64) -> Result<CnfFormula, GenerateError> {
    generate_with(params, &mut StdRng::seed_from_u64(seed))
}

/// Generate a random formula using the given random number generator.
///
/// Every literal draws its variable uniformly from all `var_count` variables and its polarity
/// with equal chance, so a clause may mention a variable more than once. The variable count of
/// the result is `var_count` even if some variables were never drawn.
pub fn generate_with(
    params: &GeneratorParams,
    rng: &mut impl Rng,
) -> Result<CnfFormula, GenerateError> {
    if params.var_count == 0 && params.lits_per_clause > 0 && params.clause_count > 0 {
        return Err(GenerateError::NoVariables {
            lits_per_clause: params.lits_per_clause,
        });
    }
    if params.var_count > Var::max_count() {
        return Err(GenerateError::TooManyVariables {
            var_count: params.var_count,
        });
    }

    let mut formula = CnfFormula::new();
    let mut clause = Vec::with_capacity(params.lits_per_clause);

    for _ in 0..params.clause_count {
        clause.clear();
        for _ in 0..params.lits_per_clause {
            let var = Var::from_index(rng.gen_range(0, params.var_count));
            clause.push(var.lit(rng.gen()));
        }
        formula.add_clause(&clause);
    }

    formula.set_var_count(params.var_count);
    Ok(formula)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    const PARAMS: GeneratorParams = GeneratorParams {
        var_count: 10,
        clause_count: 20,
        lits_per_clause: 3,
    };

    #[test]
    fn same_seed_same_formula() {
        assert_eq!(generate(&PARAMS, 3).unwrap(), generate(&PARAMS, 3).unwrap());
        assert_ne!(generate(&PARAMS, 3).unwrap(), generate(&PARAMS, 4).unwrap());
    }

    #[test]
    fn degenerate_shapes() {
        let no_vars = GeneratorParams {
            var_count: 0,
            clause_count: 2,
            lits_per_clause: 0,
        };
        let formula = generate(&no_vars, 1).unwrap();
        assert_eq!(formula.len(), 2);
        assert_eq!(formula.var_count(), 0);
        assert!(formula.iter().all(|clause| clause.is_empty()));

        assert_eq!(
            generate(
                &GeneratorParams {
                    lits_per_clause: 2,
                    ..no_vars
                },
                1
            ),
            Err(GenerateError::NoVariables { lits_per_clause: 2 })
        );
    }

    proptest! {
        #[test]
        fn respects_shape(
            var_count in 1..30usize,
            clause_count in 0..50usize,
            lits_per_clause in 0..8usize,
            seed in any::<u64>(),
        ) {
            let params = GeneratorParams { var_count, clause_count, lits_per_clause };
            let formula = generate(&params, seed).unwrap();

            prop_assert_eq!(formula.len(), clause_count);
            prop_assert_eq!(formula.var_count(), var_count);
            for clause in formula.iter() {
                prop_assert_eq!(clause.len(), lits_per_clause);
                for lit in clause {
                    prop_assert!(lit.index() < var_count);
                }
            }
        }
    }
}
