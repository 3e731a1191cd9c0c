//! bfsat decides the satisfiability of a boolean formula in [conjunctive normal form][cnf] by
//! trying every assignment of its variables.
//!
//! The search is a complete, unguided enumeration in binary counting order. There is no
//! propagation, learning or branching heuristic; the result is correct because every candidate
//! is evaluated. This keeps the behavior fully deterministic but limits it to formulas with a
//! few dozen variables at most.
//!
//! [cnf]: https://en.wikipedia.org/wiki/Conjunctive_normal_form

pub mod assignment;
pub mod eval;
pub mod generate;
pub mod search;
pub mod solver;

pub use assignment::Assignment;
pub use bfsat_formula::{cnf, lit, CnfFormula, Lit, Var};
pub use search::{check, check_from_zero, SearchError, SearchOutcome};
pub use solver::Solver;

pub mod archive {
    //! Formula archive parser and writer.
    pub use bfsat_archive::*;
}
