//! Full assignments and their enumeration order.
use std::fmt;

use crate::lit::{Lit, Var};

/// A value for every variable of a formula.
///
/// Values are stored 0-based: `values()[i]` is the value of the variable with DIMACS number
/// `i + 1`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// The all-false assignment of `var_count` variables.
    pub fn new(var_count: usize) -> Assignment {
        Assignment {
            values: vec![false; var_count],
        }
    }

    pub fn from_values(values: Vec<bool>) -> Assignment {
        Assignment { values }
    }

    /// Number of assigned variables.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn value(&self, var: Var) -> bool {
        self.values[var.index()]
    }

    /// Whether a literal is true under this assignment.
    ///
    /// The literal's variable must be covered by the assignment.
    #[inline]
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        lit.is_true_for(self.values[lit.index()])
    }

    /// Step to the next assignment in counting order.
    ///
    /// The values are read as the digits of a binary number with variable 1 as the least
    /// significant bit, and that number is incremented by one. Starting from all-false, `2^n`
    /// steps visit every assignment once and end at all-false again.
    #[inline]
    pub fn advance(&mut self) {
        for value in self.values.iter_mut() {
            if *value {
                *value = false;
            } else {
                *value = true;
                return;
            }
        }
    }

    /// The assignment as literals, one per variable, in variable order.
    pub fn model(&self) -> Vec<Lit> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, &value)| Lit::from_index(index, value))
            .collect()
    }

    /// Values as `0`/`1` digits in variable order.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.iter().map(|&value| value as u8)
    }
}

/// Prints the bits in variable order, e.g. `101` for `1 -2 3`.
impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for bit in self.bits() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
