//! Narrow integer linear programming interface and its default backend.
//!
//! Callers describe a program as a coefficient matrix with per-row and
//! per-variable bounds, integrality flags and a minimisation objective. Any
//! type implementing [`MilpBackend`] can solve it; [`BranchAndBound`] is the
//! in-crate implementation built on a dense two-phase simplex.

mod branch;
mod simplex;

use nalgebra::{DMatrix, DVector};

use crate::config::MilpConfig;
use crate::error::BackendError;

pub use branch::BranchAndBound;

/// Closed interval `[lower, upper]`; a missing upper bound means +inf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Bound {
    pub fn exactly(value: f64) -> Self {
        Self {
            lower: value,
            upper: Some(value),
        }
    }

    pub fn at_least(lower: f64) -> Self {
        Self { lower, upper: None }
    }

    pub fn is_equality(&self) -> bool {
        self.upper == Some(self.lower)
    }
}

/// `minimise objective . x` subject to `row_bounds[i] ∋ (matrix x)[i]`
/// and `var_bounds[j] ∋ x[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerProgram {
    pub matrix: DMatrix<f64>,
    pub row_bounds: Vec<Bound>,
    pub var_bounds: Vec<Bound>,
    /// `integrality[j]` requires `x[j]` to be integral.
    pub integrality: Vec<bool>,
    pub objective: DVector<f64>,
}

impl IntegerProgram {
    pub fn num_rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn num_vars(&self) -> usize {
        self.matrix.ncols()
    }

    /// Checks that every bound and flag vector matches the matrix shape.
    pub fn validate(&self) -> Result<(), BackendError> {
        let (m, n) = self.matrix.shape();
        let checks = [
            ("row bounds", self.row_bounds.len(), m),
            ("variable bounds", self.var_bounds.len(), n),
            ("integrality flags", self.integrality.len(), n),
            ("objective", self.objective.len(), n),
        ];
        for (what, got, expected) in checks {
            if got != expected {
                return Err(BackendError::DimensionMismatch(format!(
                    "{what}: expected {expected}, got {got}"
                )));
            }
        }
        Ok(())
    }
}

/// What a backend concluded about a program.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// An optimal point, possibly carrying floating point noise.
    Feasible(Vec<f64>),
    Infeasible,
}

/// A solver for [`IntegerProgram`]s.
pub trait MilpBackend {
    fn solve(
        &self,
        program: &IntegerProgram,
        config: &MilpConfig,
    ) -> Result<BackendOutcome, BackendError>;
}

impl<B: MilpBackend + ?Sized> MilpBackend for &B {
    fn solve(
        &self,
        program: &IntegerProgram,
        config: &MilpConfig,
    ) -> Result<BackendOutcome, BackendError> {
        (**self).solve(program, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_constructors() {
        assert!(Bound::exactly(3.0).is_equality());
        assert!(!Bound::at_least(0.0).is_equality());
        assert!(!Bound { lower: 1.0, upper: Some(2.0) }.is_equality());
    }

    #[test]
    fn validate_rejects_mismatched_vectors() {
        let program = IntegerProgram {
            matrix: DMatrix::zeros(2, 3),
            row_bounds: vec![Bound::exactly(0.0); 2],
            var_bounds: vec![Bound::at_least(0.0); 3],
            integrality: vec![true; 2],
            objective: DVector::from_element(3, 1.0),
        };
        assert!(matches!(
            program.validate(),
            Err(BackendError::DimensionMismatch(_))
        ));
    }
}
