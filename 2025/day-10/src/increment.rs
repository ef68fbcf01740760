use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::error::{BackendError, IncrementError};
use crate::milp::{BackendOutcome, Bound, IntegerProgram, MilpBackend};
use crate::model::{Button, IncrementSolution};
use crate::verify::verify_increment;

/// Equality-constrained program for reaching `target` with nonnegative integer presses.
///
/// `A[p][c] = 1` when button `c` increments counter `p`; each row is pinned to
/// its target, every variable is integral and at least zero, and the objective
/// counts presses.
pub fn build_program(buttons: &[Button], target: &[u64]) -> IntegerProgram {
    let m = target.len();
    let n = buttons.len();

    let mut matrix = DMatrix::zeros(m, n);
    for (col, button) in buttons.iter().enumerate() {
        for row in button.effects(m) {
            matrix[(row, col)] = 1.0;
        }
    }

    IntegerProgram {
        matrix,
        row_bounds: target.iter().map(|&t| Bound::exactly(t as f64)).collect(),
        var_bounds: vec![Bound::at_least(0.0); n],
        integrality: vec![true; n],
        objective: DVector::from_element(n, 1.0),
    }
}

/// Finds the fewest total presses that bring every counter to `target`.
///
/// The backend's answer is rounded to the nearest integers and replayed
/// against the buttons; anything that does not reproduce the target exactly is
/// reported as a [`IncrementError::RoundingMismatch`].
#[tracing::instrument(skip_all, fields(counters = target.len(), buttons = buttons.len()))]
pub fn solve<B: MilpBackend + ?Sized>(
    buttons: &[Button],
    target: &[u64],
    backend: &B,
    config: &SolverConfig,
) -> Result<IncrementSolution, IncrementError> {
    let program = build_program(buttons, target);

    let x = match backend.solve(&program, &config.milp)? {
        BackendOutcome::Feasible(x) => x,
        BackendOutcome::Infeasible => return Err(IncrementError::Infeasible),
    };

    if x.len() != buttons.len() {
        return Err(BackendError::DimensionMismatch(format!(
            "backend returned {} values for {} buttons",
            x.len(),
            buttons.len()
        ))
        .into());
    }

    if let Some(index) = x.iter().position(|v| !v.is_finite()) {
        return Err(BackendError::NonFinite { index }.into());
    }

    let rounded: Vec<i64> = x.iter().map(|v| v.round() as i64).collect();
    let counts: Option<Vec<u64>> = rounded.iter().map(|&v| u64::try_from(v).ok()).collect();

    match counts {
        Some(counts) if verify_increment(&counts, buttons, target) => {
            let solution = IncrementSolution::new(counts);
            debug!(cost = solution.cost(), "verified");
            Ok(solution)
        }
        _ => {
            warn!(?x, "backend solution does not replay after rounding");
            Err(IncrementError::RoundingMismatch { counts: rounded })
        }
    }
}
