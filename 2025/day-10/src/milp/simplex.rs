use nalgebra::{DMatrix, DVector};

use crate::error::BackendError;

// -----------------------------------------------------------------------------
// Constants & Configuration
// -----------------------------------------------------------------------------

/// Numerical epsilon for comparing floating point values to zero.
const EPSILON: f64 = 1e-9;

/// Tolerance for the Phase 1 feasibility check.
/// Relaxed to absorb drift when targets are large.
const PHASE1_TOLERANCE: f64 = 1e-6;

// -----------------------------------------------------------------------------
// Domain Models
// -----------------------------------------------------------------------------

/// Standard form relaxation: minimise `c . x` subject to `A x = b`, `x >= 0`.
#[derive(Clone, Debug)]
pub(super) struct StandardForm {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
}

#[derive(Clone, Debug)]
pub(super) struct Solution {
    pub x: DVector<f64>,
    pub cost: f64,
}

#[derive(Clone, Debug)]
pub(super) enum LpOutcome {
    Optimal(Solution),
    Infeasible,
    Unbounded,
}

/// Dense simplex tableau. Rows `0..m` are constraints, row `m` is the
/// objective, and the last column is the right-hand side.
struct Tableau {
    mat: DMatrix<f64>,
    /// `basis[r]` is the column currently basic in row `r`.
    basis: Vec<usize>,
    m: usize,
    rhs: usize,
}

impl Tableau {
    fn pivot(&mut self, pr: usize, pc: usize) {
        let inv = 1.0 / self.mat[(pr, pc)];

        // Normalize pivot row
        for c in 0..=self.rhs {
            self.mat[(pr, c)] *= inv;
        }

        // Eliminate other rows, objective included
        for r in 0..=self.m {
            if r == pr {
                continue;
            }
            let factor = self.mat[(r, pc)];
            if factor.abs() > EPSILON {
                for c in 0..=self.rhs {
                    let delta = factor * self.mat[(pr, c)];
                    self.mat[(r, c)] -= delta;
                }
            }
        }

        self.basis[pr] = pc;
    }

    /// Pivots until no column in `0..cols` has a negative reduced cost.
    /// Returns `false` if the objective is unbounded along some column.
    fn optimize(&mut self, cols: usize, iteration_limit: usize) -> Result<bool, BackendError> {
        for _ in 0..iteration_limit {
            // Bland's Rule: first column with negative reduced cost
            let Some(pc) = (0..cols).find(|&c| self.mat[(self.m, c)] < -EPSILON) else {
                return Ok(true);
            };

            // Min Ratio Test, ties broken by lowest basic column (Bland)
            let mut pivot_row: Option<(usize, f64)> = None;
            for r in 0..self.m {
                let val = self.mat[(r, pc)];
                if val <= EPSILON {
                    continue;
                }
                let ratio = self.mat[(r, self.rhs)] / val;
                pivot_row = match pivot_row {
                    Some((best, best_ratio))
                        if ratio > best_ratio + EPSILON
                            || ((ratio - best_ratio).abs() <= EPSILON
                                && self.basis[best] < self.basis[r]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((r, ratio)),
                };
            }

            match pivot_row {
                None => return Ok(false),
                Some((pr, _)) => self.pivot(pr, pc),
            }
        }

        Err(BackendError::IterationLimit {
            limit: iteration_limit,
        })
    }
}

// -----------------------------------------------------------------------------
// Two Phase Simplex
// -----------------------------------------------------------------------------

/// Solves the Linear Programming relaxation.
pub(super) fn solve(lp: &StandardForm, iteration_limit: usize) -> Result<LpOutcome, BackendError> {
    let n = lp.a.ncols();

    // Phase 1: minimise the sum of artificials to find an initial basis
    let mut phase1 = setup_phase_one(lp);
    phase1.optimize(phase1.rhs, iteration_limit)?;

    let phase1_cost = -phase1.mat[(phase1.m, phase1.rhs)];
    if phase1_cost > PHASE1_TOLERANCE {
        return Ok(LpOutcome::Infeasible);
    }

    // Phase 2: optimise the original objective
    let mut phase2 = prepare_phase_two(phase1, n);
    setup_phase_two_objective(&mut phase2, &lp.c);

    if !phase2.optimize(n, iteration_limit)? {
        return Ok(LpOutcome::Unbounded);
    }

    let mut x = DVector::zeros(n);
    for (r, &bc) in phase2.basis.iter().enumerate() {
        x[bc] = phase2.mat[(r, phase2.rhs)];
    }
    let cost = lp.c.dot(&x);

    Ok(LpOutcome::Optimal(Solution { x, cost }))
}

fn setup_phase_one(lp: &StandardForm) -> Tableau {
    let m = lp.a.nrows();
    let n = lp.a.ncols();
    let rhs = n + m; // Vars + Artificials, then RHS
    let mut mat = DMatrix::zeros(m + 1, rhs + 1);

    // Constraints, flipping rows so every RHS is nonnegative
    for r in 0..m {
        let sign = if lp.b[r] < 0.0 { -1.0 } else { 1.0 };
        for c in 0..n {
            mat[(r, c)] = lp.a[(r, c)] * sign;
        }
        mat[(r, n + r)] = 1.0;
        mat[(r, rhs)] = lp.b[r] * sign;
    }

    // Objective row in canonical form: -sum of the constraint rows,
    // with the artificial columns already eliminated.
    for c in (0..n).chain(std::iter::once(rhs)) {
        let col_sum: f64 = (0..m).map(|r| mat[(r, c)]).sum();
        mat[(m, c)] = -col_sum;
    }

    Tableau {
        mat,
        basis: (n..n + m).collect(),
        m,
        rhs,
    }
}

/// Pivots artificials out of the basis and drops redundant rows.
fn prepare_phase_two(mut phase1: Tableau, n: usize) -> Tableau {
    let mut active = Vec::with_capacity(phase1.m);

    for r in 0..phase1.m {
        if phase1.basis[r] < n {
            active.push(r);
            continue;
        }
        // Artificial is basic at zero. Swap in any structural column.
        if let Some(pc) = (0..n).find(|&c| phase1.mat[(r, c)].abs() > EPSILON) {
            phase1.pivot(r, pc);
            active.push(r);
        }
        // Otherwise the row reads 0 = 0 and is redundant.
    }

    let m = active.len();
    let mut mat = DMatrix::zeros(m + 1, n + 1);
    let mut basis = Vec::with_capacity(m);

    for (new_r, &old_r) in active.iter().enumerate() {
        for c in 0..n {
            mat[(new_r, c)] = phase1.mat[(old_r, c)];
        }
        mat[(new_r, n)] = phase1.mat[(old_r, phase1.rhs)];
        basis.push(phase1.basis[old_r]);
    }

    Tableau {
        mat,
        basis,
        m,
        rhs: n,
    }
}

fn setup_phase_two_objective(tableau: &mut Tableau, c_vec: &DVector<f64>) {
    let m = tableau.m;
    for c in 0..c_vec.len() {
        tableau.mat[(m, c)] = c_vec[c];
    }

    // Canonicalize: eliminate basic variables from the objective row
    for r in 0..m {
        let factor = tableau.mat[(m, tableau.basis[r])];
        if factor.abs() > EPSILON {
            for c in 0..=tableau.rhs {
                let delta = factor * tableau.mat[(r, c)];
                tableau.mat[(m, c)] -= delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp(a: &[&[f64]], b: &[f64], c: &[f64]) -> StandardForm {
        let rows = a.len();
        let cols = c.len();
        StandardForm {
            a: DMatrix::from_fn(rows, cols, |r, col| a[r][col]),
            b: DVector::from_column_slice(b),
            c: DVector::from_column_slice(c),
        }
    }

    fn optimal(outcome: LpOutcome) -> Solution {
        match outcome {
            LpOutcome::Optimal(sol) => sol,
            other => panic!("expected optimum, got {other:?}"),
        }
    }

    #[test]
    fn finds_the_cheapest_vertex() -> Result<(), BackendError> {
        // x0 + x1 = 3, x1 + x2 = 5, min x0 + x1 + x2  =>  x1 = 3, x2 = 2
        let sys = lp(&[&[1.0, 1.0, 0.0], &[0.0, 1.0, 1.0]], &[3.0, 5.0], &[1.0; 3]);
        let sol = optimal(solve(&sys, 100)?);
        assert!((sol.cost - 5.0).abs() < 1e-9);
        assert!((sol.x[1] - 3.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn detects_infeasible_rows() -> Result<(), BackendError> {
        // Second row has no coefficients but a nonzero target
        let sys = lp(&[&[1.0], &[0.0]], &[5.0, 1.0], &[1.0]);
        assert!(matches!(solve(&sys, 100)?, LpOutcome::Infeasible));
        Ok(())
    }

    #[test]
    fn drops_redundant_rows() -> Result<(), BackendError> {
        let sys = lp(&[&[1.0, 1.0], &[1.0, 1.0]], &[4.0, 4.0], &[1.0, 2.0]);
        let sol = optimal(solve(&sys, 100)?);
        assert!((sol.x[0] - 4.0).abs() < 1e-9);
        assert!((sol.cost - 4.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn duplicate_columns_are_not_double_counted() -> Result<(), BackendError> {
        let sys = lp(&[&[1.0, 1.0]], &[2.0], &[1.0, 1.0]);
        let sol = optimal(solve(&sys, 100)?);
        assert!((sol.x.sum() - 2.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn reports_unbounded_objective() -> Result<(), BackendError> {
        // x0 - x1 = 0 with a negative cost on both
        let sys = lp(&[&[1.0, -1.0]], &[0.0], &[-1.0, -1.0]);
        assert!(matches!(solve(&sys, 100)?, LpOutcome::Unbounded));
        Ok(())
    }

    #[test]
    fn empty_system_is_trivially_optimal() -> Result<(), BackendError> {
        let sys = lp(&[], &[], &[]);
        let sol = optimal(solve(&sys, 10)?);
        assert_eq!(sol.x.len(), 0);
        assert_eq!(sol.cost, 0.0);
        Ok(())
    }
}
