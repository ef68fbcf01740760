use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use super::simplex::{self, LpOutcome, StandardForm};
use super::{BackendOutcome, IntegerProgram, MilpBackend};
use crate::config::MilpConfig;
use crate::error::BackendError;

/// Tolerance for checking if a float represents an integer.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Tolerance for pruning branches against the incumbent.
const PRUNING_TOLERANCE: f64 = 1e-6;

/// Largest row residual an integral candidate may carry before it is discarded.
const RESIDUAL_TOLERANCE: f64 = 0.5;

/// Depth-first branch and bound over the simplex relaxation.
///
/// Branches on the first fractional integer variable, exploring `x >= ceil`
/// before `x <= floor`, and prunes any node whose relaxation is no better
/// than the incumbent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound;

#[derive(Debug, Clone)]
struct BranchNode {
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<Option<f64>>,
}

impl MilpBackend for BranchAndBound {
    #[tracing::instrument(
        name = "branch_and_bound",
        skip_all,
        fields(rows = program.num_rows(), vars = program.num_vars())
    )]
    fn solve(
        &self,
        program: &IntegerProgram,
        config: &MilpConfig,
    ) -> Result<BackendOutcome, BackendError> {
        program.validate()?;
        if let Some(r) = program.row_bounds.iter().position(|b| !b.is_equality()) {
            return Err(BackendError::Unsupported(format!(
                "row {r} is not an equality constraint"
            )));
        }
        if let Some(c) = program
            .var_bounds
            .iter()
            .position(|b| !b.lower.is_finite())
        {
            return Err(BackendError::Unsupported(format!(
                "variable {c} has no finite lower bound"
            )));
        }

        let rhs = DVector::from_iterator(
            program.num_rows(),
            program.row_bounds.iter().map(|b| b.lower),
        );

        let start = Instant::now();
        let mut nodes = 0usize;
        let mut best_cost = f64::MAX;
        let mut best_sol: Option<Vec<f64>> = None;

        let mut stack = vec![BranchNode {
            lower_bounds: program.var_bounds.iter().map(|b| b.lower).collect(),
            upper_bounds: program.var_bounds.iter().map(|b| b.upper).collect(),
        }];

        while let Some(node) = stack.pop() {
            nodes += 1;
            if nodes > config.node_limit {
                return Err(BackendError::NodeLimit {
                    limit: config.node_limit,
                });
            }
            if start.elapsed() >= config.time_limit {
                return Err(BackendError::TimedOut {
                    limit_ms: config.time_limit.as_millis(),
                    nodes,
                });
            }

            // Construct the relaxed LP system for this node
            let Some((lp, shift_cost)) = build_relaxed_system(program, &rhs, &node) else {
                continue; // Crossed bounds
            };

            let sol = match simplex::solve(&lp, config.iteration_limit)? {
                LpOutcome::Optimal(sol) => sol,
                LpOutcome::Infeasible => continue,
                LpOutcome::Unbounded => return Err(BackendError::Unbounded),
            };

            // Pruning: Bound check
            let total_cost = sol.cost + shift_cost;
            if total_cost >= best_cost - PRUNING_TOLERANCE {
                continue;
            }

            let (full_x, first_fractional) =
                map_solution_to_original(&sol.x, &node, &program.integrality);

            match first_fractional {
                Some((idx, val)) => {
                    trace!(nodes, var = idx, value = val, "branching");

                    // Branch 1: x <= floor
                    let mut left = node.clone();
                    let current_ub = left.upper_bounds[idx].unwrap_or(f64::MAX);
                    left.upper_bounds[idx] = Some(current_ub.min(val.floor()));

                    // Branch 2: x >= ceil
                    let mut right = node;
                    right.lower_bounds[idx] = right.lower_bounds[idx].max(val.ceil());

                    stack.push(left);
                    stack.push(right);
                }
                None if residual_ok(program, &rhs, &full_x) => {
                    debug!(nodes, cost = total_cost, "new incumbent");
                    best_cost = total_cost;
                    best_sol = Some(full_x);
                }
                None => trace!(nodes, "integral candidate failed residual check"),
            }
        }

        debug!(nodes, elapsed = ?start.elapsed(), found = best_sol.is_some(), "search finished");
        Ok(best_sol.map_or(BackendOutcome::Infeasible, BackendOutcome::Feasible))
    }
}

/// Shifts lower bounds into the right-hand side and adds a slack row per upper bound.
fn build_relaxed_system(
    program: &IntegerProgram,
    rhs: &DVector<f64>,
    node: &BranchNode,
) -> Option<(StandardForm, f64)> {
    let (m, n) = program.matrix.shape();
    let mut b = rhs.clone();
    let mut shift_cost = 0.0;

    // Apply Lower Bounds: b' = b - A * lb
    for c in 0..n {
        let lb = node.lower_bounds[c];
        if lb != 0.0 {
            b -= program.matrix.column(c) * lb;
            shift_cost += lb * program.objective[c];
        }
    }

    // Apply Upper Bounds: x_shifted + slack = UB - LB
    let mut slack_constraints = Vec::new();
    for c in 0..n {
        if let Some(ub) = node.upper_bounds[c] {
            let limit = ub - node.lower_bounds[c];
            if limit < -INTEGRALITY_TOLERANCE {
                return None;
            }
            slack_constraints.push((c, limit.max(0.0)));
        }
    }

    let added = slack_constraints.len();
    let mut a = DMatrix::zeros(m + added, n + added);
    a.view_mut((0, 0), (m, n)).copy_from(&program.matrix);
    let mut b = b.resize_vertically(m + added, 0.0);
    let c = program.objective.clone().resize_vertically(n + added, 0.0);

    for (i, &(var_idx, limit)) in slack_constraints.iter().enumerate() {
        let r = m + i;
        a[(r, var_idx)] = 1.0;
        a[(r, n + i)] = 1.0;
        b[r] = limit;
    }

    Some((StandardForm { a, b, c }, shift_cost))
}

/// Undoes the lower bound shift and finds the first integer variable that is fractional.
fn map_solution_to_original(
    x: &DVector<f64>,
    node: &BranchNode,
    integrality: &[bool],
) -> (Vec<f64>, Option<(usize, f64)>) {
    let n = node.lower_bounds.len();
    let full_x: Vec<f64> = (0..n).map(|c| x[c] + node.lower_bounds[c]).collect();

    let first_fractional = full_x
        .iter()
        .enumerate()
        .filter(|&(c, _)| integrality[c])
        .find(|&(_, &val)| (val - val.round()).abs() > INTEGRALITY_TOLERANCE)
        .map(|(c, &val)| (c, val));

    (full_x, first_fractional)
}

/// Integer variables are rounded before the equality rows are re-checked.
fn residual_ok(program: &IntegerProgram, rhs: &DVector<f64>, x: &[f64]) -> bool {
    let x = DVector::from_iterator(
        x.len(),
        x.iter()
            .zip(&program.integrality)
            .map(|(&v, &int)| if int { v.round() } else { v }),
    );
    let lhs = &program.matrix * x;
    lhs.iter()
        .zip(rhs.iter())
        .all(|(l, r)| (l - r).abs() <= RESIDUAL_TOLERANCE)
}
