//! Gaussian elimination over GF(2).
//!
//! The augmented matrix `[A | b]` stores one bit-packed row per light. Column
//! `c < num_vars` is button `c`; the last column is the target bit. Addition is
//! XOR, so eliminating a column is a single row XOR.

use bitvec::prelude::*;

use crate::error::ToggleError;
use crate::model::{Button, Row};

/// Augmented matrix `[A | b]` over GF(2), sized once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedMatrix {
    rows: Vec<Row>,
    num_vars: usize,
}

impl AugmentedMatrix {
    /// An all-zero matrix with `num_eqs` rows and `num_vars + 1` columns.
    pub fn zeros(num_eqs: usize, num_vars: usize) -> Self {
        Self {
            rows: vec![Row::repeat(false, num_vars + 1); num_eqs],
            num_vars,
        }
    }

    /// Builds `[A | b]` where `A[p][c]` is set when button `c` toggles light `p`.
    pub fn from_buttons(target: &BitSlice<usize, Lsb0>, buttons: &[Button]) -> Self {
        let num_eqs = target.len();
        let mut matrix = Self::zeros(num_eqs, buttons.len());

        for (c, button) in buttons.iter().enumerate() {
            for p in button.effects(num_eqs) {
                matrix.set(p, c, 1);
            }
        }
        for p in target.iter_ones() {
            matrix.set(p, matrix.num_vars, 1);
        }

        matrix
    }

    /// Writes `value mod 2` at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.rows[row].set(col, value % 2 == 1);
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row][col]
    }

    pub fn num_eqs(&self) -> usize {
        self.rows.len()
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Total column count, including the augmented column.
    pub fn num_cols(&self) -> usize {
        self.num_vars + 1
    }

    /// Coefficient part of a row, without the augmented bit.
    pub fn coefficients(&self, row: usize) -> &BitSlice<usize, Lsb0> {
        &self.rows[row][..self.num_vars]
    }

    /// The augmented (target) bit of a row.
    pub fn rhs(&self, row: usize) -> bool {
        self.rows[row][self.num_vars]
    }

    /// Reduces the matrix to Reduced Row Echelon Form.
    ///
    /// Pivots are always the earliest eligible row for the leftmost column, and
    /// each pivot row is XORed into every other row with a 1 in its column, so
    /// pivot rows end up containing only their own pivot and free columns.
    pub fn rref(mut self) -> Result<Echelon, ToggleError> {
        let mut pivot_cols = Vec::with_capacity(self.num_vars.min(self.num_eqs()));
        let mut free_cols = Vec::new();
        let mut pivot_row = 0;

        for c in 0..self.num_vars {
            let found = (pivot_row..self.num_eqs()).find(|&r| self.rows[r][c]);

            let Some(r) = found else {
                free_cols.push(c);
                continue;
            };

            self.rows.swap(pivot_row, r);

            // Clone pivot row to avoid multiple mutable borrows
            let pivot_vec = self.rows[pivot_row].clone();
            for (i, row) in self.rows.iter_mut().enumerate() {
                if i != pivot_row && row[c] {
                    *row ^= &pivot_vec;
                }
            }

            tracing::trace!(column = c, row = pivot_row, "pivot");
            pivot_cols.push(c);
            pivot_row += 1;
        }

        // 0 = 1 anywhere means the pattern is unreachable.
        let inconsistent = (0..self.num_eqs())
            .any(|r| self.coefficients(r).not_any() && self.rhs(r));
        if inconsistent {
            return Err(ToggleError::Inconsistent);
        }

        Ok(Echelon {
            matrix: self,
            pivot_cols,
            free_cols,
        })
    }
}

/// A consistent system in Reduced Row Echelon Form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echelon {
    matrix: AugmentedMatrix,
    /// `pivot_cols[r]` is the pivot column of row `r`.
    pivot_cols: Vec<usize>,
    /// Columns without a pivot, in discovery order.
    free_cols: Vec<usize>,
}

impl Echelon {
    pub fn matrix(&self) -> &AugmentedMatrix {
        &self.matrix
    }

    pub fn pivot_cols(&self) -> &[usize] {
        &self.pivot_cols
    }

    pub fn free_cols(&self) -> &[usize] {
        &self.free_cols
    }

    pub fn rank(&self) -> usize {
        self.pivot_cols.len()
    }

    /// Particular solution with every free variable at 0.
    ///
    /// Since each pivot row holds no other pivot column, the pivot variable
    /// simply takes the row's augmented bit.
    pub fn base_solution(&self) -> Row {
        let mut x = Row::repeat(false, self.matrix.num_vars());
        for (r, &c) in self.pivot_cols.iter().enumerate() {
            x.set(c, self.matrix.rhs(r));
        }
        x
    }

    /// Fills in every pivot variable of `x` from the free variables already set in it.
    ///
    /// `x[pivot] = b[r] ^ XOR(x[f] for free f with A[r][f] = 1)`. Pivot bits of
    /// `x` are never read, so rows can be evaluated in any order.
    pub fn back_substitute(&self, x: &mut BitSlice<usize, Lsb0>) {
        for (r, &pc) in self.pivot_cols.iter().enumerate() {
            let parity = self
                .matrix
                .coefficients(r)
                .iter_ones()
                .filter(|&c| c != pc && x[c])
                .count()
                % 2
                == 1;
            x.set(pc, self.matrix.rhs(r) ^ parity);
        }
    }
}
