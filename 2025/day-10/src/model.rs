use bitvec::prelude::*;
use itertools::Itertools;

use crate::config::SolverConfig;
use crate::error::{IncrementError, ToggleError};
use crate::milp::MilpBackend;
use crate::{increment, toggle};

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
pub type Row = BitVec<usize, Lsb0>;

/// A button wired to a set of positions.
///
/// The button's identifier is its index in the owning puzzle. Positions are kept
/// in first-seen order with duplicates removed, so a button affects each
/// position at most once per press in both the toggle and increment algebras.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Button {
    positions: Vec<usize>,
}

impl Button {
    pub fn new(positions: impl IntoIterator<Item = usize>) -> Self {
        Self {
            positions: positions.into_iter().unique().collect(),
        }
    }

    /// Every position this button was declared with, including out-of-range ones.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Positions that exist in a vector of `len` positions.
    /// Out-of-range indices are silently dropped.
    pub fn effects(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied().filter(move |&p| p < len)
    }
}

/// One machine: its light diagram, its buttons and an optional joltage target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Target pattern for the toggle variant.
    pub lights: Row,
    pub buttons: Vec<Button>,
    /// Target vector for the increment variant, when the puzzle has one.
    pub joltage: Option<Vec<u64>>,
}

impl Puzzle {
    pub fn new(lights: Row, buttons: Vec<Button>) -> Self {
        Self {
            lights,
            buttons,
            joltage: None,
        }
    }

    pub fn with_joltage(mut self, joltage: Vec<u64>) -> Self {
        self.joltage = Some(joltage);
        self
    }

    pub fn num_positions(&self) -> usize {
        self.lights.len()
    }

    pub fn num_buttons(&self) -> usize {
        self.buttons.len()
    }

    /// Fewest presses that light exactly `self.lights`.
    pub fn solve_toggle(&self, config: &SolverConfig) -> Result<ToggleSolution, ToggleError> {
        toggle::solve(&self.lights, &self.buttons, config)
    }

    /// Fewest presses that reach `self.joltage`, or `None` when the machine has no joltage.
    pub fn solve_increment<B: MilpBackend + ?Sized>(
        &self,
        backend: &B,
        config: &SolverConfig,
    ) -> Option<Result<IncrementSolution, IncrementError>> {
        let target = self.joltage.as_deref()?;
        Some(increment::solve(&self.buttons, target, backend, config))
    }
}

/// Button parities chosen by the toggle solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSolution {
    presses: Row,
}

impl ToggleSolution {
    pub fn new(presses: Row) -> Self {
        Self { presses }
    }

    pub fn presses(&self) -> &BitSlice<usize, Lsb0> {
        &self.presses
    }

    /// Hamming weight: how many buttons are pressed.
    pub fn weight(&self) -> usize {
        self.presses.count_ones()
    }

    pub fn pressed_buttons(&self) -> Vec<usize> {
        self.presses.iter_ones().collect()
    }

}

/// Press counts chosen by the increment solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementSolution {
    counts: Vec<u64>,
}

impl IncrementSolution {
    pub fn new(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn into_counts(self) -> Vec<u64> {
        self.counts
    }

    /// Total number of presses across all buttons.
    pub fn cost(&self) -> u64 {
        self.counts.iter().sum()
    }
}
