use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::error::{IncrementError, ToggleError};
use crate::milp::MilpBackend;
use crate::model::{IncrementSolution, Puzzle, ToggleSolution};

/// Outcome of the toggle variant for one machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleReport {
    pub solved: bool,
    pub min_presses: Option<usize>,
    pub pressed_buttons: Option<Vec<usize>>,
    /// Why the machine was left unsolved. Informational only.
    pub failure: Option<ToggleError>,
}

impl From<Result<ToggleSolution, ToggleError>> for ToggleReport {
    fn from(result: Result<ToggleSolution, ToggleError>) -> Self {
        match result {
            Ok(solution) => Self {
                solved: true,
                min_presses: Some(solution.weight()),
                pressed_buttons: Some(solution.pressed_buttons()),
                failure: None,
            },
            Err(e) => Self {
                solved: false,
                min_presses: None,
                pressed_buttons: None,
                failure: Some(e),
            },
        }
    }
}

/// Outcome of the increment variant for one machine.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementReport {
    pub solved: bool,
    pub total_presses: Option<u64>,
    pub per_button_counts: Option<Vec<u64>>,
    /// Why the machine was left unsolved. Informational only.
    pub failure: Option<IncrementError>,
}

impl From<Result<IncrementSolution, IncrementError>> for IncrementReport {
    fn from(result: Result<IncrementSolution, IncrementError>) -> Self {
        match result {
            Ok(solution) => Self {
                solved: true,
                total_presses: Some(solution.cost()),
                per_button_counts: Some(solution.into_counts()),
                failure: None,
            },
            Err(e) => Self {
                solved: false,
                total_presses: None,
                per_button_counts: None,
                failure: Some(e),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleReport {
    pub toggle: ToggleReport,
    /// `None` for machines without a joltage target.
    pub increment: Option<IncrementReport>,
}

impl Puzzle {
    /// Runs both variants and records their outcomes.
    pub fn solve<B: MilpBackend + ?Sized>(
        &self,
        backend: &B,
        config: &SolverConfig,
    ) -> PuzzleReport {
        PuzzleReport {
            toggle: self.solve_toggle(config).into(),
            increment: self.solve_increment(backend, config).map(Into::into),
        }
    }
}

/// Solves every machine in parallel, returning reports in input order.
pub fn solve_all<B: MilpBackend + Sync + ?Sized>(
    puzzles: &[Puzzle],
    backend: &B,
    config: &SolverConfig,
) -> Vec<PuzzleReport> {
    solve_all_with(puzzles, backend, config, || {})
}

/// Like [`solve_all`], calling `on_solved` once per finished machine.
pub fn solve_all_with<B, F>(
    puzzles: &[Puzzle],
    backend: &B,
    config: &SolverConfig,
    on_solved: F,
) -> Vec<PuzzleReport>
where
    B: MilpBackend + Sync + ?Sized,
    F: Fn() + Sync,
{
    puzzles
        .par_iter()
        .map(|p| {
            let report = p.solve(backend, config);
            on_solved();
            report
        })
        .collect()
}

/// Totals across a batch of machines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub toggle_solved: usize,
    pub toggle_unsolved: usize,
    pub toggle_presses: u64,
    pub increment_solved: usize,
    pub increment_unsolved: usize,
    pub increment_presses: u64,
}

impl Summary {
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a PuzzleReport>) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.add(report);
        }
        summary
    }

    pub fn add(&mut self, report: &PuzzleReport) {
        match report.toggle.min_presses {
            Some(presses) => {
                self.toggle_solved += 1;
                self.toggle_presses += presses as u64;
            }
            None => self.toggle_unsolved += 1,
        }

        match report.increment.as_ref().map(|r| r.total_presses) {
            Some(Some(presses)) => {
                self.increment_solved += 1;
                self.increment_presses += presses;
            }
            Some(None) => self.increment_unsolved += 1,
            None => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Part 1 (toggle):")?;
        writeln!(
            f,
            "  solved {} / {}",
            self.toggle_solved,
            self.toggle_solved + self.toggle_unsolved
        )?;
        writeln!(f, "  total presses {}", self.toggle_presses)?;

        let attempted = self.increment_solved + self.increment_unsolved;
        if attempted > 0 {
            writeln!(f, "Part 2 (increment):")?;
            writeln!(f, "  solved {} / {}", self.increment_solved, attempted)?;
            writeln!(f, "  total presses {}", self.increment_presses)?;
        }
        Ok(())
    }
}

impl fmt::Display for PuzzleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.toggle.pressed_buttons, &self.toggle.failure) {
            (Some(pressed), _) => write!(
                f,
                "toggle {} [{}]",
                pressed.len(),
                pressed.iter().join(",")
            )?,
            (None, Some(e)) => write!(f, "toggle unsolved ({e})")?,
            (None, None) => write!(f, "toggle unsolved")?,
        }

        if let Some(inc) = &self.increment {
            match (&inc.per_button_counts, &inc.failure) {
                (Some(counts), _) => write!(
                    f,
                    ", increment {} [{}]",
                    inc.total_presses.unwrap_or_default(),
                    counts.iter().join(",")
                )?,
                (None, Some(e)) => write!(f, ", increment unsolved ({e})")?,
                (None, None) => write!(f, ", increment unsolved")?,
            }
        }
        Ok(())
    }
}
