use miette::Result;
use rayon::prelude::*;
use tracing::warn;

use crate::config::SolverConfig;
use crate::milp::BranchAndBound;
use crate::parser;
use crate::report::{self, Summary};

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    process_with(input, &SolverConfig::default())
}

/// Sum of the fewest presses over every machine whose joltage target is reachable.
#[tracing::instrument(skip(input))]
pub fn process_with(input: &str, config: &SolverConfig) -> Result<String> {
    let machines = parser::parse(input)?;

    let total: u64 = machines
        .par_iter()
        .enumerate()
        .filter_map(|(i, m)| Some((i, m.solve_increment(&BranchAndBound, config)?)))
        .map(|(i, result)| match result {
            Ok(solution) => solution.cost(),
            Err(e) => {
                warn!(machine = i, error = %e, "joltage left unsolved");
                0
            }
        })
        .sum();

    Ok(total.to_string())
}

/// Both variants for every machine, folded into a [`Summary`].
#[tracing::instrument(skip(input))]
pub fn summarize(input: &str, config: &SolverConfig) -> Result<Summary> {
    let machines = parser::parse(input)?;
    let reports = report::solve_all(&machines, &BranchAndBound, config);
    Ok(Summary::from_reports(&reports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("33", process(input)?);
        Ok(())
    }

    #[test]
    fn summary_agrees_with_the_totals() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}
[..] (0) {5,1}";
        let summary = summarize(input, &SolverConfig::default())?;
        assert_eq!(summary.increment_presses.to_string(), process(input)?);
        assert_eq!(summary.increment_presses, 33);
        assert_eq!(summary.increment_solved, 3);
        assert_eq!(summary.increment_unsolved, 1);
        assert_eq!(summary.toggle_presses, 7);
        Ok(())
    }

    #[test]
    fn machines_without_joltage_are_skipped() -> Result<()> {
        let input = "[.] (0) {4}\n[#] (0)\n[..] (0) {5,1}";
        assert_eq!("4", process(input)?);
        Ok(())
    }
}
