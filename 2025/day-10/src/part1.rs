use miette::Result;
use rayon::prelude::*;
use tracing::warn;

use crate::config::SolverConfig;
use crate::parser;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    process_with(input, &SolverConfig::default())
}

/// Sum of the fewest presses over every machine whose light pattern is reachable.
#[tracing::instrument(skip(input))]
pub fn process_with(input: &str, config: &SolverConfig) -> Result<String> {
    let machines = parser::parse(input)?;

    let total_presses: usize = machines
        .par_iter()
        .enumerate()
        .map(|(i, m)| match m.solve_toggle(config) {
            Ok(solution) => solution.weight(),
            Err(e) => {
                warn!(machine = i, error = %e, "lights left unsolved");
                0
            }
        })
        .sum();

    Ok(total_presses.to_string())
}
