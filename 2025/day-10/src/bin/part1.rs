use miette::*;
use tracing_subscriber::EnvFilter;

use aoc2025_day_10_factory::{part1, SolverConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "input.txt".into());
    let input = std::fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {path}"))?;

    let config = SolverConfig::from_env()?;
    let result = part1::process_with(&input, &config)?;
    println!("Result: {}", result);
    Ok(())
}
