//! Per-machine breakdown of both variants plus the batch summary.

use indicatif::{ProgressBar, ProgressStyle};
use miette::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aoc2025_day_10_factory::milp::BranchAndBound;
use aoc2025_day_10_factory::report::{self, Summary};
use aoc2025_day_10_factory::{parser, SolverConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "input.txt".into());
    let input = std::fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {path}"))?;

    let config = SolverConfig::from_env()?;
    let machines = parser::parse(&input)?;
    info!(machines = machines.len(), "solving");

    let progress = ProgressBar::new(machines.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} machines ({elapsed})")
            .into_diagnostic()?,
    );

    let reports = report::solve_all_with(&machines, &BranchAndBound, &config, || progress.inc(1));
    progress.finish_and_clear();

    for (i, report) in reports.iter().enumerate() {
        println!("machine {i}: {report}");
    }
    println!();
    print!("{}", Summary::from_reports(&reports));
    Ok(())
}
