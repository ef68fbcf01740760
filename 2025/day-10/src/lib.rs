pub mod config;
pub mod error;
pub mod gf2;
pub mod increment;
pub mod milp;
pub mod model;
pub mod parser;
pub mod part1;
pub mod part2;
pub mod report;
pub mod toggle;
pub mod verify;

pub use config::{MilpConfig, SolverConfig};
pub use error::{BackendError, IncrementError, ToggleError};
pub use model::{Button, IncrementSolution, Puzzle, ToggleSolution};
