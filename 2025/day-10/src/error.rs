use miette::Diagnostic;
use thiserror::Error;

/// Why a toggle puzzle has no reported solution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ToggleError {
    #[error("the light pattern is unreachable: elimination produced 0 = 1")]
    #[diagnostic(code(factory::toggle::inconsistent))]
    Inconsistent,

    #[error("{free} free variables exceed the enumeration limit of {limit}")]
    #[diagnostic(
        code(factory::toggle::too_many_free_variables),
        help("raise `max_free_variables` or use a dedicated minimum-weight search")
    )]
    TooManyFreeVariables { free: usize, limit: usize },

    #[error("no assignment of the free variables replayed to the target pattern")]
    #[diagnostic(code(factory::toggle::no_verified_candidate))]
    NoVerifiedCandidate,
}

/// Why an increment puzzle has no reported solution.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum IncrementError {
    #[error("no nonnegative integer press counts reach the joltage target")]
    #[diagnostic(code(factory::increment::infeasible))]
    Infeasible,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Backend(#[from] BackendError),

    #[error("backend solution rounds to {counts:?}, which does not replay to the target")]
    #[diagnostic(code(factory::increment::rounding_mismatch))]
    RoundingMismatch { counts: Vec<i64> },
}

/// Failures of the integer programming backend itself.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BackendError {
    #[error("time limit of {limit_ms} ms exceeded after {nodes} nodes")]
    #[diagnostic(code(factory::milp::timed_out))]
    TimedOut { limit_ms: u128, nodes: usize },

    #[error("node limit of {limit} exceeded")]
    #[diagnostic(code(factory::milp::node_limit))]
    NodeLimit { limit: usize },

    #[error("simplex did not converge within {limit} pivots")]
    #[diagnostic(code(factory::milp::iteration_limit))]
    IterationLimit { limit: usize },

    #[error("the relaxation is unbounded")]
    #[diagnostic(code(factory::milp::unbounded))]
    Unbounded,

    #[error("unsupported model: {0}")]
    #[diagnostic(code(factory::milp::unsupported))]
    Unsupported(String),

    #[error("dimension mismatch: {0}")]
    #[diagnostic(code(factory::milp::dimension_mismatch))]
    DimensionMismatch(String),

    #[error("backend returned a non-finite value for button {index}")]
    #[diagnostic(code(factory::milp::non_finite))]
    NonFinite { index: usize },
}
