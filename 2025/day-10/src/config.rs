use std::time::Duration;

use miette::{miette, Result};

/// Widest mask the toggle enumerator can represent.
pub const MASK_BITS: usize = u64::BITS as usize - 1;

const MAX_FREE_VARS_ENV: &str = "FACTORY_MAX_FREE_VARS";
const MILP_TIMEOUT_ENV: &str = "FACTORY_MILP_TIMEOUT_MS";

/// Knobs shared by both solvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Largest number of free GF(2) columns the enumerator will expand (2^k masks).
    pub max_free_variables: usize,
    pub milp: MilpConfig,
}

/// Budgets for the integer programming backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilpConfig {
    /// Wall-clock budget for one program.
    pub time_limit: Duration,
    /// Branch and bound nodes explored before giving up.
    pub node_limit: usize,
    /// Simplex pivots per relaxation.
    pub iteration_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_free_variables: 24,
            milp: MilpConfig::default(),
        }
    }
}

impl Default for MilpConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            node_limit: 200_000,
            iteration_limit: 5_000,
        }
    }
}

impl SolverConfig {
    /// Defaults overridden by `FACTORY_MAX_FREE_VARS` and `FACTORY_MILP_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_FREE_VARS_ENV) {
            let limit = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| miette!("{MAX_FREE_VARS_ENV}={raw:?}: {e}"))?;
            config = config.with_max_free_variables(limit);
        }

        if let Some(raw) = lookup(MILP_TIMEOUT_ENV) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| miette!("{MILP_TIMEOUT_ENV}={raw:?}: {e}"))?;
            config = config.with_time_limit(Duration::from_millis(ms));
        }

        Ok(config)
    }

    /// Clamped to [`MASK_BITS`].
    pub fn with_max_free_variables(mut self, limit: usize) -> Self {
        self.max_free_variables = limit.min(MASK_BITS);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.milp.time_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults() -> Result<()> {
        let config = SolverConfig::from_lookup(|key| match key {
            MAX_FREE_VARS_ENV => Some("12".into()),
            MILP_TIMEOUT_ENV => Some(" 250 ".into()),
            _ => None,
        })?;
        assert_eq!(config.max_free_variables, 12);
        assert_eq!(config.milp.time_limit, Duration::from_millis(250));
        assert_eq!(config.milp.node_limit, MilpConfig::default().node_limit);
        Ok(())
    }

    #[test]
    fn missing_keys_keep_defaults() -> Result<()> {
        assert_eq!(SolverConfig::from_lookup(|_| None)?, SolverConfig::default());
        Ok(())
    }

    #[test]
    fn malformed_value_is_an_error() {
        let config = SolverConfig::from_lookup(|key| {
            (key == MAX_FREE_VARS_ENV).then(|| "lots".to_string())
        });
        assert!(config.is_err());
    }

    #[test]
    fn free_variable_limit_is_clamped_to_mask_width() {
        let config = SolverConfig::default().with_max_free_variables(500);
        assert_eq!(config.max_free_variables, MASK_BITS);
    }
}
