//! Simulation configuration.

use tracing::warn;

/// Environment variable overriding [`SimConfig::max_idle_ticks`].
pub const MAX_IDLE_TICKS_VAR: &str = "METRO_MAX_IDLE_TICKS";

/// Environment variable overriding [`SimConfig::max_ticks`].
pub const MAX_TICKS_VAR: &str = "METRO_MAX_TICKS";

/// Limits that stop a run which can no longer finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Consecutive ticks in which no train changes station or finishes
    /// before the run is declared stalled.
    pub max_idle_ticks: usize,

    /// Total ticks allowed before the run is declared stalled.
    pub max_ticks: usize,
}

impl SimConfig {
    /// Create a new configuration with the given limits.
    pub fn new(max_idle_ticks: usize, max_ticks: usize) -> Self {
        Self {
            max_idle_ticks,
            max_ticks,
        }
    }

    /// Default configuration overlaid with `METRO_MAX_IDLE_TICKS` and
    /// `METRO_MAX_TICKS` from the environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    ///
    /// Values that are not non-negative integers are ignored with a warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) = parse_override(MAX_IDLE_TICKS_VAR, lookup(MAX_IDLE_TICKS_VAR)) {
            self.max_idle_ticks = n;
        }
        if let Some(n) = parse_override(MAX_TICKS_VAR, lookup(MAX_TICKS_VAR)) {
            self.max_ticks = n;
        }
        self
    }

    /// A copy with both limits raised by `extra` ticks.
    pub fn extended(&self, extra: usize) -> Self {
        Self {
            max_idle_ticks: self.max_idle_ticks.saturating_add(extra),
            max_ticks: self.max_ticks.saturating_add(extra),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_idle_ticks: 8,
            max_ticks: 100_000,
        }
    }
}

fn parse_override(key: &str, value: Option<String>) -> Option<usize> {
    let value = value?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %value, "ignoring non-numeric override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = SimConfig::default();

        assert_eq!(config.max_idle_ticks, 8);
        assert_eq!(config.max_ticks, 100_000);
    }

    #[test]
    fn custom_config() {
        let config = SimConfig::new(3, 50);

        assert_eq!(config.max_idle_ticks, 3);
        assert_eq!(config.max_ticks, 50);
    }

    #[test]
    fn overrides_apply() {
        let env = HashMap::from([
            (MAX_IDLE_TICKS_VAR, "12".to_string()),
            (MAX_TICKS_VAR, " 400 ".to_string()),
        ]);
        let config = SimConfig::default().with_overrides(|k| env.get(k).cloned());

        assert_eq!(config, SimConfig::new(12, 400));
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let env = HashMap::from([(MAX_TICKS_VAR, "lots".to_string())]);
        let config = SimConfig::default().with_overrides(|k| env.get(k).cloned());

        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn extended_raises_both_limits() {
        let config = SimConfig::new(2, 10).extended(5);

        assert_eq!(config, SimConfig::new(7, 15));
        assert_eq!(SimConfig::new(1, usize::MAX).extended(1).max_ticks, usize::MAX);
    }
}
