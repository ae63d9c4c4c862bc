//! Host configuration loaded from environment variables.
//!
//! Every setting has a default so the host runs with zero configuration.

use std::time::Duration;

use chronocode_shared::constants::{
    DEFAULT_INACTIVITY_TIMEOUT_MS, DEFAULT_MAX_USERS, DEFAULT_SESSION_ID,
    DEFAULT_SWEEP_INTERVAL_SECS,
};

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Capacity of rooms created without an explicit one.
    /// Env: `CHRONOCODE_MAX_USERS`
    /// Default: `8`
    pub max_users: usize,

    /// Presence entries not refreshed for longer than this are evicted.
    /// Env: `CHRONOCODE_INACTIVITY_TIMEOUT_MS`
    /// Default: `30000`
    pub inactivity_timeout_ms: i64,

    /// Period of the inactivity sweep.
    /// Env: `CHRONOCODE_SWEEP_INTERVAL_SECS`
    /// Default: `10`
    pub sweep_interval: Duration,

    /// Session recorded for notifications that name none.
    /// Env: `CHRONOCODE_DEFAULT_SESSION`
    /// Default: `"default"`
    pub default_session: String,

    /// Print the serialized session to stdout once input ends.
    /// Env: `CHRONOCODE_EXPORT_ON_EXIT` (true/false)
    /// Default: `false`
    pub export_on_exit: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_MAX_USERS,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            default_session: DEFAULT_SESSION_ID.to_string(),
            export_on_exit: false,
        }
    }
}

impl HostConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("CHRONOCODE_MAX_USERS") {
            match val.parse::<usize>() {
                Ok(n) => config.max_users = n,
                Err(_) => tracing::warn!(
                    value = %val,
                    "Invalid CHRONOCODE_MAX_USERS, using default"
                ),
            }
        }

        if let Some(val) = lookup("CHRONOCODE_INACTIVITY_TIMEOUT_MS") {
            match val.parse::<i64>() {
                Ok(ms) if ms >= 0 => config.inactivity_timeout_ms = ms,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid CHRONOCODE_INACTIVITY_TIMEOUT_MS, using default"
                ),
            }
        }

        if let Some(val) = lookup("CHRONOCODE_SWEEP_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.sweep_interval = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid CHRONOCODE_SWEEP_INTERVAL_SECS, using default"
                ),
            }
        }

        if let Some(session) = lookup("CHRONOCODE_DEFAULT_SESSION") {
            if !session.is_empty() {
                config.default_session = session;
            }
        }

        if let Some(val) = lookup("CHRONOCODE_EXPORT_ON_EXIT") {
            config.export_on_exit = val == "true" || val == "1";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert_eq!(config.max_users, 8);
        assert_eq!(config.inactivity_timeout_ms, 30_000);
        assert_eq!(config.sweep_interval, Duration::from_secs(10));
        assert_eq!(config.default_session, "default");
        assert!(!config.export_on_exit);
        assert_eq!(config_from(&[]), config);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CHRONOCODE_MAX_USERS", "4"),
            ("CHRONOCODE_INACTIVITY_TIMEOUT_MS", "5000"),
            ("CHRONOCODE_SWEEP_INTERVAL_SECS", "2"),
            ("CHRONOCODE_DEFAULT_SESSION", "agent-7"),
            ("CHRONOCODE_EXPORT_ON_EXIT", "true"),
        ]);
        assert_eq!(config.max_users, 4);
        assert_eq!(config.inactivity_timeout_ms, 5_000);
        assert_eq!(config.sweep_interval, Duration::from_secs(2));
        assert_eq!(config.default_session, "agent-7");
        assert!(config.export_on_exit);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            ("CHRONOCODE_MAX_USERS", "lots"),
            ("CHRONOCODE_INACTIVITY_TIMEOUT_MS", "-1"),
            ("CHRONOCODE_SWEEP_INTERVAL_SECS", "0"),
            ("CHRONOCODE_DEFAULT_SESSION", ""),
            ("CHRONOCODE_EXPORT_ON_EXIT", "yes please"),
        ]);
        assert_eq!(config, HostConfig::default());
    }
}
