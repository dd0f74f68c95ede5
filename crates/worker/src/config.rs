use std::time::Duration;

/// Default sweep interval: once a day.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Time between overdue sweeps.
    pub sweep_interval: Duration,
    /// Sweep once immediately at startup instead of waiting a full interval.
    pub sweep_on_start: bool,
    /// How long shutdown waits for the notification dispatcher to drain.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            sweep_on_start: true,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default  |
    /// |-------------------------------|----------|
    /// | `OVERDUE_SWEEP_INTERVAL_SECS` | `86400`  |
    /// | `OVERDUE_SWEEP_ON_START`      | `true`   |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`     |
    pub fn from_env() -> Self {
        let sweep_interval_secs: u64 = std::env::var("OVERDUE_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse()
            .expect("OVERDUE_SWEEP_INTERVAL_SECS must be a valid u64");
        assert!(
            sweep_interval_secs > 0,
            "OVERDUE_SWEEP_INTERVAL_SECS must be greater than zero"
        );

        let sweep_on_start = std::env::var("OVERDUE_SWEEP_ON_START")
            .map(|v| parse_flag(&v).expect("OVERDUE_SWEEP_ON_START must be true or false"))
            .unwrap_or(true);

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            sweep_on_start,
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sweep_daily_and_on_start() {
        let config = WorkerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(86_400));
        assert!(config.sweep_on_start);
    }

    #[test]
    fn test_flags_accept_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
