//! Command-line configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, ValueEnum};

use crate::{allocation::RewardMode, budget::Budget, sweep::OnFailure};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Which reward modes to optimise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeSelection {
    /// Base rewards only
    Standard,

    /// First-time bonus included
    Bonus,

    /// Both, side by side
    Both,
}

impl ModeSelection {
    /// Reward modes selected, standard first
    pub fn modes(self) -> &'static [RewardMode] {
        match self {
            Self::Standard => &[RewardMode::Standard],
            Self::Bonus => &[RewardMode::FirstTimeBonus],
            Self::Both => &[RewardMode::Standard, RewardMode::FirstTimeBonus],
        }
    }
}

/// Failure policy for sweeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Stop at the first failing budget
    Abort,

    /// Log and skip failing budgets
    Skip,
}

impl From<FailurePolicy> for OnFailure {
    fn from(policy: FailurePolicy) -> Self {
        match policy {
            FailurePolicy::Abort => OnFailure::Abort,
            FailurePolicy::Skip => OnFailure::Skip,
        }
    }
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Top-up allocation optimizer configuration
#[derive(Debug, Parser)]
#[command(
    name = "topup",
    about = "Find the reward-maximising way to spend a budget on top-up packs",
    long_about = None
)]
pub struct Config {
    /// Directory containing `catalogs/<name>.yml`
    #[arg(long, env = "TOPUP_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Catalog fixture name
    #[arg(short, long, env = "TOPUP_CATALOG", default_value = "genshin")]
    pub catalog: String,

    /// Optimise a single budget and print its allocation instead of sweeping
    #[arg(short, long)]
    pub budget: Option<Budget>,

    /// First budget of the sweep
    #[arg(long, default_value_t = 5)]
    pub start: u64,

    /// Exclusive upper bound of the sweep
    #[arg(long, default_value_t = 2000)]
    pub end: u64,

    /// Sweep increment
    #[arg(long, default_value_t = 5)]
    pub step: u64,

    /// Reward modes to optimise
    #[arg(short, long, value_enum, default_value_t = ModeSelection::Both)]
    pub mode: ModeSelection,

    /// What to do when a budget fails to optimise during a sweep
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_failure: FailurePolicy,

    /// Seconds a single solve may take before it counts as failed
    #[arg(long, env = "TOPUP_TIME_LIMIT")]
    pub time_limit: Option<f64>,

    /// Log every variable and constraint of the model at trace level (single budget only)
    #[arg(long)]
    pub trace_model: bool,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Time budget per solve, ignoring non-finite or negative values.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_sweep_both_modes() -> TestResult {
        let config = Config::try_parse_from(["topup"])?;

        assert_eq!(config.catalog, "genshin");
        assert_eq!((config.start, config.end, config.step), (5, 2000, 5));
        assert_eq!(config.mode.modes().len(), 2);
        assert!(config.budget.is_none());
        assert_eq!(config.logging.log_format, LogFormat::Compact);

        Ok(())
    }

    #[test]
    fn budget_flag_accepts_fractional_amounts() -> TestResult {
        let config = Config::try_parse_from(["topup", "--budget", "19.99", "--mode", "bonus"])?;

        assert_eq!(config.budget, Some("19.99".parse::<Budget>()?));
        assert_eq!(config.mode.modes(), &[RewardMode::FirstTimeBonus]);

        Ok(())
    }

    #[test]
    fn time_limit_converts_to_duration() -> TestResult {
        let config = Config::try_parse_from(["topup", "--time-limit", "1.5"])?;

        assert_eq!(config.time_limit(), Some(Duration::from_millis(1500)));

        let config = Config::try_parse_from(["topup", "--time-limit=-1"])?;

        assert_eq!(config.time_limit(), None);

        Ok(())
    }

    #[test]
    fn failure_policy_maps_to_sweep_policy() {
        assert_eq!(OnFailure::from(FailurePolicy::Skip), OnFailure::Skip);
        assert_eq!(OnFailure::from(FailurePolicy::Abort), OnFailure::Abort);
    }
}
