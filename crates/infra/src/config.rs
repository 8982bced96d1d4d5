//! Runtime configuration, read from `SHELFWATCH_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use shelfwatch_inventory::ReconcileConfig;

use crate::workers::LoopSettings;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub tick_interval: Duration,
    pub max_observations_per_tick: usize,
    pub mismatch_tolerance: u32,
    pub forecast_horizon_days: i64,
    pub trend_days: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            max_observations_per_tick: 64,
            mismatch_tolerance: 0,
            forecast_horizon_days: 30,
            trend_days: 7,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            tick_interval: Duration::from_millis(parse_or(
                &lookup,
                "SHELFWATCH_TICK_MS",
                defaults.tick_interval.as_millis() as u64,
            )?),
            max_observations_per_tick: parse_or(
                &lookup,
                "SHELFWATCH_MAX_OBSERVATIONS_PER_TICK",
                defaults.max_observations_per_tick,
            )?,
            mismatch_tolerance: parse_or(
                &lookup,
                "SHELFWATCH_MISMATCH_TOLERANCE",
                defaults.mismatch_tolerance,
            )?,
            forecast_horizon_days: parse_or(
                &lookup,
                "SHELFWATCH_FORECAST_HORIZON_DAYS",
                defaults.forecast_horizon_days,
            )?,
            trend_days: parse_or(&lookup, "SHELFWATCH_TREND_DAYS", defaults.trend_days)?,
        })
    }

    pub fn reconcile(&self) -> ReconcileConfig {
        ReconcileConfig::default().with_mismatch_tolerance(self.mismatch_tolerance)
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            tick_interval: self.tick_interval,
            max_observations_per_tick: self.max_observations_per_tick,
            start_paused: false,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            tracing::warn!(key, value = %raw, "invalid configuration value");
            ConfigError::Invalid { key, value: raw }
        }),
    }
}
