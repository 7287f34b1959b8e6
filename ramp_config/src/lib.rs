#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the heat-ramp controller.
//!
//! - `Config` and its sections are deserialized from TOML; every section is
//!   optional and defaults to the stock ramp (25 → 45 °C over 60 min in 2 °C
//!   steps, 120 s settle, ±0.2 °C tolerance).
//! - `validate()` rejects values the controller cannot run with. It is meant
//!   to be called before any device is touched.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RampSection {
    /// Total ramp duration in minutes.
    pub total_time_min: f64,
    pub start_c: f64,
    pub final_c: f64,
    /// Ramp direction. Must agree with the sign of `final_c - start_c`.
    pub increasing: bool,
    /// Hold the final temperature after the ramp instead of powering down.
    pub keep_heating: bool,
    /// Step size in °C (magnitude; direction comes from `increasing`).
    pub delta_c: f64,
}

impl Default for RampSection {
    fn default() -> Self {
        Self {
            total_time_min: 60.0,
            start_c: 25.0,
            final_c: 45.0,
            increasing: true,
            keep_heating: true,
            delta_c: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Stabilization {
    /// Settle time once the sensor first enters the tolerance band (seconds).
    pub wait_s: u64,
    /// Half-width of the "at target" band in °C. Also accepts `sensibility`.
    #[serde(alias = "sensibility")]
    pub tolerance_c: f64,
}

impl Default for Stabilization {
    fn default() -> Self {
        Self {
            wait_s: 120,
            tolerance_c: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Device {
    /// Serial port of the hotplate (e.g. "COM4", "/dev/ttyUSB0").
    pub port: String,
    pub baud_rate: u32,
    pub stir_rate_rpm: u32,
    /// Max time to wait for a sensor reply before the read counts as failed.
    pub read_timeout_ms: u64,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            port: "COM4".to_string(),
            baud_rate: 9600,
            stir_rate_rpm: 600,
            read_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Retry {
    /// Attempts per device interaction, including the first one.
    pub max_attempts: u32,
    pub backoff_ms: u64,
    /// Multiplier applied to the backoff after each failed attempt.
    pub backoff_factor: f64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
            backoff_factor: 2.0,
        }
    }
}

/// The ramp data log (tab-separated text), not the diagnostic log.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RampLog {
    pub path: String,
    /// Start a fresh file for each ramp instead of appending to the old one.
    pub truncate_on_start: bool,
}

impl Default for RampLog {
    fn default() -> Self {
        Self {
            path: "heat_ramp_log.txt".to_string(),
            truncate_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to diagnostic .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Runner {
    /// Poll granularity in seconds; cancellation is checked at this rate.
    pub poll_s: u64,
}

impl Default for Runner {
    fn default() -> Self {
        Self { poll_s: 1 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub ramp: RampSection,
    pub stabilization: Stabilization,
    pub device: Device,
    pub retry: Retry,
    pub log: RampLog,
    pub logging: Logging,
    pub runner: Runner,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))
}

/// Longest accepted ramp, in minutes.
pub const MAX_TOTAL_TIME_MIN: f64 = 7.0 * 24.0 * 60.0;
/// Most steps accepted in one ramp.
pub const MAX_STEPS: f64 = 100_000.0;
/// Retry limits. The controller also caps each backoff sleep at one minute.
pub const MAX_RETRY_ATTEMPTS: u32 = 20;
pub const MAX_BACKOFF_MS: u64 = 60_000;
pub const MAX_BACKOFF_FACTOR: f64 = 10.0;

fn finite(name: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name} must be a finite number");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Ramp
        let r = &self.ramp;
        finite("ramp.total_time_min", r.total_time_min)?;
        finite("ramp.start_c", r.start_c)?;
        finite("ramp.final_c", r.final_c)?;
        finite("ramp.delta_c", r.delta_c)?;
        if r.total_time_min <= 0.0 {
            eyre::bail!("ramp.total_time_min must be > 0");
        }
        if r.total_time_min > MAX_TOTAL_TIME_MIN {
            eyre::bail!("ramp.total_time_min must be <= {MAX_TOTAL_TIME_MIN} (one week)");
        }
        if r.delta_c == 0.0 {
            eyre::bail!("ramp.delta_c must be non-zero");
        }
        if r.start_c == r.final_c {
            eyre::bail!("ramp.start_c and ramp.final_c must differ");
        }
        if r.increasing != (r.final_c > r.start_c) {
            eyre::bail!(
                "ramp.increasing={} contradicts start_c={} -> final_c={}",
                r.increasing,
                r.start_c,
                r.final_c
            );
        }
        if !(-50.0..=400.0).contains(&r.start_c) || !(-50.0..=400.0).contains(&r.final_c) {
            eyre::bail!("ramp temperatures must be within [-50, 400] °C");
        }
        let steps = (r.final_c - r.start_c).abs() / r.delta_c.abs();
        if steps < 1.0 {
            eyre::bail!(
                "ramp.delta_c={} is larger than the {} °C span; at least one step is required",
                r.delta_c,
                (r.final_c - r.start_c).abs()
            );
        }
        if steps > MAX_STEPS {
            eyre::bail!("ramp.delta_c={} gives {steps} steps; at most {MAX_STEPS} allowed", r.delta_c);
        }

        // Stabilization
        finite("stabilization.tolerance_c", self.stabilization.tolerance_c)?;
        if self.stabilization.tolerance_c < 0.0 {
            eyre::bail!("stabilization.tolerance_c must be >= 0");
        }
        if self.stabilization.wait_s > 24 * 60 * 60 {
            eyre::bail!("stabilization.wait_s is unreasonably large (>24h)");
        }

        // Device
        if self.device.port.trim().is_empty() {
            eyre::bail!("device.port must not be empty");
        }
        if self.device.baud_rate == 0 {
            eyre::bail!("device.baud_rate must be > 0");
        }
        if self.device.read_timeout_ms == 0 {
            eyre::bail!("device.read_timeout_ms must be >= 1");
        }

        // Retry
        if self.retry.max_attempts == 0 {
            eyre::bail!("retry.max_attempts must be >= 1");
        }
        if self.retry.max_attempts > MAX_RETRY_ATTEMPTS {
            eyre::bail!("retry.max_attempts must be <= {MAX_RETRY_ATTEMPTS}");
        }
        if !(self.retry.backoff_factor.is_finite() && self.retry.backoff_factor >= 1.0) {
            eyre::bail!("retry.backoff_factor must be >= 1.0");
        }
        if self.retry.backoff_factor > MAX_BACKOFF_FACTOR {
            eyre::bail!("retry.backoff_factor must be <= {MAX_BACKOFF_FACTOR}");
        }
        if self.retry.backoff_ms > MAX_BACKOFF_MS {
            eyre::bail!("retry.backoff_ms must be <= {MAX_BACKOFF_MS}");
        }

        // Ramp log
        if self.log.path.trim().is_empty() {
            eyre::bail!("log.path must not be empty");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Runner
        if self.runner.poll_s == 0 {
            eyre::bail!("runner.poll_s must be >= 1");
        }

        Ok(())
    }
}
