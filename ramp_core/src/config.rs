//! Runtime configuration types for the ramp controller.
//!
//! These are separate from the TOML-deserialized config in `ramp_config`;
//! see `conversions` for the mapping.

use std::path::PathBuf;
use std::time::Duration;

/// Which side of the target counts as "close enough".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Anything at or above `target - tolerance` (overshoot allowed).
    Increasing,
    /// Anything at or below `target + tolerance` (undershoot allowed).
    Decreasing,
    /// Two-sided band `target ± tolerance`.
    None,
}

/// Ramp parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RampCfg {
    /// Total ramp duration in minutes.
    pub total_time_min: f64,
    pub start_c: f64,
    pub final_c: f64,
    pub increasing: bool,
    /// Hold `final_c` after the ramp instead of powering down and disconnecting.
    pub keep_heating: bool,
    /// Step size magnitude in °C.
    pub delta_c: f64,
}

impl RampCfg {
    pub fn direction(&self) -> Direction {
        if self.increasing {
            Direction::Increasing
        } else {
            Direction::Decreasing
        }
    }
}

impl Default for RampCfg {
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

/// Initial stabilization parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizeCfg {
    /// Settle time after the sensor first enters the band.
    pub wait: Duration,
    /// Band half-width in °C.
    pub tolerance_c: f64,
}

impl Default for StabilizeCfg {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(120),
            tolerance_c: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCfg {
    pub stir_rate_rpm: u32,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self { stir_rate_rpm: 600 }
    }
}

/// Bounded retry with exponential backoff for device interactions.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts including the first; 1 disables retrying.
    pub max_attempts: u32,
    pub backoff: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
            backoff_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogCfg {
    pub path: PathBuf,
    pub truncate_on_start: bool,
}
