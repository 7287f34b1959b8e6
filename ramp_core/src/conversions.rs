//! `From` implementations bridging `ramp_config` types to `ramp_core` types.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DeviceCfg, LogCfg, RampCfg, RetryPolicy, StabilizeCfg};

// ── RampCfg ──────────────────────────────────────────────────────────────────

impl From<&ramp_config::RampSection> for RampCfg {
    fn from(c: &ramp_config::RampSection) -> Self {
        Self {
            total_time_min: c.total_time_min,
            start_c: c.start_c,
            final_c: c.final_c,
            increasing: c.increasing,
            keep_heating: c.keep_heating,
            delta_c: c.delta_c,
        }
    }
}

// ── StabilizeCfg ─────────────────────────────────────────────────────────────

impl From<&ramp_config::Stabilization> for StabilizeCfg {
    fn from(c: &ramp_config::Stabilization) -> Self {
        Self {
            wait: Duration::from_secs(c.wait_s),
            tolerance_c: c.tolerance_c,
        }
    }
}

// ── DeviceCfg ────────────────────────────────────────────────────────────────

impl From<&ramp_config::Device> for DeviceCfg {
    fn from(c: &ramp_config::Device) -> Self {
        Self {
            stir_rate_rpm: c.stir_rate_rpm,
        }
    }
}

// ── RetryPolicy ──────────────────────────────────────────────────────────────

impl From<&ramp_config::Retry> for RetryPolicy {
    fn from(c: &ramp_config::Retry) -> Self {
        Self {
            max_attempts: c.max_attempts,
            backoff: Duration::from_millis(c.backoff_ms),
            backoff_factor: c.backoff_factor,
        }
    }
}

// ── LogCfg ───────────────────────────────────────────────────────────────────

impl From<&ramp_config::RampLog> for LogCfg {
    fn from(c: &ramp_config::RampLog) -> Self {
        Self {
            path: PathBuf::from(&c.path),
            truncate_on_start: c.truncate_on_start,
        }
    }
}
