//! Type-state builder for `RampController` and the `build_controller` helper.
//!
//! `build()` only exists once a hotplate has been supplied; the ramp and log
//! settings are checked at build time and reported as `BuildError`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ramp_traits::{Clock, Hotplate, MonotonicClock};

use crate::config::{DeviceCfg, LogCfg, RampCfg, RetryPolicy, StabilizeCfg};
use crate::controller::RampController;
use crate::error::{BuildError, RampError, Result};
use crate::ramp_log::RampLog;
use crate::schedule::RampSchedule;
use crate::status::Phase;

/// Default interval between sensor polls.
pub const DEFAULT_POLL: Duration = Duration::from_secs(1);

/// Type-state marker: no hotplate yet.
pub struct Missing;

/// Builder for `RampController`.
pub struct RampBuilder<H> {
    device: H,
    ramp: Option<RampCfg>,
    stabilize: Option<StabilizeCfg>,
    device_cfg: Option<DeviceCfg>,
    retry: Option<RetryPolicy>,
    log: Option<LogCfg>,
    poll: Option<Duration>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl Default for RampBuilder<Missing> {
    fn default() -> Self {
        Self {
            device: Missing,
            ramp: None,
            stabilize: None,
            device_cfg: None,
            retry: None,
            log: None,
            poll: None,
            clock: None,
        }
    }
}

impl RampBuilder<Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Chainable setters that do not affect type-state.
impl<H> RampBuilder<H> {
    pub fn with_ramp(mut self, ramp: RampCfg) -> Self {
        self.ramp = Some(ramp);
        self
    }
    pub fn with_stabilization(mut self, stabilize: StabilizeCfg) -> Self {
        self.stabilize = Some(stabilize);
        self
    }
    pub fn with_device_cfg(mut self, device_cfg: DeviceCfg) -> Self {
        self.device_cfg = Some(device_cfg);
        self
    }
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
    pub fn with_log(mut self, log: LogCfg) -> Self {
        self.log = Some(log);
        self
    }
    /// Shorthand for `with_log` with truncation on start.
    pub fn with_log_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_log(LogCfg {
            path: path.into(),
            truncate_on_start: true,
        })
    }
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = Some(poll);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Supply the hotplate, advancing the type-state.
    pub fn with_device<D: Hotplate>(self, device: D) -> RampBuilder<D> {
        RampBuilder {
            device,
            ramp: self.ramp,
            stabilize: self.stabilize,
            device_cfg: self.device_cfg,
            retry: self.retry,
            log: self.log,
            poll: self.poll,
            clock: self.clock,
        }
    }
}

impl<H: Hotplate> RampBuilder<H> {
    /// Validate and construct. No device command is issued here.
    pub fn build(self) -> Result<RampController<H>> {
        let ramp = self
            .ramp
            .ok_or_else(|| eyre::Report::new(BuildError::MissingRamp))?;
        let log = self
            .log
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLog))?;
        let stabilize = self.stabilize.unwrap_or_default();
        let poll = self.poll.unwrap_or(DEFAULT_POLL);

        let schedule = RampSchedule::new(&ramp).map_err(eyre::Report::new)?;
        if !stabilize.tolerance_c.is_finite() || stabilize.tolerance_c < 0.0 {
            return Err(eyre::Report::new(RampError::Config(format!(
                "tolerance must be finite and >= 0 (got {})",
                stabilize.tolerance_c
            ))));
        }
        if poll.is_zero() {
            return Err(eyre::Report::new(RampError::Config(
                "poll interval must be > 0".into(),
            )));
        }
        if log.path.as_os_str().is_empty() {
            return Err(eyre::Report::new(BuildError::MissingLog));
        }
        if !ramp.increasing {
            tracing::warn!(
                start_c = ramp.start_c,
                final_c = ramp.final_c,
                "decreasing ramp: stepping continues only while sensor <= final_c, \
                 so the ramp will finish right after the initial stabilization"
            );
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(RampController {
            device: self.device,
            target_c: ramp.start_c,
            ramp,
            schedule,
            stabilize,
            device_cfg: self.device_cfg.unwrap_or_default(),
            retry: self.retry.unwrap_or_default(),
            truncate_log: log.truncate_on_start,
            log: RampLog::new(log.path),
            poll,
            clock,
            phase: Phase::Initializing,
            settling: false,
            began_at: None,
            aiming_since: None,
            start_time: None,
            waiting: Duration::ZERO,
            steps_logged: 0,
            last_sensor_c: None,
            log_failures: 0,
            ramp_elapsed: Duration::ZERO,
        })
    }
}

/// Build a controller from a loaded `ramp_config::Config`.
pub fn build_controller<H: Hotplate>(
    device: H,
    cfg: &ramp_config::Config,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
) -> Result<RampController<H>> {
    let mut builder = RampBuilder::new()
        .with_ramp(RampCfg::from(&cfg.ramp))
        .with_stabilization(StabilizeCfg::from(&cfg.stabilization))
        .with_device_cfg(DeviceCfg::from(&cfg.device))
        .with_retry(RetryPolicy::from(&cfg.retry))
        .with_log(LogCfg::from(&cfg.log))
        .with_poll_interval(Duration::from_secs(cfg.runner.poll_s));
    if let Some(clock) = clock {
        builder = builder.with_clock(clock);
    }
    builder.with_device(device).build()
}
