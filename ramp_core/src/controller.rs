//! The ramp state machine (`RampController`).
//!
//! Each `step()` does a bounded amount of work (one sensor read plus at most a
//! few device commands) and tells the caller how long to wait before the next
//! call. All sleeping is left to the caller, which is where cancellation is
//! checked (see `runner`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use eyre::WrapErr;
use ramp_traits::{Clock, DeviceError, Hotplate};
use tracing::{debug, info, warn};

use crate::config::{DeviceCfg, Direction, RampCfg, RetryPolicy, StabilizeCfg};
use crate::error::{RampError, Result};
use crate::hw_error::{DeviceOp, map_hw_error};
use crate::proximity::is_near_target;
use crate::ramp_log::{FORMAT_COMMENT, LogEntry, RampLog};
use crate::retry::with_retry;
use crate::schedule::RampSchedule;
use crate::status::{Phase, RampReport, RampStatus};
use crate::util::{local_timestamp, parse_sensor_reading, whole_degrees};

pub struct RampController<H: Hotplate> {
    pub(crate) device: H,
    pub(crate) ramp: RampCfg,
    pub(crate) schedule: RampSchedule,
    pub(crate) stabilize: StabilizeCfg,
    pub(crate) device_cfg: DeviceCfg,
    pub(crate) retry: RetryPolicy,
    pub(crate) log: RampLog,
    pub(crate) truncate_log: bool,
    pub(crate) poll: Duration,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,

    pub(crate) phase: Phase,
    pub(crate) target_c: f64,
    pub(crate) settling: bool,
    pub(crate) began_at: Option<Instant>,
    pub(crate) aiming_since: Option<Instant>,
    pub(crate) start_time: Option<Instant>,
    /// Time spent off-target since the last logged step.
    pub(crate) waiting: Duration,
    pub(crate) steps_logged: u32,
    pub(crate) last_sensor_c: Option<f64>,
    pub(crate) log_failures: u32,
    pub(crate) ramp_elapsed: Duration,
}

impl<H: Hotplate> core::fmt::Debug for RampController<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RampController")
            .field("phase", &self.phase)
            .field("target_c", &self.target_c)
            .field("last_sensor_c", &self.last_sensor_c)
            .field("steps_logged", &self.steps_logged)
            .finish()
    }
}

impl<H: Hotplate> RampController<H> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current setpoint in °C (before truncation to whole degrees).
    pub fn target_c(&self) -> f64 {
        self.target_c
    }

    pub fn schedule(&self) -> &RampSchedule {
        &self.schedule
    }

    pub fn log(&self) -> &RampLog {
        &self.log
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        Arc::clone(&self.clock)
    }

    pub fn device(&self) -> &H {
        &self.device
    }

    /// Give the device handle back, e.g. to inspect a simulator after a run.
    pub fn into_device(self) -> H {
        self.device
    }

    pub fn report(&self) -> RampReport {
        RampReport {
            steps_logged: self.steps_logged,
            last_target_c: self.target_c,
            last_sensor_c: self.last_sensor_c,
            ramp_elapsed: self.ramp_elapsed,
            kept_heating: self.phase == Phase::Done && self.ramp.keep_heating,
            log_failures: self.log_failures,
        }
    }

    /// One iteration of the ramp.
    pub fn step(&mut self) -> Result<RampStatus> {
        match self.phase {
            Phase::Initializing => self.initialize(),
            Phase::Stabilizing => self.stabilize_step(),
            Phase::Stepping => self.ramp_step(),
            Phase::Finalizing => self.finalize(),
            Phase::Done => Ok(RampStatus::Finished(self.report())),
            Phase::Aborted => Err(eyre::Report::new(RampError::Cancelled)),
        }
    }

    /// Best-effort shutdown after cancellation or a fatal error: stop heating,
    /// stop stirring, disconnect, and note it in the ramp log. Errors are
    /// logged, not returned.
    pub fn abort(&mut self, reason: &str) {
        if matches!(self.phase, Phase::Done | Phase::Aborted) {
            return;
        }
        if let Some(began) = self.began_at {
            if let Err(e) = self.device.stop_heating() {
                warn!(error = %e, "stop_heating failed during abort");
            }
            if let Err(e) = self.device.stop_stirring() {
                warn!(error = %e, "stop_stirring failed during abort");
            }
            if let Err(e) = self.device.disconnect() {
                warn!(error = %e, "disconnect failed during abort");
            }
            let minutes = self.clock.secs_since(began) / 60.0;
            self.comment(&format!("Ramp {reason} after {minutes} minutes"));
        }
        warn!(reason, phase = ?self.phase, "ramp aborted");
        self.phase = Phase::Aborted;
    }

    // ── Private: phases ──────────────────────────────────────────────────────

    fn initialize(&mut self) -> Result<RampStatus> {
        self.began_at = Some(self.clock.now());
        let header = [
            format!("Starting new heat ramp on {}", local_timestamp()),
            format!(
                "total_time={}, start_T={}, final_T={}, increasing={}, delta_T={}",
                self.ramp.total_time_min,
                self.ramp.start_c,
                self.ramp.final_c,
                self.ramp.increasing,
                self.ramp.delta_c
            ),
            FORMAT_COMMENT.to_string(),
        ];
        for line in &header {
            info!("# {line}");
        }
        let res = self.log.write_header(&header, self.truncate_log);
        self.note_log(res);
        info!(
            step_interval_s = self.schedule.step_interval().as_secs_f64(),
            steps = self.schedule.step_count(),
            "ramp schedule"
        );

        let rpm = self.device_cfg.stir_rate_rpm;
        let start = whole_degrees(self.ramp.start_c);
        self.device_call("set_stir_rate", |d| d.set_stir_rate(rpm))?;
        self.device_call("set_target_temperature", |d| d.set_target_temperature(start))?;
        self.device_call("start_heating", |d| d.start_heating())?;
        self.device_call("start_stirring", |d| d.start_stirring())?;

        self.target_c = self.ramp.start_c;
        self.comment(&format!("Aiming to {}ºC...", self.target_c));
        self.aiming_since = Some(self.clock.now());
        self.settling = false;
        self.phase = Phase::Stabilizing;
        Ok(RampStatus::Wait(Duration::ZERO))
    }

    fn stabilize_step(&mut self) -> Result<RampStatus> {
        let sensor = self.read_sensor()?;
        let near = is_near_target(
            sensor,
            self.target_c,
            Direction::None,
            self.stabilize.tolerance_c,
        );

        if !self.settling {
            if near {
                debug!(sensor_c = sensor, target_c = self.target_c, "in band, settling");
                self.settling = true;
                return Ok(RampStatus::Wait(self.stabilize.wait));
            }
            return Ok(RampStatus::Wait(self.poll));
        }

        self.settling = false;
        if !near {
            // Drifted out during the settle window; back to polling.
            debug!(sensor_c = sensor, target_c = self.target_c, "left band while settling");
            return Ok(RampStatus::Wait(Duration::ZERO));
        }

        let secs = self
            .aiming_since
            .map(|t| self.clock.secs_since(t))
            .unwrap_or_default();
        self.comment(&format!("Stabilized at target T after {secs} seconds"));
        self.start_time = Some(self.clock.now());
        self.waiting = Duration::ZERO;
        self.phase = Phase::Stepping;
        Ok(RampStatus::Wait(Duration::ZERO))
    }

    fn ramp_step(&mut self) -> Result<RampStatus> {
        let sensor = self.read_sensor()?;

        // Stepping continues while sensor <= final_c regardless of direction.
        if sensor > self.ramp.final_c {
            self.phase = Phase::Finalizing;
            return Ok(RampStatus::Wait(Duration::ZERO));
        }

        if !is_near_target(
            sensor,
            self.target_c,
            self.ramp.direction(),
            self.stabilize.tolerance_c,
        ) {
            self.waiting += self.poll;
            return Ok(RampStatus::Wait(self.poll));
        }

        let entry = LogEntry {
            elapsed_min: self.elapsed_since_start().as_secs_f64() / 60.0,
            target_c: self.target_c,
            sensor_c: sensor,
        };
        info!(
            elapsed_min = entry.elapsed_min,
            target_c = entry.target_c,
            sensor_c = entry.sensor_c,
            "step reached"
        );
        let res = self.log.append_entry(&entry);
        self.note_log(res);
        self.steps_logged += 1;

        self.target_c += self.schedule.signed_delta();
        let setpoint = whole_degrees(self.target_c);
        self.device_call("set_target_temperature", |d| {
            d.set_target_temperature(setpoint)
        })?;

        let remaining = self.schedule.step_interval().saturating_sub(self.waiting);
        self.waiting = Duration::ZERO;
        Ok(RampStatus::Wait(remaining))
    }

    fn finalize(&mut self) -> Result<RampStatus> {
        self.ramp_elapsed = self.elapsed_since_start();
        let minutes = self.ramp_elapsed.as_secs_f64() / 60.0;
        self.comment(&format!(
            "Finished heat ramp from {} to {} in {} minutes",
            self.ramp.start_c, self.ramp.final_c, minutes
        ));

        if self.ramp.keep_heating {
            self.comment(&format!("Keeping at {}ºC", self.ramp.final_c));
            let setpoint = whole_degrees(self.ramp.final_c);
            self.device_call("set_target_temperature", |d| {
                d.set_target_temperature(setpoint)
            })?;
            self.target_c = self.ramp.final_c;
        } else {
            self.device_call("stop_heating", |d| d.stop_heating())?;
            self.device_call("stop_stirring", |d| d.stop_stirring())?;
            self.device_call("disconnect", |d| d.disconnect())?;
            info!("hotplate powered down and disconnected");
        }

        self.phase = Phase::Done;
        Ok(RampStatus::Finished(self.report()))
    }

    // ── Private: device and log plumbing ─────────────────────────────────────

    fn elapsed_since_start(&self) -> Duration {
        self.start_time
            .map(|t| self.clock.now().saturating_duration_since(t))
            .unwrap_or_default()
    }

    fn read_sensor(&mut self) -> Result<f64> {
        let device = &mut self.device;
        let sensor = with_retry(&*self.clock, &self.retry, "read_sensor", || {
            let raw = device
                .read_sensor()
                .map_err(|e| map_hw_error(&*e, DeviceOp::ReadSensor))?;
            parse_sensor_reading(&raw)
        })
        .map_err(eyre::Report::new)
        .wrap_err("reading hotplate sensor")?;
        self.last_sensor_c = Some(sensor);
        Ok(sensor)
    }

    fn device_call<T>(
        &mut self,
        op: &'static str,
        mut f: impl FnMut(&mut H) -> std::result::Result<T, DeviceError>,
    ) -> Result<T> {
        let device = &mut self.device;
        with_retry(&*self.clock, &self.retry, op, || {
            f(device).map_err(|e| map_hw_error(&*e, DeviceOp::Command(op)))
        })
        .map_err(eyre::Report::new)
        .wrap_err_with(|| format!("hotplate {op}"))
    }

    fn comment(&mut self, message: &str) {
        info!("# {message}");
        let res = self.log.append_comment(message);
        self.note_log(res);
    }

    fn note_log(&mut self, res: std::result::Result<(), RampError>) {
        if let Err(e) = res {
            self.log_failures += 1;
            warn!(error = %e, failures = self.log_failures, "ramp log write failed; continuing");
        }
    }
}
