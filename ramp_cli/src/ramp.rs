//! Ramp execution: clock and device assembly, plus the subcommand bodies.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ramp_core::error::{RampError, Result as CoreResult};
use ramp_core::hw_error::{DeviceOp, map_hw_error};
use ramp_core::retry::with_retry;
use ramp_core::util::parse_sensor_reading;
use ramp_core::{CancelToken, LogEntry, RampCfg, RampReport, RampSchedule, RetryPolicy};
use ramp_hardware::SimulatedHotplate;
use ramp_traits::{Clock, Hotplate, ManualClock, MonotonicClock};

/// Wall clock normally; a manual clock when `RAMP_TEST_FAST_CLOCK=1` so a
/// simulated hour-long ramp finishes instantly.
pub fn select_clock() -> Arc<dyn Clock + Send + Sync> {
    if std::env::var("RAMP_TEST_FAST_CLOCK").is_ok_and(|v| v == "1") {
        tracing::debug!("using manual clock");
        Arc::new(ManualClock::new())
    } else {
        Arc::new(MonotonicClock::new())
    }
}

/// Open the configured hotplate, or the simulator when `simulate` is set.
pub fn open_device(
    cfg: &ramp_config::Config,
    simulate: bool,
    clock: Arc<dyn Clock + Send + Sync>,
) -> CoreResult<Box<dyn Hotplate>> {
    if simulate {
        let mut sim = SimulatedHotplate::new(clock);
        if let Some(n) = std::env::var("RAMP_TEST_SIM_FAIL_READS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            sim = sim.with_failing_reads(n);
        }
        tracing::info!("using simulated hotplate");
        return Ok(Box::new(sim));
    }

    #[cfg(feature = "hardware")]
    {
        let _ = clock;
        let dev = ramp_hardware::IkaHotplate::open(
            &cfg.device.port,
            cfg.device.baud_rate,
            Duration::from_millis(cfg.device.read_timeout_ms),
        )
        .map_err(|e| {
            eyre::Report::new(RampError::DeviceConnection(format!(
                "open {}: {e}",
                cfg.device.port
            )))
        })?;
        tracing::info!(port = %cfg.device.port, baud = cfg.device.baud_rate, "hotplate connected");
        Ok(Box::new(dev))
    }
    #[cfg(not(feature = "hardware"))]
    {
        let _ = (cfg, clock);
        Err(eyre::Report::new(RampError::DeviceUnavailable(
            "built without the `hardware` feature".into(),
        )))
    }
}

pub fn run_ramp(
    cfg: &ramp_config::Config,
    simulate: bool,
    cancel: &CancelToken,
) -> CoreResult<RampReport> {
    let clock = select_clock();
    let device = open_device(cfg, simulate, Arc::clone(&clock))?;
    let mut controller = ramp_core::build_controller(device, cfg, Some(clock))?;
    ramp_core::run(&mut controller, cancel)
}

pub fn plan(cfg: &ramp_config::Config) -> CoreResult<RampSchedule> {
    RampSchedule::new(&RampCfg::from(&cfg.ramp)).map_err(eyre::Report::new)
}

/// Open the device, read the sensor once (with the configured retries),
/// disconnect. Returns the reading in °C. The device is released whether or
/// not the read succeeded.
pub fn self_check(cfg: &ramp_config::Config, simulate: bool) -> CoreResult<f64> {
    let clock = select_clock();
    let mut device = open_device(cfg, simulate, Arc::clone(&clock))?;
    let policy = RetryPolicy::from(&cfg.retry);
    let reading = with_retry(&*clock, &policy, "read_sensor", || {
        let raw = device
            .read_sensor()
            .map_err(|e| map_hw_error(&*e, DeviceOp::ReadSensor))?;
        parse_sensor_reading(&raw)
    });
    if let Err(e) = device.disconnect() {
        tracing::warn!(error = %e, "disconnect after self-check failed");
    }
    reading.map_err(eyre::Report::new)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSummary {
    pub entries: usize,
    pub first: Option<LogEntry>,
    pub last: Option<LogEntry>,
}

pub fn summarize(path: &Path) -> CoreResult<LogSummary> {
    let entries = ramp_core::read_entries(path)?;
    Ok(LogSummary {
        entries: entries.len(),
        first: entries.first().copied(),
        last: entries.last().copied(),
    })
}

/// Minutes with one decimal, for human output.
pub fn minutes(d: Duration) -> String {
    format!("{:.1}", d.as_secs_f64() / 60.0)
}
