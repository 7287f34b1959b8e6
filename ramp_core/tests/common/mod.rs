#![allow(dead_code)]

use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ramp_core::{CancelToken, LogCfg, RampCfg, RetryPolicy, StabilizeCfg};
use ramp_traits::Hotplate;

type DevResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Shared record of every command a fake plate received, in order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

/// Plate whose sensor sits a fixed offset from the last setpoint.
pub struct TrackingPlate {
    pub calls: CallLog,
    setpoint: f64,
    offset: f64,
    failing_reads: u32,
    cancel_after_reads: Option<(u32, CancelToken)>,
    reads: u32,
}

impl TrackingPlate {
    pub fn new(calls: CallLog, offset: f64) -> Self {
        Self {
            calls,
            setpoint: 25.0,
            offset,
            failing_reads: 0,
            cancel_after_reads: None,
            reads: 0,
        }
    }
    pub fn failing_reads(mut self, n: u32) -> Self {
        self.failing_reads = n;
        self
    }
    pub fn cancel_after_reads(mut self, n: u32, token: CancelToken) -> Self {
        self.cancel_after_reads = Some((n, token));
        self
    }
}

impl Hotplate for TrackingPlate {
    fn read_sensor(&mut self) -> DevResult<String> {
        self.reads += 1;
        if let Some((n, token)) = &self.cancel_after_reads {
            if self.reads >= *n {
                token.cancel();
            }
        }
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err("sensor read timed out".into());
        }
        Ok(format!("{} 2", self.setpoint + self.offset))
    }
    fn set_target_temperature(&mut self, celsius: i32) -> DevResult<()> {
        self.calls.push(format!("set_target_temperature({celsius})"));
        self.setpoint = f64::from(celsius);
        Ok(())
    }
    fn set_stir_rate(&mut self, rpm: u32) -> DevResult<()> {
        self.calls.push(format!("set_stir_rate({rpm})"));
        Ok(())
    }
    fn start_heating(&mut self) -> DevResult<()> {
        self.calls.push("start_heating");
        Ok(())
    }
    fn stop_heating(&mut self) -> DevResult<()> {
        self.calls.push("stop_heating");
        Ok(())
    }
    fn start_stirring(&mut self) -> DevResult<()> {
        self.calls.push("start_stirring");
        Ok(())
    }
    fn stop_stirring(&mut self) -> DevResult<()> {
        self.calls.push("stop_stirring");
        Ok(())
    }
    fn disconnect(&mut self) -> DevResult<()> {
        self.calls.push("disconnect");
        Ok(())
    }
}

/// Plate that replays a fixed sequence of readings (last one repeats).
pub struct ScriptedPlate {
    readings: VecDeque<f64>,
    last: f64,
}

impl ScriptedPlate {
    pub fn new(readings: &[f64]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            last: readings.last().copied().unwrap_or(25.0),
        }
    }
}

impl Hotplate for ScriptedPlate {
    fn read_sensor(&mut self) -> DevResult<String> {
        let v = self.readings.pop_front().unwrap_or(self.last);
        Ok(format!("{v} 2"))
    }
    fn set_target_temperature(&mut self, _celsius: i32) -> DevResult<()> {
        Ok(())
    }
    fn set_stir_rate(&mut self, _rpm: u32) -> DevResult<()> {
        Ok(())
    }
    fn start_heating(&mut self) -> DevResult<()> {
        Ok(())
    }
    fn stop_heating(&mut self) -> DevResult<()> {
        Ok(())
    }
    fn start_stirring(&mut self) -> DevResult<()> {
        Ok(())
    }
    fn stop_stirring(&mut self) -> DevResult<()> {
        Ok(())
    }
    fn disconnect(&mut self) -> DevResult<()> {
        Ok(())
    }
}

pub fn stock_ramp() -> RampCfg {
    RampCfg::default()
}

pub fn stabilize() -> StabilizeCfg {
    StabilizeCfg {
        wait: Duration::from_secs(120),
        tolerance_c: 0.2,
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Duration::from_millis(10),
        backoff_factor: 2.0,
    }
}

pub fn log_cfg(path: impl Into<std::path::PathBuf>) -> LogCfg {
    LogCfg {
        path: path.into(),
        truncate_on_start: true,
    }
}

pub fn data_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.starts_with('#')).collect()
}
