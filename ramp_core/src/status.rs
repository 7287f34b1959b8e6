//! Ramp status returned from each controller step.

use std::time::Duration;

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Header not yet written, device not yet configured.
    Initializing,
    /// Waiting for the sensor to settle at the start temperature.
    Stabilizing,
    /// Advancing the target one step at a time.
    Stepping,
    /// Final temperature crossed; completion not yet logged.
    Finalizing,
    Done,
    Aborted,
}

/// Outcome of one `RampController::step`.
#[derive(Debug, Clone, PartialEq)]
pub enum RampStatus {
    /// Call `step` again after this long.
    Wait(Duration),
    /// Ramp complete; device held or released per `keep_heating`.
    Finished(RampReport),
}

/// Summary of a ramp run.
#[derive(Debug, Clone, PartialEq)]
pub struct RampReport {
    /// Data lines written (or attempted) to the ramp log.
    pub steps_logged: u32,
    /// Target in effect when the ramp ended.
    pub last_target_c: f64,
    pub last_sensor_c: Option<f64>,
    /// Time from the end of initial stabilization to completion.
    pub ramp_elapsed: Duration,
    pub kept_heating: bool,
    /// Ramp log writes that failed and were skipped.
    pub log_failures: u32,
}
