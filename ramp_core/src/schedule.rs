//! Step schedule derived from the ramp parameters.
//!
//! seconds per step = total_time_min / ((final_c - start_c) / delta_c) * 60

use std::time::Duration;

use crate::config::RampCfg;
use crate::error::RampError;

/// Seconds between successive target increments.
///
/// `delta_c` is signed here: the quotient `(final_c - start_c) / delta_c` is the
/// step count and must come out positive, so a delta whose sign disagrees with
/// the ramp direction is a configuration error rather than a negative wait.
pub fn compute_step_interval_s(
    total_time_min: f64,
    start_c: f64,
    final_c: f64,
    delta_c: f64,
) -> Result<f64, RampError> {
    if !(total_time_min.is_finite()
        && start_c.is_finite()
        && final_c.is_finite()
        && delta_c.is_finite())
    {
        return Err(RampError::Config("ramp parameters must be finite".into()));
    }
    if delta_c == 0.0 {
        return Err(RampError::Config("step size delta_c must be non-zero".into()));
    }
    if final_c == start_c {
        return Err(RampError::Config(
            "start and final temperatures are equal; nothing to ramp".into(),
        ));
    }
    if total_time_min <= 0.0 {
        return Err(RampError::Config("total_time_min must be > 0".into()));
    }
    let steps = (final_c - start_c) / delta_c;
    if steps <= 0.0 {
        return Err(RampError::Config(format!(
            "step of {delta_c} °C never reaches {final_c} °C from {start_c} °C"
        )));
    }
    let interval_s = total_time_min / steps * 60.0;
    if !interval_s.is_finite() {
        return Err(RampError::Config(format!(
            "step interval overflows for {steps} steps over {total_time_min} min"
        )));
    }
    Ok(interval_s)
}

/// Upper bound on the number of steps in one ramp.
pub const MAX_STEPS: f64 = 100_000.0;

/// Validated schedule for one ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct RampSchedule {
    start_c: f64,
    final_c: f64,
    signed_delta_c: f64,
    steps: f64,
    step_interval: Duration,
}

impl RampSchedule {
    pub fn new(cfg: &RampCfg) -> Result<Self, RampError> {
        if cfg.increasing != (cfg.final_c > cfg.start_c) {
            return Err(RampError::Config(format!(
                "increasing={} contradicts {} °C -> {} °C",
                cfg.increasing, cfg.start_c, cfg.final_c
            )));
        }
        let signed_delta_c = if cfg.increasing {
            cfg.delta_c.abs()
        } else {
            -cfg.delta_c.abs()
        };
        let interval_s =
            compute_step_interval_s(cfg.total_time_min, cfg.start_c, cfg.final_c, signed_delta_c)?;
        let steps = (cfg.final_c - cfg.start_c) / signed_delta_c;
        if steps > MAX_STEPS {
            return Err(RampError::Config(format!(
                "{steps} steps of {} °C exceeds the limit of {MAX_STEPS}",
                cfg.delta_c.abs()
            )));
        }
        if (steps - steps.round()).abs() > 1e-9 {
            tracing::warn!(
                steps,
                delta_c = signed_delta_c,
                "ramp span is not a whole number of steps; the last step overshoots final_c"
            );
        }
        Ok(Self {
            start_c: cfg.start_c,
            final_c: cfg.final_c,
            signed_delta_c,
            steps,
            step_interval: Duration::try_from_secs_f64(interval_s)
                .map_err(|e| RampError::Config(format!("step interval {interval_s} s: {e}")))?,
        })
    }

    /// Nominal time between target increments.
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Number of increments from start to final, rounded to the nearest whole step.
    pub fn step_count(&self) -> u32 {
        self.steps.round() as u32
    }

    /// Increment applied to the target each step, negative for cooling ramps.
    pub fn signed_delta(&self) -> f64 {
        self.signed_delta_c
    }

    /// Nominal setpoints from start to final inclusive.
    pub fn targets(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.step_count()).map(move |i| self.start_c + f64::from(i) * self.signed_delta_c)
    }

    pub fn final_c(&self) -> f64 {
        self.final_c
    }

    /// Nominal ramp duration: step count × step interval.
    pub fn nominal_duration(&self) -> Duration {
        self.step_interval.mul_f64(self.steps)
    }
}
