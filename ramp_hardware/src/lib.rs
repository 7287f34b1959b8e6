pub mod error;
#[cfg(feature = "hardware")]
pub mod ika;
pub mod util;

#[cfg(feature = "hardware")]
pub use ika::IkaHotplate;

use std::sync::Arc;
use std::time::Instant;

use ramp_traits::{Clock, DeviceError, Hotplate};
use tracing::debug;

use crate::error::HwError;

/// Room temperature the simulated plate drifts back to when not heating.
pub const SIM_AMBIENT_C: f64 = 25.0;

/// Simulated hotplate with a slew-limited thermal model.
///
/// While heating, the sensor moves toward `setpoint + overshoot_c` at
/// `heat_rate_c_per_s`; otherwise it drifts toward ambient at
/// `cool_rate_c_per_s`. Time comes from the injected clock, so a manual clock
/// makes the model fully deterministic.
pub struct SimulatedHotplate {
    clock: Arc<dyn Clock + Send + Sync>,
    temp_c: f64,
    setpoint_c: f64,
    heat_rate_c_per_s: f64,
    cool_rate_c_per_s: f64,
    overshoot_c: f64,
    heating: bool,
    stirring: bool,
    stir_rpm: u32,
    connected: bool,
    failing_reads: u32,
    last_update: Instant,
}

impl SimulatedHotplate {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let now = clock.now();
        Self {
            clock,
            temp_c: SIM_AMBIENT_C,
            setpoint_c: SIM_AMBIENT_C,
            heat_rate_c_per_s: 0.1,
            cool_rate_c_per_s: 0.02,
            overshoot_c: 0.0,
            heating: false,
            stirring: false,
            stir_rpm: 0,
            connected: true,
            failing_reads: 0,
            last_update: now,
        }
    }

    /// Start the plate at a given temperature instead of ambient.
    pub fn with_initial_temp(mut self, celsius: f64) -> Self {
        self.temp_c = celsius;
        self
    }

    pub fn with_heat_rate(mut self, c_per_s: f64) -> Self {
        self.heat_rate_c_per_s = c_per_s.abs();
        self
    }

    /// Steady-state offset above the setpoint while heating.
    pub fn with_overshoot(mut self, celsius: f64) -> Self {
        self.overshoot_c = celsius;
        self
    }

    /// Make the next `n` sensor reads fail with a timeout.
    pub fn with_failing_reads(mut self, n: u32) -> Self {
        self.failing_reads = n;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temp_c
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub fn is_stirring(&self) -> bool {
        self.stirring
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn ensure_connected(&self) -> Result<(), HwError> {
        if self.connected {
            Ok(())
        } else {
            Err(HwError::NotConnected)
        }
    }

    fn advance_model(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        let (goal, rate) = if self.heating {
            (self.setpoint_c + self.overshoot_c, self.heat_rate_c_per_s)
        } else {
            (SIM_AMBIENT_C, self.cool_rate_c_per_s)
        };
        let max_step = rate * dt;
        let diff = goal - self.temp_c;
        if diff.abs() <= max_step {
            self.temp_c = goal;
        } else {
            self.temp_c += max_step.copysign(diff);
        }
    }
}

impl Hotplate for SimulatedHotplate {
    fn read_sensor(&mut self) -> Result<String, DeviceError> {
        self.ensure_connected()?;
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(Box::new(HwError::Timeout));
        }
        self.advance_model();
        // Same shape as the real controller: value followed by a sensor id.
        Ok(format!("{:.2} 2", self.temp_c))
    }

    fn set_target_temperature(&mut self, celsius: i32) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.advance_model();
        self.setpoint_c = f64::from(celsius);
        debug!(celsius, "sim setpoint");
        Ok(())
    }

    fn set_stir_rate(&mut self, rpm: u32) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.stir_rpm = rpm;
        Ok(())
    }

    fn start_heating(&mut self) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.advance_model();
        self.heating = true;
        Ok(())
    }

    fn stop_heating(&mut self) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.advance_model();
        self.heating = false;
        Ok(())
    }

    fn start_stirring(&mut self) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.stirring = true;
        debug!(rpm = self.stir_rpm, "sim stirring");
        Ok(())
    }

    fn stop_stirring(&mut self) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.stirring = false;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_traits::ManualClock;
    use std::time::Duration;

    fn reading(plate: &mut SimulatedHotplate) -> f64 {
        let raw = plate.read_sensor().unwrap();
        raw.split_whitespace().next().unwrap().parse().unwrap()
    }

    #[test]
    fn heats_toward_setpoint_at_rate() {
        let clock = ManualClock::new();
        let mut plate = SimulatedHotplate::new(Arc::new(clock.clone())).with_heat_rate(0.5);
        plate.set_target_temperature(35).unwrap();
        plate.start_heating().unwrap();
        clock.advance(Duration::from_secs(10));
        assert!((reading(&mut plate) - 30.0).abs() < 1e-9);
        clock.advance(Duration::from_secs(60));
        assert!((reading(&mut plate) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn cools_at_constant_rate_toward_ambient() {
        let clock = ManualClock::new();
        let mut plate = SimulatedHotplate::new(Arc::new(clock.clone())).with_initial_temp(35.0);
        clock.advance(Duration::from_secs(100));
        assert!((reading(&mut plate) - 33.0).abs() < 1e-9);
        clock.advance(Duration::from_secs(100));
        assert!((reading(&mut plate) - 31.0).abs() < 1e-9);
        clock.advance(Duration::from_secs(3600));
        assert!((reading(&mut plate) - SIM_AMBIENT_C).abs() < 1e-9);
    }

    #[test]
    fn failing_reads_then_recovers() {
        let clock = ManualClock::new();
        let mut plate = SimulatedHotplate::new(Arc::new(clock)).with_failing_reads(2);
        assert!(plate.read_sensor().is_err());
        assert!(plate.read_sensor().is_err());
        assert!(plate.read_sensor().is_ok());
    }

    #[test]
    fn commands_fail_after_disconnect() {
        let clock = ManualClock::new();
        let mut plate = SimulatedHotplate::new(Arc::new(clock));
        plate.disconnect().unwrap();
        let err = plate.start_heating().expect_err("disconnected");
        assert!(err.to_string().contains("not connected"));
    }
}
