//! Maps `Box<dyn Error>` from the `Hotplate` boundary to typed `RampError`.
//!
//! The trait uses `Box<dyn Error + Send + Sync>` so any driver can plug in;
//! this module converts those to the ramp taxonomy, with an optional
//! feature-gated path for `ramp_hardware::HwError` downcasting.

use crate::error::RampError;

/// What the controller was doing when the device failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    ReadSensor,
    Command(&'static str),
}

/// Map a trait-boundary error to a typed `RampError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static), op: DeviceOp) -> RampError {
    #[cfg(feature = "hardware-errors")]
    {
        use ramp_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match (hw, op) {
                (HwError::Timeout, DeviceOp::ReadSensor) => RampError::SensorRead(hw.to_string()),
                (HwError::Timeout, DeviceOp::Command(_)) => {
                    RampError::DeviceCommand(describe(op, hw))
                }
                (HwError::NotConnected | HwError::Serial(_) | HwError::Io(_), _) => {
                    RampError::DeviceConnection(describe(op, hw))
                }
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("not connected") || lower.contains("port") || lower.contains("connection")
    {
        return RampError::DeviceConnection(describe(op, &s));
    }
    match op {
        DeviceOp::ReadSensor => RampError::SensorRead(s),
        DeviceOp::Command(_) => RampError::DeviceCommand(describe(op, &s)),
    }
}

fn describe(op: DeviceOp, e: &dyn std::fmt::Display) -> String {
    match op {
        DeviceOp::ReadSensor => format!("read sensor: {e}"),
        DeviceOp::Command(name) => format!("{name}: {e}"),
    }
}
