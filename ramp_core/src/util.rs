//! Small helpers shared by the controller and the log.

use crate::error::RampError;

/// Parse a hotplate sensor reply: the first whitespace-separated token is the
/// temperature, anything after it (unit or sensor id) is ignored.
pub fn parse_sensor_reading(raw: &str) -> Result<f64, RampError> {
    let token = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| RampError::SensorRead("empty sensor reply".into()))?;
    let value: f64 = token
        .parse()
        .map_err(|_| RampError::SensorRead(format!("unparseable sensor reply {raw:?}")))?;
    if !value.is_finite() {
        return Err(RampError::SensorRead(format!("non-finite sensor value {raw:?}")));
    }
    Ok(value)
}

/// Setpoint sent to the device: whole degrees, truncated toward zero.
#[inline]
pub fn whole_degrees(celsius: f64) -> i32 {
    celsius.trunc() as i32
}

/// Wall-clock stamp for log headers.
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
