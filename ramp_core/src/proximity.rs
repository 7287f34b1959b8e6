//! "Close enough to target" checks.

use crate::config::Direction;

/// Whether `sensor_c` counts as having reached `target_c`.
///
/// Heating ramps only require the lower bound, so overshoot never holds a step
/// back; cooling ramps mirror that. `Direction::None` is the two-sided band
/// used for stabilization. All bounds are inclusive.
#[inline]
pub fn is_near_target(sensor_c: f64, target_c: f64, direction: Direction, tolerance_c: f64) -> bool {
    match direction {
        Direction::Increasing => target_c - tolerance_c <= sensor_c,
        Direction::Decreasing => sensor_c <= target_c + tolerance_c,
        Direction::None => {
            target_c - tolerance_c <= sensor_c && sensor_c <= target_c + tolerance_c
        }
    }
}
