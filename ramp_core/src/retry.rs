//! Bounded retry with exponential backoff for device interactions.

use std::time::Duration;

use ramp_traits::Clock;

use crate::config::RetryPolicy;
use crate::error::RampError;

/// Upper bound on a single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Run `f` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is exhausted. Backoff sleeps go through `clock`.
pub fn with_retry<T>(
    clock: &dyn Clock,
    policy: &RetryPolicy,
    op: &str,
    mut f: impl FnMut() -> Result<T, RampError>,
) -> Result<T, RampError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff.min(MAX_BACKOFF);
    let mut attempt = 1;
    loop {
        match f() {
            Ok(v) => {
                if attempt > 1 {
                    tracing::info!(op, attempt, "device call recovered");
                }
                return Ok(v);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(op, attempt, max_attempts, error = %e, backoff_ms = backoff.as_millis() as u64, "device call failed, retrying");
                clock.sleep(backoff);
                backoff = next_backoff(backoff, policy.backoff_factor);
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(op, attempt, error = %e, "device call failed");
                return Err(e);
            }
        }
    }
}

#[inline]
fn next_backoff(current: Duration, factor: f64) -> Duration {
    if !(factor.is_finite() && factor >= 1.0) {
        return current.min(MAX_BACKOFF);
    }
    Duration::try_from_secs_f64(current.as_secs_f64() * factor)
        .unwrap_or(MAX_BACKOFF)
        .min(MAX_BACKOFF)
}
