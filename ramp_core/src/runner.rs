//! Outer loop driving `RampController::step` with cancellable waits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ramp_traits::{Clock, Hotplate};

use crate::controller::RampController;
use crate::error::{RampError, Result};
use crate::status::{RampReport, RampStatus};

/// Shared cancellation flag, set from a signal handler or another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag (e.g. one owned by a `ctrlc` handler).
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run the controller until the ramp finishes, fails, or is cancelled.
///
/// Waits requested by the controller are slept in slices of at most one poll
/// interval so cancellation is noticed promptly. On cancellation or a fatal
/// error the hotplate is released (best effort) before returning.
pub fn run<H: Hotplate>(
    controller: &mut RampController<H>,
    cancel: &CancelToken,
) -> Result<RampReport> {
    let clock = controller.clock();
    let slice = controller.poll_interval();
    tracing::info!(
        steps = controller.schedule().step_count(),
        step_interval_s = controller.schedule().step_interval().as_secs_f64(),
        log = %controller.log().path().display(),
        "ramp start"
    );

    loop {
        if cancel.is_cancelled() {
            controller.abort("cancelled");
            return Err(eyre::Report::new(RampError::Cancelled));
        }
        match controller.step() {
            Ok(RampStatus::Wait(wait)) => sleep_cancellable(&*clock, wait, slice, cancel),
            Ok(RampStatus::Finished(report)) => {
                tracing::info!(
                    steps_logged = report.steps_logged,
                    minutes = report.ramp_elapsed.as_secs_f64() / 60.0,
                    kept_heating = report.kept_heating,
                    "ramp complete"
                );
                return Ok(report);
            }
            Err(e) => {
                tracing::error!(error = %e, phase = ?controller.phase(), "ramp failed");
                controller.abort("aborted");
                return Err(e);
            }
        }
    }
}

fn sleep_cancellable(clock: &dyn Clock, total: Duration, slice: Duration, cancel: &CancelToken) {
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return;
        }
        let chunk = remaining.min(slice);
        clock.sleep(chunk);
        remaining -= chunk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_traits::ManualClock;

    #[test]
    fn sleep_is_sliced_and_stops_on_cancel() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        sleep_cancellable(&clock, Duration::from_millis(2500), Duration::from_secs(1), &cancel);
        assert_eq!(clock.elapsed(), Duration::from_millis(2500));

        cancel.cancel();
        sleep_cancellable(&clock, Duration::from_secs(10), Duration::from_secs(1), &cancel);
        assert_eq!(clock.elapsed(), Duration::from_millis(2500));
    }

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
