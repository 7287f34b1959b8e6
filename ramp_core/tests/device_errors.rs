mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use ramp_core::{CancelToken, Phase, RampBuilder, RampError, run};
use ramp_traits::{Hotplate, ManualClock};
use rstest::rstest;
use tempfile::tempdir;

type DevResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Delegates to a `TrackingPlate` but rejects `start_heating` a few times.
struct RejectingPlate {
    inner: TrackingPlate,
    rejections: u32,
}

impl Hotplate for RejectingPlate {
    fn read_sensor(&mut self) -> DevResult<String> {
        self.inner.read_sensor()
    }
    fn set_target_temperature(&mut self, celsius: i32) -> DevResult<()> {
        self.inner.set_target_temperature(celsius)
    }
    fn set_stir_rate(&mut self, rpm: u32) -> DevResult<()> {
        self.inner.set_stir_rate(rpm)
    }
    fn start_heating(&mut self) -> DevResult<()> {
        if self.rejections > 0 {
            self.rejections -= 1;
            return Err("command rejected by device".into());
        }
        self.inner.start_heating()
    }
    fn stop_heating(&mut self) -> DevResult<()> {
        self.inner.stop_heating()
    }
    fn start_stirring(&mut self) -> DevResult<()> {
        self.inner.start_stirring()
    }
    fn stop_stirring(&mut self) -> DevResult<()> {
        self.inner.stop_stirring()
    }
    fn disconnect(&mut self) -> DevResult<()> {
        self.inner.disconnect()
    }
}

#[rstest]
fn transient_sensor_failures_are_retried() {
    let dir = tempdir().unwrap();
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(stabilize())
        .with_retry(fast_retry(3))
        .with_log_path(dir.path().join("ramp.txt"))
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(TrackingPlate::new(CallLog::default(), 0.1).failing_reads(2))
        .build()
        .unwrap();

    let report = run(&mut ctl, &CancelToken::new()).expect("recovers");
    assert_eq!(report.steps_logged, 10);
}

#[rstest]
fn huge_backoff_factor_does_not_abort_the_ramp() {
    let dir = tempdir().unwrap();
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(stabilize())
        .with_retry(ramp_core::RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
            backoff_factor: 1e300,
        })
        .with_log_path(dir.path().join("ramp.txt"))
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(TrackingPlate::new(CallLog::default(), 0.1).failing_reads(2))
        .build()
        .unwrap();

    let report = run(&mut ctl, &CancelToken::new()).expect("recovers");
    assert_eq!(report.steps_logged, 10);
}

#[rstest]
fn persistent_sensor_failure_escalates_and_releases_device() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ramp.txt");
    let calls = CallLog::default();
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(stabilize())
        .with_retry(fast_retry(3))
        .with_log_path(&path)
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(TrackingPlate::new(calls.clone(), 0.1).failing_reads(3))
        .build()
        .unwrap();

    let err = run(&mut ctl, &CancelToken::new()).expect_err("escalates");
    match err.downcast_ref::<RampError>() {
        Some(RampError::SensorRead(_)) => {}
        other => panic!("expected SensorRead, got {other:?}"),
    }
    assert_eq!(ctl.phase(), Phase::Aborted);
    for call in ["stop_heating", "stop_stirring", "disconnect"] {
        assert_eq!(calls.count(call), 1);
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().last().unwrap().starts_with("# Ramp aborted after "));
}

#[rstest]
#[case(2, true)]
#[case(3, false)]
fn rejected_command_is_retried_up_to_the_limit(#[case] rejections: u32, #[case] succeeds: bool) {
    let dir = tempdir().unwrap();
    let calls = CallLog::default();
    let plate = RejectingPlate {
        inner: TrackingPlate::new(calls.clone(), 0.1),
        rejections,
    };
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(stabilize())
        .with_retry(fast_retry(3))
        .with_log_path(dir.path().join("ramp.txt"))
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(plate)
        .build()
        .unwrap();

    let res = run(&mut ctl, &CancelToken::new());
    if succeeds {
        assert!(res.is_ok());
    } else {
        let err = res.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RampError>(),
            Some(RampError::DeviceCommand(_))
        ));
        // Heating never started, but shutdown is still attempted.
        assert_eq!(calls.count("start_heating"), 0);
        assert_eq!(calls.count("disconnect"), 1);
    }
}

#[rstest]
fn retry_disabled_fails_on_first_error() {
    let dir = tempdir().unwrap();
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_retry(fast_retry(1))
        .with_log_path(dir.path().join("ramp.txt"))
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(TrackingPlate::new(CallLog::default(), 0.1).failing_reads(1))
        .build()
        .unwrap();
    assert!(run(&mut ctl, &CancelToken::new()).is_err());
}

#[rstest]
fn unwritable_ramp_log_does_not_abort_the_ramp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("ramp.txt");
    let mut ctl = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(stabilize())
        .with_log_path(&path)
        .with_clock(Arc::new(ManualClock::new()))
        .with_device(TrackingPlate::new(CallLog::default(), 0.1))
        .build()
        .unwrap();

    let report = run(&mut ctl, &CancelToken::new()).expect("ramp completes");
    assert_eq!(report.steps_logged, 10);
    // header, aiming, stabilized, ten data lines, finished, keeping
    assert_eq!(report.log_failures, 15);
    assert!(!path.exists());
}
