mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use ramp_core::{BuildError, RampBuilder, RampCfg, RampError, StabilizeCfg, build_controller};
use ramp_traits::ManualClock;
use rstest::rstest;

#[rstest]
fn builder_missing_ramp_yields_typed_build_error() {
    let err = RampBuilder::new()
        .with_log_path("ramp.txt")
        .with_device(ScriptedPlate::new(&[25.0]))
        .build()
        .expect_err("should fail with MissingRamp");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingRamp) => {}
        other => panic!("expected MissingRamp, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_log_yields_typed_build_error() {
    let err = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_device(ScriptedPlate::new(&[25.0]))
        .build()
        .expect_err("should fail with MissingLog");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingLog)
    ));
}

#[rstest]
#[case::equal_endpoints(RampCfg { final_c: 25.0, ..RampCfg::default() })]
#[case::zero_delta(RampCfg { delta_c: 0.0, ..RampCfg::default() })]
#[case::zero_total(RampCfg { total_time_min: 0.0, ..RampCfg::default() })]
#[case::direction_contradicts(RampCfg { increasing: false, ..RampCfg::default() })]
#[case::nan_start(RampCfg { start_c: f64::NAN, ..RampCfg::default() })]
fn invalid_ramp_is_rejected_before_any_device_command(#[case] ramp: RampCfg) {
    let calls = CallLog::default();
    let err = RampBuilder::new()
        .with_ramp(ramp)
        .with_log_path("ramp.txt")
        .with_device(TrackingPlate::new(calls.clone(), 0.0))
        .build()
        .expect_err("invalid ramp");

    assert!(matches!(
        err.downcast_ref::<RampError>(),
        Some(RampError::Config(_))
    ));
    assert!(calls.calls().is_empty());
}

#[rstest]
fn negative_tolerance_and_zero_poll_are_rejected() {
    let err = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_stabilization(StabilizeCfg {
            wait: Duration::from_secs(1),
            tolerance_c: -0.1,
        })
        .with_log_path("ramp.txt")
        .with_device(ScriptedPlate::new(&[25.0]))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("tolerance"));

    let err = RampBuilder::new()
        .with_ramp(stock_ramp())
        .with_poll_interval(Duration::ZERO)
        .with_log_path("ramp.txt")
        .with_device(ScriptedPlate::new(&[25.0]))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("poll"));
}

#[rstest]
fn build_controller_maps_every_config_section() {
    let cfg = ramp_config::load_toml(
        r#"
        [ramp]
        total_time_min = 30
        start_c = 30
        final_c = 40
        delta_c = 1

        [stabilization]
        wait_s = 60
        sensibility = 0.5

        [runner]
        poll_s = 2
        "#,
    )
    .unwrap();
    cfg.validate().unwrap();

    let ctl = build_controller(
        ScriptedPlate::new(&[30.0]),
        &cfg,
        Some(Arc::new(ManualClock::new())),
    )
    .unwrap();
    assert_eq!(ctl.schedule().step_count(), 10);
    assert_eq!(ctl.schedule().step_interval(), Duration::from_secs(180));
    assert_eq!(ctl.poll_interval(), Duration::from_secs(2));
    assert_eq!(ctl.target_c(), 30.0);
}
