use ramp_config::{load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[rstest]
#[case("[ramp]\ndelta_c = 0.0\n", "delta_c must be non-zero")]
#[case("[ramp]\nstart_c = 45.0\nfinal_c = 45.0\n", "must differ")]
#[case("[ramp]\ntotal_time_min = 0.0\n", "total_time_min must be > 0")]
#[case("[ramp]\nincreasing = false\n", "contradicts")]
#[case("[ramp]\ntotal_time_min = 20000\n", "one week")]
#[case("[ramp]\ndelta_c = 0.0001\n", "at most")]
#[case("[ramp]\nfinal_c = 900.0\n", "within [-50, 400]")]
#[case("[stabilization]\ntolerance_c = -0.1\n", "tolerance_c must be >= 0")]
#[case("[device]\nport = \"  \"\n", "device.port must not be empty")]
#[case("[retry]\nmax_attempts = 0\n", "max_attempts must be >= 1")]
#[case("[retry]\nbackoff_factor = 0.5\n", "backoff_factor must be >= 1.0")]
#[case("[retry]\nbackoff_factor = 1e300\n", "backoff_factor must be <= 10")]
#[case("[retry]\nbackoff_ms = 3600000\n", "backoff_ms must be <= 60000")]
#[case("[retry]\nmax_attempts = 1000\n", "max_attempts must be <= 20")]
#[case("[ramp]\nstart_c = 0.0\nfinal_c = 5e-324\n", "at least one step")]
#[case("[ramp]\nfinal_c = 26.0\n", "at least one step")]
#[case("[logging]\nrotation = \"weekly\"\n", "never|daily|hourly")]
#[case("[runner]\npoll_s = 0\n", "poll_s must be >= 1")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn accepts_decreasing_ramp_with_matching_flag() {
    let toml = r#"
[ramp]
total_time_min = 30
start_c = 80
final_c = 40
increasing = false
keep_heating = false
delta_c = 4

[stabilization]
wait_s = 60
tolerance_c = 0.5
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert!(!cfg.ramp.keep_heating);
    assert_eq!(cfg.ramp.delta_c, 4.0);
}

#[test]
fn load_file_reports_path_on_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[ramp\nstart_c = 1").unwrap();
    let err = load_file(&path).expect_err("broken TOML");
    assert!(format!("{err}").contains("broken.toml"));
}

#[test]
fn load_file_reads_full_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ramp.toml");
    fs::write(
        &path,
        r#"
[ramp]
total_time_min = 120
start_c = 70
final_c = 130

[device]
port = "/dev/ttyUSB0"

[log]
path = "run.txt"
truncate_on_start = false
"#,
    )
    .unwrap();
    let cfg = load_file(&path).expect("load");
    cfg.validate().expect("valid");
    assert_eq!(cfg.device.port, "/dev/ttyUSB0");
    assert_eq!(cfg.ramp.final_c, 130.0);
    assert!(!cfg.log.truncate_on_start);
}
