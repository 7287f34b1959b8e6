//! Human-readable error descriptions and structured JSON error formatting.

use ramp_core::error::{BuildError, RampError};

/// Stable name of the error kind for JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<RampError>() {
        Some(RampError::Config(_)) => "Config",
        Some(RampError::DeviceUnavailable(_)) => "DeviceUnavailable",
        Some(RampError::DeviceConnection(_)) => "DeviceConnection",
        Some(RampError::DeviceCommand(_)) => "DeviceCommand",
        Some(RampError::SensorRead(_)) => "SensorRead",
        Some(RampError::LogWrite(_)) => "LogWrite",
        Some(RampError::Cancelled) => "Cancelled",
        None if err.downcast_ref::<BuildError>().is_some() => "Config",
        None => "Error",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingRamp => {
                "What happened: No ramp parameters were given to the controller.\nLikely causes: The controller was built without with_ramp(...).\nHow to fix: Provide a [ramp] section or the run flags.".to_string()
            }
            BuildError::MissingLog => {
                "What happened: No ramp log path was configured.\nLikely causes: Empty [log].path or --log-file.\nHow to fix: Set [log].path in the config or pass --log-file.".to_string()
            }
        };
    }

    if let Some(re) = err.downcast_ref::<RampError>() {
        return match re {
            RampError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range or contradictory values in the TOML or on the command line.\nHow to fix: Edit the config or flags, then rerun. `heat-ramp plan` shows the schedule without touching the device."
            ),
            RampError::DeviceUnavailable(msg) => format!(
                "What happened: No hotplate driver is available ({msg}).\nLikely causes: The binary was built without serial support.\nHow to fix: Rebuild with `--features hardware`, or pass --simulate."
            ),
            RampError::DeviceConnection(msg) => format!(
                "What happened: Could not talk to the hotplate ({msg}).\nLikely causes: Wrong [device].port, cable unplugged, or the port is held by another program.\nHow to fix: Check the port name and cabling, then rerun `heat-ramp self-check`."
            ),
            RampError::DeviceCommand(msg) => format!(
                "What happened: The hotplate rejected or did not acknowledge a command ({msg}).\nLikely causes: Device in remote-lockout, unsupported setpoint, or a noisy line.\nHow to fix: Reset the device and check the setpoint range; raise [retry].max_attempts for flaky links."
            ),
            RampError::SensorRead(msg) => format!(
                "What happened: Temperature sensor could not be read ({msg}).\nLikely causes: External probe not connected, read timeout too low, or garbled replies.\nHow to fix: Check the probe, raise [device].read_timeout_ms, and rerun `heat-ramp self-check`."
            ),
            RampError::LogWrite(msg) => format!(
                "What happened: The ramp log could not be written ({msg}).\nLikely causes: Missing directory or no write permission.\nHow to fix: Point [log].path or --log-file at a writable location."
            ),
            RampError::Cancelled => {
                "What happened: Ramp cancelled.\nLikely causes: Interrupted by the operator (Ctrl-C).\nHow to fix: Nothing to fix; the hotplate was switched off and disconnected.".to_string()
            }
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed errors to stable exit codes; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<RampError>() {
        Some(RampError::Config(_)) => 2,
        Some(RampError::DeviceUnavailable(_)) => 3,
        Some(RampError::DeviceConnection(_)) => 4,
        Some(RampError::DeviceCommand(_)) => 5,
        Some(RampError::SensorRead(_)) => 6,
        Some(RampError::Cancelled) => 130,
        Some(RampError::LogWrite(_)) | None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}
