//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "heat-ramp", version, about = "Stepped heat-ramp controller for a hotplate/stirrer")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON lines; log as JSON
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Use the simulated hotplate instead of the serial device
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub simulate: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Per-run overrides of the `[ramp]`, `[stabilization]` and `[log]` sections.
#[derive(Args, Debug, Default, Clone)]
pub struct RampOverrides {
    /// Total ramp time in minutes
    #[arg(long = "total-time", value_name = "MIN")]
    pub total_time_min: Option<f64>,
    /// Start temperature in °C
    #[arg(long = "start", value_name = "C", allow_negative_numbers = true)]
    pub start_c: Option<f64>,
    /// Final temperature in °C
    #[arg(long = "final", value_name = "C", allow_negative_numbers = true)]
    pub final_c: Option<f64>,
    /// Ramp downward (final below start)
    #[arg(long, action = ArgAction::SetTrue)]
    pub decreasing: bool,
    /// Power down and disconnect at the end instead of holding the final temperature
    #[arg(long, action = ArgAction::SetTrue)]
    pub release: bool,
    /// Step size in °C
    #[arg(long = "delta", value_name = "C")]
    pub delta_c: Option<f64>,
    /// Initial stabilization settle time in seconds
    #[arg(long = "wait-time", value_name = "SECS")]
    pub wait_s: Option<u64>,
    /// Proximity tolerance in °C
    #[arg(long = "tolerance", value_name = "C")]
    pub tolerance_c: Option<f64>,
    /// Ramp log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl RampOverrides {
    pub fn apply(&self, cfg: &mut ramp_config::Config) {
        if let Some(v) = self.total_time_min {
            cfg.ramp.total_time_min = v;
        }
        if let Some(v) = self.start_c {
            cfg.ramp.start_c = v;
        }
        if let Some(v) = self.final_c {
            cfg.ramp.final_c = v;
        }
        if self.decreasing {
            cfg.ramp.increasing = false;
        }
        if self.release {
            cfg.ramp.keep_heating = false;
        }
        if let Some(v) = self.delta_c {
            cfg.ramp.delta_c = v;
        }
        if let Some(v) = self.wait_s {
            cfg.stabilization.wait_s = v;
        }
        if let Some(v) = self.tolerance_c {
            cfg.stabilization.tolerance_c = v;
        }
        if let Some(p) = &self.log_file {
            cfg.log.path = p.display().to_string();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a heat ramp
    Run {
        #[command(flatten)]
        overrides: RampOverrides,
    },
    /// Print the computed schedule without touching a device
    Plan {
        #[command(flatten)]
        overrides: RampOverrides,
    },
    /// Open the device, read the sensor once, and disconnect
    SelfCheck,
    /// Summarize an existing ramp log
    Summary {
        /// Ramp log to read
        #[arg(value_name = "LOG")]
        log: PathBuf,
    },
}
