mod cli;
mod error_fmt;
mod ramp;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use ramp_core::{CancelToken, RampError};
use serde_json::json;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let mut cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    match cli.cmd {
        Commands::Run { overrides } => {
            overrides.apply(&mut cfg);
            validate(&cfg)?;

            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }

            let report = ramp::run_ramp(&cfg, cli.simulate, &cancel)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "timestamp": unix_secs(),
                        "log": cfg.log.path,
                        "steps_logged": report.steps_logged,
                        "ramp_minutes": report.ramp_elapsed.as_secs_f64() / 60.0,
                        "last_target_c": report.last_target_c,
                        "last_sensor_c": report.last_sensor_c,
                        "kept_heating": report.kept_heating,
                        "log_failures": report.log_failures,
                    })
                );
            } else {
                println!(
                    "Ramp complete: {} steps logged in {} minutes (log: {})",
                    report.steps_logged,
                    ramp::minutes(report.ramp_elapsed),
                    cfg.log.path
                );
                if report.kept_heating {
                    println!("Holding {} °C", cfg.ramp.final_c);
                }
                if report.log_failures > 0 {
                    println!("Warning: {} ramp log writes failed", report.log_failures);
                }
            }
        }
        Commands::Plan { overrides } => {
            overrides.apply(&mut cfg);
            validate(&cfg)?;
            let schedule = ramp::plan(&cfg)?;
            let interval = schedule.step_interval();
            let targets: Vec<f64> = schedule.targets().collect();
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "step_interval_s": interval.as_secs_f64(),
                        "steps": schedule.step_count(),
                        "nominal_minutes": schedule.nominal_duration().as_secs_f64() / 60.0,
                        "targets": targets,
                    })
                );
            } else {
                println!(
                    "Step interval: {:.1} s, {} steps, nominal {} minutes",
                    interval.as_secs_f64(),
                    schedule.step_count(),
                    ramp::minutes(schedule.nominal_duration())
                );
                for (i, t) in targets.iter().enumerate() {
                    let at = interval.mul_f64(i as f64);
                    println!("{i:>4}  {:>7} min  {t} °C", ramp::minutes(at));
                }
            }
        }
        Commands::SelfCheck => {
            validate(&cfg)?;
            let celsius = ramp::self_check(&cfg, cli.simulate)?;
            if cli.json {
                println!("{}", json!({ "ok": true, "sensor_c": celsius }));
            } else {
                println!("OK: sensor reads {celsius:.2} °C");
            }
        }
        Commands::Summary { log } => {
            let summary = ramp::summarize(&log)
                .wrap_err_with(|| format!("summarizing {}", log.display()))?;
            if cli.json {
                let entry = |e: Option<ramp_core::LogEntry>| {
                    e.map(|e| json!({ "minutes": e.elapsed_min, "target_c": e.target_c, "sensor_c": e.sensor_c }))
                };
                println!(
                    "{}",
                    json!({
                        "entries": summary.entries,
                        "first": entry(summary.first),
                        "last": entry(summary.last),
                    })
                );
            } else {
                println!("Entries: {}", summary.entries);
                if let Some(e) = summary.first {
                    println!("First: {}", e.to_line());
                }
                if let Some(e) = summary.last {
                    println!("Last: {}", e.to_line());
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ramp_config::Config> {
    match path {
        Some(p) => ramp_config::load_file(p)
            .map_err(|e| eyre::Report::new(RampError::Config(e.to_string()))),
        None => Ok(ramp_config::Config::default()),
    }
}

fn validate(cfg: &ramp_config::Config) -> Result<()> {
    cfg.validate()
        .map_err(|e| eyre::Report::new(RampError::Config(e.to_string())))
}

fn unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON file layer.
/// Filter precedence: RUST_LOG, then --log-level, then `[logging].level`.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &ramp_config::Logging,
) -> Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| eyre::Report::new(RampError::Config(format!("log level {level:?}: {e}"))))?,
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::Report::new(RampError::Config(format!("logging.file {file:?} has no file name"))))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .wrap_err("installing tracing subscriber")
}
