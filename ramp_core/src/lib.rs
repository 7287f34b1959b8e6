#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core heat-ramp logic (hardware-agnostic).
//!
//! This crate drives a hotplate through a stepped temperature ramp. All
//! hardware interaction goes through the `ramp_traits::Hotplate` trait and all
//! timing through `ramp_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Schedule**: step interval and nominal setpoints (`schedule` module)
//! - **Proximity**: direction-aware "close enough" test (`proximity` module)
//! - **Controller**: the ramp state machine, one bounded `step()` at a time
//! - **Runner**: cancellable outer loop that sleeps between steps
//! - **Ramp log**: tab-separated data file with `#` comment lines
//! - **Retry**: bounded exponential backoff for device calls
//!
//! ## Lifecycle
//!
//! `Initializing → Stabilizing → Stepping → Finalizing → Done`, with `Aborted`
//! reachable from any non-terminal phase via `RampController::abort`.

pub mod builder;
pub mod config;
pub mod controller;
mod conversions;
pub mod error;
pub mod hw_error;
pub mod proximity;
pub mod ramp_log;
pub mod retry;
pub mod runner;
pub mod schedule;
pub mod status;
pub mod util;

pub use builder::{DEFAULT_POLL, Missing, RampBuilder, build_controller};
pub use config::{DeviceCfg, Direction, LogCfg, RampCfg, RetryPolicy, StabilizeCfg};
pub use controller::RampController;
pub use error::{BuildError, RampError, Report, Result};
pub use proximity::is_near_target;
pub use ramp_log::{FORMAT_COMMENT, LogEntry, RampLog, read_entries};
pub use runner::{CancelToken, run};
pub use schedule::{RampSchedule, compute_step_interval_s};
pub use status::{Phase, RampReport, RampStatus};
