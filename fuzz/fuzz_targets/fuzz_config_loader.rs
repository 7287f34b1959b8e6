#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are both fine; panics are not.
    if let Ok(cfg) = ramp_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A config that validates must also yield a schedule.
            let ramp = ramp_core::RampCfg::from(&cfg.ramp);
            assert!(ramp_core::RampSchedule::new(&ramp).is_ok());
        }
    }
});
