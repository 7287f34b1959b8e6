#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any line that parses must render back to a line that parses to the same entry.
    if let Ok(entry) = ramp_core::LogEntry::parse_line(data) {
        if entry.elapsed_min.is_finite() && entry.target_c.is_finite() && entry.sensor_c.is_finite() {
            let again = ramp_core::LogEntry::parse_line(&entry.to_line());
            assert_eq!(again.ok(), Some(entry));
        }
    }
});
