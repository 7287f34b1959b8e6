use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Read from `reader` until `terminator` shows up or `timeout` expires.
///
/// Read timeouts and `WouldBlock` from the underlying port are treated as
/// "no data yet" and retried after `poll_interval`. Returns the response with
/// surrounding whitespace trimmed; a deadline with nothing received is
/// `HwError::Timeout`.
pub fn read_response_with_timeout(
    reader: &mut impl Read,
    terminator: u8,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String> {
    let deadline = Instant::now() + timeout;
    let mut response: Vec<u8> = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                response.extend_from_slice(&buf[..n]);
                if response.contains(&terminator) {
                    break;
                }
                continue;
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HwError::Io(e)),
        }
        if Instant::now() >= deadline {
            if response.is_empty() {
                return Err(HwError::Timeout);
            }
            break;
        }
        std::thread::sleep(poll_interval);
    }
    Ok(String::from_utf8_lossy(&response).trim().to_string())
}
