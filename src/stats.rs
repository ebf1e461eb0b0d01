//! Receive-throughput telemetry.
//!
//! Observational only: the meter logs, it never steers control flow.

use std::time::{Duration, Instant};

use tracing::info;

/// Rolling byte counter with a sampling window.
///
/// Feed it every received byte; once more than a window has elapsed since
/// the last report it logs the kbps figure and starts a fresh window.
#[derive(Debug)]
pub struct RateMeter {
    bytes: u64,
    window: Duration,
    last_report: Instant,
}

impl RateMeter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            bytes: 0,
            window,
            last_report: Instant::now(),
        }
    }

    /// Count `n` received bytes, reporting if the window has elapsed.
    pub fn add(&mut self, n: usize) {
        self.bytes += n as u64;

        let elapsed = self.last_report.elapsed();
        if elapsed > self.window {
            let kbps = self.bytes as f64 * 8.0 / elapsed.as_secs_f64() / 1e3;
            info!("recv rate = {kbps:5.1} kbps");
            self.bytes = 0;
            self.last_report = Instant::now();
        }
    }

    /// Bytes accumulated in the current window.
    pub fn bytes_in_window(&self) -> u64 {
        self.bytes
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_within_the_window() {
        let mut meter = RateMeter::with_window(Duration::from_secs(3600));
        meter.add(10);
        meter.add(22);
        assert_eq!(meter.bytes_in_window(), 32);
    }

    #[test]
    fn reports_and_resets_after_the_window() {
        let mut meter = RateMeter::with_window(Duration::from_millis(1));
        meter.add(10);
        std::thread::sleep(Duration::from_millis(5));
        meter.add(1);
        assert_eq!(meter.bytes_in_window(), 0);
    }
}
