//! Simulated wall-clock time derived from the system uptime.
//!
//! The interpreter has no real-time clock of its own: it takes the number of
//! ticks elapsed since boot, adds a configurable start time and a fixed timezone
//! offset, and folds the result into a 24-hour day.

use log::trace;
use std::fmt;
use std::fs;
use std::time::Instant;

/// Clock resolution of [`Clock::uptime_ticks`].
pub const TICKS_PER_SECOND: u64 = 100;

/// Offset applied to the start time, in seconds (UTC-5).
pub const TIMEZONE_OFFSET: i64 = -5 * 3600;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Source of elapsed time since boot.
pub trait Clock {
    /// Ticks elapsed since boot, at [`TICKS_PER_SECOND`] ticks per second.
    fn uptime_ticks(&self) -> u64;
}

/// Reads the host uptime from `/proc/uptime`.
///
/// Hosts without procfs fall back to the time elapsed since this clock was
/// created.
pub struct SystemClock {
    created: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            created: Instant::now(),
        }
    }

    fn proc_uptime_ticks() -> Option<u64> {
        let contents = fs::read_to_string("/proc/uptime").ok()?;
        let seconds: f64 = contents.split_whitespace().next()?.parse().ok()?;
        Some((seconds * TICKS_PER_SECOND as f64) as u64)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn uptime_ticks(&self) -> u64 {
        Self::proc_uptime_ticks().unwrap_or_else(|| {
            trace!("/proc/uptime unavailable, using process-local uptime");
            let elapsed = self.created.elapsed();
            elapsed.as_secs() * TICKS_PER_SECOND
                + u64::from(elapsed.subsec_millis()) * TICKS_PER_SECOND / 1000
        })
    }
}

/// Time of day, printed as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// Convert `ticks` since boot into a time of day.
///
/// `start_time` is the number of seconds past midnight at boot; the timezone
/// offset can push the total below zero, which wraps to the previous day.
pub fn wall_time(ticks: u64, start_time: i64) -> WallTime {
    let uptime = i64::try_from(ticks / TICKS_PER_SECOND).unwrap_or(i64::MAX);
    let total = start_time
        .saturating_add(uptime)
        .saturating_add(TIMEZONE_OFFSET)
        .rem_euclid(SECONDS_PER_DAY);

    // `total` is in 0..86400, so every component fits in a u8.
    WallTime {
        hours: (total / 3600) as u8,
        minutes: (total / 60 % 60) as u8,
        seconds: (total % 60) as u8,
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_at_midnight_shows_previous_evening() {
        assert_eq!(wall_time(0, 0).to_string(), "19:00:00");
    }

    #[test]
    fn test_ticks_are_whole_seconds() {
        // 1 hour, 2 minutes, 3.99 seconds of uptime
        let ticks = (3600 + 2 * 60 + 3) * TICKS_PER_SECOND + 99;
        assert_eq!(wall_time(ticks, 0).to_string(), "20:02:03");
    }

    #[test]
    fn test_wraps_past_midnight() {
        let ticks = 5 * 3600 * TICKS_PER_SECOND;
        assert_eq!(wall_time(ticks, 0).to_string(), "00:00:00");

        let ticks = (5 * 3600 + 61) * TICKS_PER_SECOND;
        assert_eq!(wall_time(ticks, 12 * 3600).to_string(), "12:01:01");
    }

    #[test]
    fn test_negative_start_time_wraps_backwards() {
        assert_eq!(wall_time(0, -1).to_string(), "18:59:59");
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock::new();
        let first = clock.uptime_ticks();
        let second = clock.uptime_ticks();
        assert!(second >= first);
    }
}
