//! Countdown refresh cadence.
//!
//! Like the rest of the engine this holds no thread: the host calls
//! `poll()` from its own loop or timer and recomputes the board whenever it
//! returns true. While a manual-entry form is open the ticker is suspended
//! so the countdown does not move under the user's input.

use serde::{Deserialize, Serialize};

/// Recompute cadence used when nothing else is configured.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTicker {
    cadence_ms: i64,
    #[serde(default)]
    last_refresh_ms: Option<i64>,
    #[serde(default)]
    suspended: bool,
}

impl RefreshTicker {
    pub fn new(cadence_secs: u64) -> Self {
        Self {
            cadence_ms: cadence_ms(cadence_secs),
            last_refresh_ms: None,
            suspended: false,
        }
    }

    pub fn cadence_ms(&self) -> i64 {
        self.cadence_ms
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// True when a recompute is due at `now_ms`; marks it done.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        if self.suspended {
            return false;
        }
        let due = match self.last_refresh_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.cadence_ms,
        };
        if due {
            self.last_refresh_ms = Some(now_ms);
        }
        due
    }

    /// Milliseconds until the next poll would fire, `None` while suspended.
    pub fn until_next_ms(&self, now_ms: i64) -> Option<i64> {
        if self.suspended {
            return None;
        }
        Some(match self.last_refresh_ms {
            None => 0,
            Some(last) => last
                .saturating_add(self.cadence_ms)
                .saturating_sub(now_ms)
                .max(0),
        })
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Leave suspension; the next poll fires immediately.
    pub fn resume(&mut self) {
        self.suspended = false;
        self.last_refresh_ms = None;
    }
}

/// Whole seconds to milliseconds, at least one second. Cadences past the
/// i64 range saturate.
fn cadence_ms(secs: u64) -> i64 {
    i64::try_from(secs.max(1))
        .ok()
        .and_then(|s| s.checked_mul(1_000))
        .unwrap_or(i64::MAX)
}

impl Default for RefreshTicker {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_cadence() {
        let mut ticker = RefreshTicker::new(30);
        assert!(ticker.poll(0));
        assert!(!ticker.poll(29_999));
        assert!(ticker.poll(30_000));
        assert_eq!(ticker.until_next_ms(45_000), Some(15_000));
    }

    #[test]
    fn suspended_ticker_stays_quiet() {
        let mut ticker = RefreshTicker::new(30);
        assert!(ticker.poll(0));
        ticker.suspend();
        assert!(!ticker.poll(120_000));
        assert_eq!(ticker.until_next_ms(120_000), None);

        ticker.resume();
        assert!(ticker.poll(120_001));
        assert!(!ticker.poll(120_002));
    }

    #[test]
    fn zero_cadence_is_clamped() {
        assert_eq!(RefreshTicker::new(0).cadence_ms(), 1_000);
        assert_eq!(RefreshTicker::default().cadence_ms(), 30_000);
    }

    #[test]
    fn huge_cadence_saturates() {
        assert_eq!(RefreshTicker::new(10_000_000_000_000_000).cadence_ms(), i64::MAX);

        let mut ticker = RefreshTicker::new(u64::MAX);
        assert_eq!(ticker.cadence_ms(), i64::MAX);
        assert!(ticker.poll(0));
        assert!(!ticker.poll(1));
        assert!(!ticker.poll(2));
        assert_eq!(ticker.until_next_ms(2), Some(i64::MAX - 2));
    }
}
