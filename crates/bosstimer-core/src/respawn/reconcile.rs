//! Grace-window reconciliation.
//!
//! A stored next-spawn instant goes stale when nobody records the following
//! cut. Once `now` passes `next + grace`, the instant is rolled forward by
//! whole intervals and the number of rolled cycles is reported as skipped.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::EventMode;
use crate::boss::MINUTE_MS;
use crate::error::{CoreError, Result};

/// Grace window used when nothing else is configured.
pub const DEFAULT_GRACE_MINUTES: u32 = 60;

/// Outcome of [`adjust_with_grace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceAdjustment {
    pub adjusted_next_ms: i64,
    pub skipped_cycles: u64,
}

impl GraceAdjustment {
    pub fn on_schedule(next_ms: i64) -> Self {
        Self {
            adjusted_next_ms: next_ms,
            skipped_cycles: 0,
        }
    }
}

/// Effective interval in milliseconds for a boss under `mode`.
///
/// # Errors
/// Returns [`CoreError::InvalidInterval`] for a zero-minute interval.
pub fn interval_ms(respawn_minutes: u32, mode: EventMode) -> Result<i64> {
    if respawn_minutes == 0 {
        return Err(CoreError::InvalidInterval { respawn_minutes });
    }
    Ok(mode.scale_interval_ms(i64::from(respawn_minutes) * MINUTE_MS))
}

/// Roll `raw_next_ms` forward past missed cycles.
///
/// Within `next + grace` nothing moves. Past it, the skipped count is
/// `floor(overshoot / interval) + 1` and the next instant advances by that
/// many intervals, which leaves `adjusted + grace >= now`.
///
/// # Errors
/// Returns [`CoreError::InvalidInterval`] for a zero-minute interval.
pub fn adjust_with_grace(
    raw_next_ms: i64,
    respawn_minutes: u32,
    mode: EventMode,
    grace_minutes: u32,
    now_ms: i64,
) -> Result<GraceAdjustment> {
    let interval = interval_ms(respawn_minutes, mode)?;
    let deadline = raw_next_ms + i64::from(grace_minutes) * MINUTE_MS;

    if now_ms <= deadline {
        return Ok(GraceAdjustment::on_schedule(raw_next_ms));
    }

    let overshoot = now_ms - deadline;
    let skipped = overshoot / interval + 1;
    Ok(GraceAdjustment {
        adjusted_next_ms: raw_next_ms + skipped * interval,
        skipped_cycles: skipped as u64,
    })
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
