//! Building new cut records: a normal cut, and the synthetic first-cycle
//! cuts seeded from a server-open time.

use super::mode::EventMode;
use super::reconcile::interval_ms;
use crate::boss::{Boss, NewCutRecord, MINUTE_MS};
use crate::error::Result;

/// The record for `boss` cut at `cut_ms`: next spawn is one interval later,
/// using the mode in effect now.
///
/// # Errors
/// Fails on a zero-minute interval or an out-of-range instant.
pub fn plan_cut(boss: &Boss, cut_ms: i64, mode: EventMode) -> Result<NewCutRecord> {
    let next_ms = cut_ms + interval_ms(boss.respawn_minutes, mode)?;
    Ok(NewCutRecord::from_ms(boss, cut_ms, next_ms)?)
}

/// One record per boss whose next spawn is the first spawn after server
/// open. The cut instant is backdated by one interval so the regular
/// reconciliation produces that first cycle unchanged.
///
/// # Errors
/// Fails on the first boss with a zero-minute interval.
pub fn plan_initial_cuts(
    server_open_ms: i64,
    bosses: &[Boss],
    mode: EventMode,
) -> Result<Vec<NewCutRecord>> {
    bosses
        .iter()
        .map(|boss| {
            let first_respawn_ms =
                server_open_ms + i64::from(boss.first_respawn_minutes) * MINUTE_MS;
            let interval = interval_ms(boss.respawn_minutes, mode)?;
            Ok(NewCutRecord::from_ms(
                boss,
                first_respawn_ms - interval,
                first_respawn_ms,
            )?)
        })
        .collect()
}
