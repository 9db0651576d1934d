//! Manual "HH:MM" cut entry.
//!
//! A typed clock time is resolved to today's or yesterday's instant in the
//! caller's time zone. Only instants in the past and within one base
//! interval of `now` are accepted.

use chrono::{DateTime, NaiveDateTime, TimeZone};

use crate::boss::MINUTE_MS;
use crate::error::ValidationError;

const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Resolve a manual cut time to epoch milliseconds.
///
/// The staleness bound uses the base interval; the event multiplier is not
/// applied here.
///
/// # Errors
/// Returns a [`ValidationError`] describing why the input was rejected.
pub fn resolve_manual_cut_instant<Tz: TimeZone>(
    respawn_minutes: u32,
    hour_str: &str,
    minute_str: &str,
    now: &DateTime<Tz>,
) -> Result<i64, ValidationError> {
    let (hour, minute) = parse_clock_parts(hour_str, minute_str)?;
    let now_ms = now.timestamp_millis();

    let today = local_instant_today(now, hour, minute)?;
    if today > now_ms {
        return Err(ValidationError::FutureTime);
    }
    let yesterday = today - DAY_MS;

    let interval = i64::from(respawn_minutes) * MINUTE_MS;
    [today, yesterday]
        .into_iter()
        .filter(|&candidate| candidate <= now_ms)
        .filter(|&candidate| now_ms - candidate <= interval)
        .max()
        .ok_or(ValidationError::TooOld { respawn_minutes })
}

/// Resolve a server-open clock time ("HH:MM") to the most recent matching
/// instant: today's, or yesterday's when today's has not happened yet.
///
/// # Errors
/// Returns a [`ValidationError`] when the string is not a valid clock time.
pub fn resolve_server_open<Tz: TimeZone>(
    clock: &str,
    now: &DateTime<Tz>,
) -> Result<i64, ValidationError> {
    let (hour_str, minute_str) = clock
        .split_once(':')
        .ok_or_else(|| ValidationError::MalformedClock(clock.to_string()))?;
    let (hour, minute) = parse_clock_parts(hour_str, minute_str)?;

    let today = local_instant_today(now, hour, minute)?;
    if today > now.timestamp_millis() {
        Ok(today - DAY_MS)
    } else {
        Ok(today)
    }
}

fn parse_clock_parts(hour_str: &str, minute_str: &str) -> Result<(u32, u32), ValidationError> {
    let hour = parse_component(hour_str)?;
    let minute = parse_component(minute_str)?;

    if !(0..=23).contains(&hour) {
        return Err(ValidationError::HourOutOfRange(hour));
    }
    if !(0..=59).contains(&minute) {
        return Err(ValidationError::MinuteOutOfRange(minute));
    }
    Ok((hour as u32, minute as u32))
}

fn parse_component(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber)
}

/// `now`'s calendar date at HH:MM:00.000 local time. A DST fold resolves to
/// the earlier instant.
fn local_instant_today<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
) -> Result<i64, ValidationError> {
    let naive: NaiveDateTime = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or(ValidationError::NonexistentLocalTime { hour, minute })?;
    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or(ValidationError::NonexistentLocalTime { hour, minute })
}
