//! Human-readable countdown text.

const SEC_MS: i64 = 1_000;

/// Minutes after a spawn during which it still reads "just respawned".
const JUST_RESPAWNED_MINUTES: i64 = 3;

/// Time left until `target_ms`, or time since it passed.
///
/// ```
/// use bosstimer_core::board::remaining_human;
/// assert_eq!(remaining_human(3_900_000, 0), "1h 5m left");
/// assert_eq!(remaining_human(0, 60_000), "just respawned");
/// ```
pub fn remaining_human(target_ms: i64, now_ms: i64) -> String {
    let diff = target_ms - now_ms;

    if diff > 0 {
        let sec = diff / SEC_MS;
        let min = sec / 60;
        let hour = min / 60;
        if hour > 0 {
            return format!("{hour}h {}m left", min % 60);
        }
        if min > 0 {
            return format!("{min}m left");
        }
        return format!("{sec}s left");
    }

    let passed = -diff;
    let min = passed / SEC_MS / 60;
    let hour = min / 60;

    if min < JUST_RESPAWNED_MINUTES {
        return "just respawned".to_string();
    }
    if hour > 0 {
        return format!("{hour}h {}m ago", min % 60);
    }
    format!("{min}m ago")
}
