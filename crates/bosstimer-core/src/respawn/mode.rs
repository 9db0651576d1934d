use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Process-wide event mode. Halves every respawn interval while a double
/// event is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    #[default]
    Normal,
    DoubleEvent,
}

impl EventMode {
    pub fn from_double(is_double_event: bool) -> Self {
        if is_double_event {
            EventMode::DoubleEvent
        } else {
            EventMode::Normal
        }
    }

    pub fn is_double_event(self) -> bool {
        self == EventMode::DoubleEvent
    }

    pub fn multiplier(self) -> f64 {
        match self {
            EventMode::Normal => 1.0,
            EventMode::DoubleEvent => 0.5,
        }
    }

    /// Apply the multiplier to a base interval. Base intervals are whole
    /// minutes, so halving them stays exact.
    pub fn scale_interval_ms(self, base_ms: i64) -> i64 {
        match self {
            EventMode::Normal => base_ms,
            EventMode::DoubleEvent => base_ms / 2,
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventMode::Normal => f.write_str("normal"),
            EventMode::DoubleEvent => f.write_str("double"),
        }
    }
}

impl FromStr for EventMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(EventMode::Normal),
            "double" | "double_event" | "double-event" => Ok(EventMode::DoubleEvent),
            other => Err(format!("unknown event mode '{other}' (expected normal or double)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_event_halves_interval() {
        assert_eq!(EventMode::DoubleEvent.scale_interval_ms(7_200_000), 3_600_000);
        assert_eq!(EventMode::Normal.scale_interval_ms(7_200_000), 7_200_000);
        assert_eq!(EventMode::DoubleEvent.multiplier(), 0.5);
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("Double".parse::<EventMode>().unwrap(), EventMode::DoubleEvent);
        assert_eq!("normal".parse::<EventMode>().unwrap(), EventMode::Normal);
        assert!("triple".parse::<EventMode>().is_err());
    }

    #[test]
    fn bool_roundtrip() {
        assert!(EventMode::from_double(true).is_double_event());
        assert!(!EventMode::from_double(false).is_double_event());
    }
}
