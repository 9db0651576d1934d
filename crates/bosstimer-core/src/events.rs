use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::boss::CutRecord;
use crate::respawn::EventMode;

/// Every confirmed store write produces an Event.
/// Hosts drain them after each operation to report or log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CutRecorded {
        record: CutRecord,
        at: DateTime<Utc>,
    },
    RecordsCleared {
        deleted: usize,
        at: DateTime<Utc>,
    },
    EventModeChanged {
        mode: EventMode,
        at: DateTime<Utc>,
    },
    InitialCutsSeeded {
        count: usize,
        server_open: DateTime<Utc>,
        mode: EventMode,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::EventModeChanged {
            mode: EventMode::DoubleEvent,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "event_mode_changed");
        assert_eq!(json["mode"], "double_event");
    }
}
