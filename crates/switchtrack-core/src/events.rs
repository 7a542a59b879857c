use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::TaskRecord;

/// Every successful session transition produces an Event.
/// Subscribers receive it synchronously; the CLI prints it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskNameChanged {
        name: String,
        at: DateTime<Utc>,
    },
    TaskStarted {
        name: String,
        session_started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The active task was switched away from and folded into history.
    TaskSwitched {
        record: TaskRecord,
        switch_count: u32,
        at: DateTime<Utc>,
    },
    /// The session ended while a task was active; the task was flushed.
    SessionEnded {
        record: TaskRecord,
        switch_count: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        cleared_records: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TaskNameChanged { at, .. }
            | Event::TaskStarted { at, .. }
            | Event::TaskSwitched { at, .. }
            | Event::SessionEnded { at, .. }
            | Event::SessionReset { at, .. } => *at,
        }
    }

    /// The record appended by this transition, if any.
    pub fn record(&self) -> Option<&TaskRecord> {
        match self {
            Event::TaskSwitched { record, .. } | Event::SessionEnded { record, .. } => {
                Some(record)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = Event::SessionReset {
            cleared_records: 3,
            at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_reset");
        assert_eq!(json["cleared_records"], 3);
    }
}
