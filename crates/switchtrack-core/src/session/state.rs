use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::TaskRecord;
use crate::clock::elapsed_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Tracking,
}

/// Mutable root of a session. Only the engine holds a mutable handle.
///
/// Invariants kept by the engine:
/// - `is_tracking` implies `active_started_at` is set and the trimmed name is non-empty
/// - `switch_count == history.len()`
/// - `session_started_at` is fixed from the first start until reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_task_name: String,
    pub is_tracking: bool,
    pub active_started_at: Option<DateTime<Utc>>,
    pub session_started_at: Option<DateTime<Utc>>,
    pub switch_count: u32,
    pub history: Vec<TaskRecord>,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.is_tracking {
            SessionPhase::Tracking
        } else {
            SessionPhase::Idle
        }
    }

    /// Elapsed time of the active task at `now`, 0 when idle.
    pub fn active_elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_tracking, self.active_started_at) {
            (true, Some(started)) => elapsed_ms(started, now),
            _ => 0,
        }
    }

    pub fn completed_ms(&self) -> u64 {
        self.history.iter().map(|t| t.duration_ms).sum()
    }
}

/// Read-only view handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_task_name: String,
    pub is_tracking: bool,
    pub active_started_at: Option<DateTime<Utc>>,
    pub session_started_at: Option<DateTime<Utc>>,
    /// Live elapsed time of the active task.
    pub elapsed_ms: u64,
    pub switch_count: u32,
    pub history: Vec<TaskRecord>,
}

impl SessionSnapshot {
    pub fn capture(state: &SessionState, now: DateTime<Utc>) -> Self {
        Self {
            phase: state.phase(),
            current_task_name: state.current_task_name.clone(),
            is_tracking: state.is_tracking,
            active_started_at: state.active_started_at,
            session_started_at: state.session_started_at,
            elapsed_ms: state.active_elapsed_ms(now),
            switch_count: state.switch_count,
            history: state.history.clone(),
        }
    }
}
