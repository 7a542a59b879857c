use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TaskId;

/// One completed (or abandoned) unit of focused work.
///
/// Built only by the engine's completion step and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    /// Trimmed, non-empty label.
    pub name: String,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn is_deep_work(&self, threshold_ms: u64) -> bool {
        self.duration_ms >= threshold_ms
    }
}
