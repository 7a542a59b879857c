//! Focus metrics derived from a session.
//!
//! Everything here is a pure projection of a [`SessionState`] and a
//! caller-sampled instant. Nothing is cached; the presentation layer
//! recomputes on every command and every tick.
//!
//! - **Total time**: completed durations plus the live elapsed time of the
//!   active task
//! - **Average / longest**: completed tasks only
//! - **Deep work**: completed tasks at or above the threshold (25 min)
//! - **Refocus cost**: a flat penalty per switch (23 min)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Deep work threshold: 25 minutes.
pub const DEEP_WORK_THRESHOLD_MS: u64 = 25 * 60 * 1000;

/// Estimated minutes lost reorienting after each switch.
pub const REFOCUS_COST_MINUTES_PER_SWITCH: u64 = 23;

/// Alert fires only above this many switches.
pub const ALERT_SWITCH_COUNT: u32 = 5;

/// Alert fires only above this productivity loss (percent).
pub const ALERT_LOSS_PERCENTAGE: f64 = 30.0;

const MS_PER_MINUTE: u64 = 60_000;

/// Thresholds and costs the metrics are computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPolicy {
    pub deep_work_threshold_ms: u64,
    pub refocus_cost_minutes_per_switch: u64,
    pub alert_switch_count: u32,
    pub alert_loss_percentage: f64,
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self {
            deep_work_threshold_ms: DEEP_WORK_THRESHOLD_MS,
            refocus_cost_minutes_per_switch: REFOCUS_COST_MINUTES_PER_SWITCH,
            alert_switch_count: ALERT_SWITCH_COUNT,
            alert_loss_percentage: ALERT_LOSS_PERCENTAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_time_ms: u64,
    /// Mean of completed durations in ms, unrounded.
    pub average_task_duration_ms: f64,
    pub longest_task_ms: u64,
    pub completed_tasks: usize,
    pub switch_count: u32,
    pub deep_work_threshold_ms: u64,
    pub deep_work_time_ms: u64,
    pub deep_work_tasks: usize,
    /// 0.0 .. 100.0
    pub deep_work_percentage: f64,
    pub refocus_cost_minutes_per_switch: u64,
    pub estimated_lost_minutes: u64,
    /// Unbounded; exceeds 100 when estimated loss outgrows tracked time.
    pub productivity_loss_percentage: f64,
    pub high_switching_alert: bool,
}

impl MetricsSnapshot {
    pub fn compute(state: &SessionState, now: DateTime<Utc>, policy: &MetricsPolicy) -> Self {
        let history = &state.history;
        let completed_ms = state.completed_ms();
        let total_time_ms = completed_ms + state.active_elapsed_ms(now);

        let average_task_duration_ms = if history.is_empty() {
            0.0
        } else {
            completed_ms as f64 / history.len() as f64
        };
        let longest_task_ms = history.iter().map(|t| t.duration_ms).max().unwrap_or(0);

        let threshold = policy.deep_work_threshold_ms;
        let (deep_work_tasks, deep_work_time_ms) = history
            .iter()
            .filter(|t| t.is_deep_work(threshold))
            .fold((0usize, 0u64), |(n, sum), t| (n + 1, sum + t.duration_ms));

        let estimated_lost_minutes =
            (state.switch_count as u64).saturating_mul(policy.refocus_cost_minutes_per_switch);
        let deep_work_percentage = percentage(deep_work_time_ms, total_time_ms);
        let productivity_loss_percentage = percentage(
            estimated_lost_minutes.saturating_mul(MS_PER_MINUTE),
            total_time_ms,
        );

        let high_switching_alert = state.switch_count > policy.alert_switch_count
            && productivity_loss_percentage > policy.alert_loss_percentage;

        Self {
            total_time_ms,
            average_task_duration_ms,
            longest_task_ms,
            completed_tasks: history.len(),
            switch_count: state.switch_count,
            deep_work_threshold_ms: threshold,
            deep_work_time_ms,
            deep_work_tasks,
            deep_work_percentage,
            refocus_cost_minutes_per_switch: policy.refocus_cost_minutes_per_switch,
            estimated_lost_minutes,
            productivity_loss_percentage,
            high_switching_alert,
        }
    }
}

/// `part * 100 / total`, or 0 when `total` is 0.
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TaskId;
    use crate::session::TaskRecord;
    use chrono::Duration;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn state_with(durations: &[u64]) -> SessionState {
        let history: Vec<TaskRecord> = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| TaskRecord {
                id: TaskId::new(format!("task-{}", i + 1)),
                name: format!("t{i}"),
                duration_ms: d,
                started_at: epoch(),
            })
            .collect();
        SessionState {
            switch_count: history.len() as u32,
            history,
            ..SessionState::default()
        }
    }

    #[test]
    fn empty_session_is_all_zero() {
        let m = MetricsSnapshot::compute(
            &SessionState::default(),
            epoch(),
            &MetricsPolicy::default(),
        );
        assert_eq!(m.total_time_ms, 0);
        assert_eq!(m.average_task_duration_ms, 0.0);
        assert_eq!(m.longest_task_ms, 0);
        assert_eq!(m.deep_work_percentage, 0.0);
        assert_eq!(m.productivity_loss_percentage, 0.0);
        assert!(!m.high_switching_alert);
    }

    #[test]
    fn average_excludes_in_progress_task() {
        let mut state = state_with(&[60_000, 120_000]);
        state.is_tracking = true;
        state.current_task_name = "live".into();
        state.active_started_at = Some(epoch());

        let now = epoch() + Duration::minutes(10);
        let m = MetricsSnapshot::compute(&state, now, &MetricsPolicy::default());
        assert_eq!(m.average_task_duration_ms, 90_000.0);
        assert_eq!(m.total_time_ms, 180_000 + 600_000);
        assert_eq!(m.longest_task_ms, 120_000);
    }

    #[test]
    fn deep_work_counts_only_long_tasks() {
        let state = state_with(&[DEEP_WORK_THRESHOLD_MS, 5 * 60_000, 40 * 60_000]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        assert_eq!(m.deep_work_tasks, 2);
        assert_eq!(m.deep_work_time_ms, 65 * 60_000);
        let expected = 65.0 / 70.0 * 100.0;
        assert!((m.deep_work_percentage - expected).abs() < 1e-9);
    }

    #[test]
    fn six_short_switches_raise_alert() {
        let state = state_with(&[120_000; 6]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        assert_eq!(m.switch_count, 6);
        assert_eq!(m.estimated_lost_minutes, 138);
        assert_eq!(m.total_time_ms, 720_000);
        assert!((m.productivity_loss_percentage - 1150.0).abs() < 1e-9);
        assert!(m.high_switching_alert);
    }

    #[test]
    fn five_switches_never_alert() {
        let state = state_with(&[1_000; 5]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        assert!(m.productivity_loss_percentage > 30.0);
        assert!(!m.high_switching_alert);
    }

    #[test]
    fn hour_long_tasks_still_alert() {
        let state = state_with(&[60 * 60_000; 6]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        // 138 lost minutes over 360 tracked minutes.
        assert!((m.productivity_loss_percentage - 138.0 / 360.0 * 100.0).abs() < 1e-9);
        assert!(m.high_switching_alert);
    }

    #[test]
    fn long_tasks_keep_loss_under_alert() {
        let state = state_with(&[80 * 60_000; 6]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        // 138 lost minutes over 480 tracked minutes.
        assert!((m.productivity_loss_percentage - 28.75).abs() < 1e-9);
        assert!(!m.high_switching_alert);
    }

    #[test]
    fn loss_of_exactly_thirty_percent_does_not_alert() {
        // 138 lost minutes over 460 tracked minutes.
        let state = state_with(&[4_600_000; 6]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        assert_eq!(m.productivity_loss_percentage, 30.0);
        assert!(!m.high_switching_alert);
    }

    #[test]
    fn average_keeps_fraction() {
        let state = state_with(&[1, 2]);
        let m = MetricsSnapshot::compute(&state, epoch(), &MetricsPolicy::default());
        assert_eq!(m.average_task_duration_ms, 1.5);
    }

    #[test]
    fn huge_refocus_cost_saturates() {
        let policy = MetricsPolicy {
            refocus_cost_minutes_per_switch: u64::MAX / 2,
            ..MetricsPolicy::default()
        };
        let state = state_with(&[1_000; 3]);
        let m = MetricsSnapshot::compute(&state, epoch(), &policy);
        assert_eq!(m.estimated_lost_minutes, u64::MAX);
        assert!(m.productivity_loss_percentage.is_finite());
        assert!(!m.high_switching_alert);
    }

    #[test]
    fn custom_policy_changes_threshold() {
        let policy = MetricsPolicy {
            deep_work_threshold_ms: 60_000,
            ..MetricsPolicy::default()
        };
        let state = state_with(&[60_000, 30_000]);
        let m = MetricsSnapshot::compute(&state, epoch(), &policy);
        assert_eq!(m.deep_work_time_ms, 60_000);
        assert_eq!(m.deep_work_threshold_ms, 60_000);
    }
}
