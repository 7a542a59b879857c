//! Text helpers shared by presentation layers.

use crate::metrics::MetricsSnapshot;

pub const DEEP_WORK_TIPS: [&str; 5] = [
    "Aim for task blocks of at least 25 minutes to enter flow state",
    "Each context switch costs ~23 minutes of refocusing time",
    "Schedule \"context switch time\" for emails, messages, and quick tasks",
    "Protect your morning hours for deep, creative work",
    "Use \"Do Not Disturb\" mode during tracked tasks",
];

/// `"{h}h {m}m {s}s"`, each component floored.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
}

/// `"{h}h {m}m"`, used for session totals.
pub fn format_hours_minutes(ms: u64) -> String {
    format!("{}h {}m", ms / 3_600_000, (ms % 3_600_000) / 60_000)
}

pub fn whole_minutes(ms: u64) -> u64 {
    ms / 60_000
}

/// Warning text, present only when the high-switching alert is raised.
pub fn alert_message(metrics: &MetricsSnapshot) -> Option<String> {
    if !metrics.high_switching_alert {
        return None;
    }
    Some(format!(
        "You've switched tasks {} times, potentially losing {:.0}% of your productivity.",
        metrics.switch_count, metrics.productivity_loss_percentage
    ))
}
