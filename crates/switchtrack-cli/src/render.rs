//! Terminal rendering of session state, metrics and events.
//!
//! Text mode prints short human lines; JSON mode prints one JSON document
//! per line, each with a `type` field.

use std::io::{self, Write};

use serde_json::json;
use switchtrack_core::display::{
    alert_message, format_duration, format_hours_minutes, whole_minutes, DEEP_WORK_TIPS,
};
use switchtrack_core::{Event, MetricsSnapshot, SessionSnapshot, Tick};

use crate::repl::HELP;

const ALERT_HEADING: &str = "High context switching detected";

pub struct Presenter<W> {
    out: W,
    json: bool,
    history_limit: usize,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, json: bool, history_limit: usize) -> Self {
        Self {
            out,
            json,
            history_limit,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn event(&mut self, event: &Event) -> io::Result<()> {
        if self.json {
            return self.line(&serde_json::to_string(event)?);
        }
        let text = match event {
            Event::TaskNameChanged { name, .. } => format!("next task: {name}"),
            Event::TaskStarted { name, .. } => format!("started: {name}"),
            Event::TaskSwitched {
                record,
                switch_count,
                ..
            } => format!(
                "switched away from '{}' after {} (switch #{})",
                record.name,
                format_duration(record.duration_ms),
                switch_count
            ),
            Event::SessionEnded { record, .. } => format!(
                "session ended: '{}' ran {}",
                record.name,
                format_duration(record.duration_ms)
            ),
            Event::SessionReset {
                cleared_records, ..
            } => format!("session reset ({cleared_records} records cleared)"),
        };
        self.line(&text)
    }

    /// A guarded command did nothing.
    pub fn ignored(&mut self, command: &str, reason: &str) -> io::Result<()> {
        if self.json {
            let doc = json!({ "type": "ignored", "command": command, "reason": reason });
            return self.line(&doc.to_string());
        }
        self.line(&format!("{command} ignored: {reason}"))
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        if self.json {
            let doc = json!({ "type": "error", "message": message });
            return self.line(&doc.to_string());
        }
        self.line(&format!("error: {message}"))
    }

    pub fn status(&mut self, snapshot: &SessionSnapshot) -> io::Result<()> {
        if self.json {
            let doc = json!({ "type": "status", "session": snapshot });
            return self.line(&doc.to_string());
        }
        let text = if snapshot.is_tracking {
            format!(
                "tracking '{}' for {}",
                snapshot.current_task_name.trim(),
                format_duration(snapshot.elapsed_ms)
            )
        } else if snapshot.current_task_name.trim().is_empty() {
            "idle".to_string()
        } else {
            format!("idle (next task: '{}')", snapshot.current_task_name.trim())
        };
        self.line(&text)
    }

    pub fn metrics(&mut self, m: &MetricsSnapshot) -> io::Result<()> {
        if self.json {
            let doc = json!({ "type": "metrics", "metrics": m });
            return self.line(&doc.to_string());
        }
        let lines = [
            format!(
                "Context switches:  {} (~{} min lost)",
                m.switch_count, m.estimated_lost_minutes
            ),
            format!(
                "Avg task duration: {}m ({} tasks completed)",
                whole_minutes(m.average_task_duration_ms as u64),
                m.completed_tasks
            ),
            format!(
                "Longest task:      {}",
                format_duration(m.longest_task_ms)
            ),
            format!(
                "Deep work:         {:.0}% (tasks >= {} min)",
                m.deep_work_percentage,
                whole_minutes(m.deep_work_threshold_ms)
            ),
            format!(
                "Total session:     {}",
                format_hours_minutes(m.total_time_ms)
            ),
            format!(
                "Productivity loss: {:.0}%",
                m.productivity_loss_percentage
            ),
        ];
        for line in &lines {
            self.line(line)?;
        }
        if let Some(alert) = alert_message(m) {
            self.line(&format!("! {ALERT_HEADING}: {alert}"))?;
        }
        Ok(())
    }

    pub fn history(&mut self, snapshot: &SessionSnapshot, threshold_ms: u64) -> io::Result<()> {
        let limit = match self.history_limit {
            0 => snapshot.history.len(),
            n => n,
        };
        let recent = snapshot.history.iter().rev().take(limit);

        if self.json {
            let records: Vec<_> = recent.collect();
            let doc = json!({ "type": "history", "records": records });
            return self.line(&doc.to_string());
        }
        if snapshot.history.is_empty() {
            return self.line("no completed tasks yet");
        }
        for record in recent {
            let started = record
                .started_at
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S");
            let badge = if record.is_deep_work(threshold_ms) {
                "  [deep work]"
            } else {
                ""
            };
            let text = format!(
                "{:<24} {:>12}  started {}{}",
                record.name,
                format_duration(record.duration_ms),
                started,
                badge
            );
            self.line(&text)?;
        }
        Ok(())
    }

    pub fn tick(
        &mut self,
        tick: Tick,
        snapshot: &SessionSnapshot,
        m: &MetricsSnapshot,
    ) -> io::Result<()> {
        if self.json {
            let doc = json!({
                "type": "tick",
                "seq": tick.seq,
                "elapsed_ms": snapshot.elapsed_ms,
                "total_time_ms": m.total_time_ms,
            });
            return self.line(&doc.to_string());
        }
        self.line(&format!(
            "  {} {}",
            snapshot.current_task_name.trim(),
            format_duration(snapshot.elapsed_ms)
        ))
    }

    /// The high-switching alert turned on or off since the last check.
    pub fn alert_changed(&mut self, m: &MetricsSnapshot) -> io::Result<()> {
        if self.json {
            let doc = json!({
                "type": "alert",
                "active": m.high_switching_alert,
                "switch_count": m.switch_count,
                "productivity_loss_percentage": m.productivity_loss_percentage,
            });
            return self.line(&doc.to_string());
        }
        match alert_message(m) {
            Some(alert) => self.line(&format!("! {ALERT_HEADING}: {alert}")),
            None => self.line("switching alert cleared"),
        }
    }

    pub fn tips(&mut self) -> io::Result<()> {
        if self.json {
            let doc = json!({ "type": "tips", "tips": DEEP_WORK_TIPS });
            return self.line(&doc.to_string());
        }
        for tip in DEEP_WORK_TIPS {
            self.line(&format!("- {tip}"))?;
        }
        Ok(())
    }

    pub fn help(&mut self) -> io::Result<()> {
        if self.json {
            let commands: Vec<_> = HELP
                .iter()
                .map(|(usage, about)| json!({ "usage": usage, "about": about }))
                .collect();
            let doc = json!({ "type": "help", "commands": commands });
            return self.line(&doc.to_string());
        }
        for (usage, about) in HELP {
            self.line(&format!("  {usage:<16} {about}"))?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}
