//! Session engine implementation.
//!
//! The session engine is a clock-injected state machine. It owns no timers;
//! the presentation layer re-reads [`SessionEngine::snapshot`] and
//! [`SessionEngine::metrics`] whenever it wants a fresher picture.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Tracking --(switch | end)--> Idle
//!   ^                                            |
//!   +------------------- reset ------------------+
//! ```
//!
//! Commands return `Some(Event)` when the transition happened and `None`
//! when a guard turned the command into a no-op.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(SystemClock, UuidGenerator);
//! engine.start_task("writing");
//! // later
//! engine.switch_to("email");
//! let metrics = engine.metrics();
//! ```

use std::fmt;

use chrono::{DateTime, Utc};

use super::record::TaskRecord;
use super::state::{SessionPhase, SessionSnapshot, SessionState};
use crate::clock::{elapsed_ms, Clock};
use crate::events::Event;
use crate::ids::IdGenerator;
use crate::metrics::{MetricsPolicy, MetricsSnapshot};

/// Handle returned by [`SessionEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Event)>;

/// Core session engine.
///
/// Owns the only [`SessionState`] of a session. Every successful command
/// is reported to subscribers in subscription order before it returns.
pub struct SessionEngine<C, G> {
    clock: C,
    ids: G,
    policy: MetricsPolicy,
    state: SessionState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<C: Clock, G: IdGenerator> SessionEngine<C, G> {
    pub fn new(clock: C, ids: G) -> Self {
        Self::with_policy(clock, ids, MetricsPolicy::default())
    }

    pub fn with_policy(clock: C, ids: G, policy: MetricsPolicy) -> Self {
        Self {
            clock,
            ids,
            policy,
            state: SessionState::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking
    }

    pub fn history(&self) -> &[TaskRecord] {
        &self.state.history
    }

    pub fn policy(&self) -> &MetricsPolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Elapsed time of the active task, 0 when idle.
    pub fn elapsed_ms(&self) -> u64 {
        self.state.active_elapsed_ms(self.clock.now())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.state, self.clock.now())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics_at(self.clock.now())
    }

    pub fn metrics_at(&self, now: DateTime<Utc>) -> MetricsSnapshot {
        MetricsSnapshot::compute(&self.state, now, &self.policy)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Update the pending task label.
    ///
    /// Ignored while tracking: the active task keeps the name it started with.
    pub fn set_current_task_name(&mut self, text: &str) -> Option<Event> {
        if self.state.is_tracking {
            tracing::trace!("ignoring task name change while tracking");
            return None;
        }
        self.state.current_task_name = text.to_string();
        let event = Event::TaskNameChanged {
            name: self.state.current_task_name.clone(),
            at: self.clock.now(),
        };
        Some(self.emit(event))
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_tracking {
            tracing::trace!("start ignored: already tracking");
            return None;
        }
        let name = self.state.current_task_name.trim();
        if name.is_empty() {
            tracing::trace!("start ignored: empty task name");
            return None;
        }
        let name = name.to_string();

        let now = self.clock.now();
        let session_started_at = *self.state.session_started_at.get_or_insert(now);
        self.state.active_started_at = Some(now);
        self.state.is_tracking = true;

        tracing::debug!(task = %name, "task started");
        Some(self.emit(Event::TaskStarted {
            name,
            session_started_at,
            at: now,
        }))
    }

    pub fn switch_task(&mut self) -> Option<Event> {
        let (record, at) = self.complete_active()?;
        tracing::info!(
            task = %record.name,
            duration_ms = record.duration_ms,
            switches = self.state.switch_count,
            "task switched"
        );
        Some(self.emit(Event::TaskSwitched {
            record,
            switch_count: self.state.switch_count,
            at,
        }))
    }

    /// Flush the active task into history, keeping the session's record.
    pub fn end_session(&mut self) -> Option<Event> {
        let (record, at) = self.complete_active()?;
        tracing::info!(
            task = %record.name,
            duration_ms = record.duration_ms,
            completed = self.state.history.len(),
            "session ended"
        );
        Some(self.emit(Event::SessionEnded {
            record,
            switch_count: self.state.switch_count,
            at,
        }))
    }

    pub fn reset(&mut self) -> Option<Event> {
        let cleared_records = self.state.history.len();
        self.state = SessionState::default();
        tracing::info!(cleared_records, "session reset");
        let event = Event::SessionReset {
            cleared_records,
            at: self.clock.now(),
        };
        Some(self.emit(event))
    }

    /// Set the label and start it. Returns the start event, if the start happened.
    pub fn start_task(&mut self, name: &str) -> Option<Event> {
        self.set_current_task_name(name)?;
        self.start()
    }

    /// Switch away from the active task and immediately start `next`.
    ///
    /// Returns the switch event; `next` is started only if the switch happened.
    pub fn switch_to(&mut self, next: &str) -> Option<Event> {
        let switched = self.switch_task()?;
        self.start_task(next);
        Some(switched)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The one place a `TaskRecord` is born. Both switch and end go through here.
    fn complete_active(&mut self) -> Option<(TaskRecord, DateTime<Utc>)> {
        if !self.state.is_tracking {
            tracing::trace!("completion ignored: not tracking");
            return None;
        }
        let name = self.state.current_task_name.trim();
        if name.is_empty() {
            tracing::trace!("completion ignored: empty task name");
            return None;
        }
        let started_at = self.state.active_started_at?;
        let name = name.to_string();

        let now = self.clock.now();
        let record = TaskRecord {
            id: self.ids.next_id(),
            name,
            duration_ms: elapsed_ms(started_at, now),
            started_at,
        };

        self.state.history.push(record.clone());
        self.state.switch_count += 1;
        self.state.current_task_name.clear();
        self.state.active_started_at = None;
        self.state.is_tracking = false;

        Some((record, now))
    }

    fn emit(&mut self, event: Event) -> Event {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
        event
    }
}

impl<C, G> fmt::Debug for SessionEngine<C, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
