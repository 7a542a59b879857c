//! # SwitchTrack Core Library
//!
//! This library provides the core logic for SwitchTrack, a context-switch
//! tracker. It records which task is active, how long each task runs before
//! the user switches away, and derives focus metrics from that history. All
//! presentation lives elsewhere (the `switchtrack` CLI is one such layer).
//!
//! ## Architecture
//!
//! - **Session Engine**: a clock-injected state machine (Idle / Tracking)
//!   that owns the task history and notifies subscribers of transitions
//! - **Metrics Engine**: a pure projection of the session state at a given
//!   instant (totals, deep work, refocus cost, switching alert)
//! - **Ticker**: a cancellable periodic task that drives live display refresh
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`MetricsSnapshot`]: Derived statistics
//! - [`Clock`] / [`IdGenerator`]: Injected capabilities
//! - [`LiveTicker`]: Display refresh while tracking
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod display;
pub mod error;
pub mod events;
pub mod ids;
pub mod metrics;
pub mod session;
pub mod storage;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use ids::{IdGenerator, SequentialIds, TaskId, UuidGenerator};
pub use metrics::{MetricsPolicy, MetricsSnapshot};
pub use session::{
    SessionEngine, SessionPhase, SessionSnapshot, SessionState, SubscriptionId, TaskRecord,
};
pub use storage::Config;
pub use ticker::{LiveTicker, Tick, Ticker, TickerHandle};
