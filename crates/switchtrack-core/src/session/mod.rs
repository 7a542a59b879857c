mod engine;
mod record;
mod state;

pub use engine::{SessionEngine, SubscriptionId};
pub use record::TaskRecord;
pub use state::{SessionPhase, SessionSnapshot, SessionState};
