//! Agent lifecycle state.

use strum_macros::{AsRefStr, Display};

/// Lifecycle state of an [`Agent`](crate::Agent).
///
/// ```text
/// Waiting --start--> Running --stop--> Waiting --destroy--> Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AgentState {
    /// Idle; collectors may be registered or destroyed.
    Waiting,
    /// A session is active and collectors are running.
    Running,
    /// Collectors were destroyed; the agent is inert.
    Destroyed,
}

/// Agent operations guarded by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Add and initialize a collector.
    RegisterCollector,
    /// Launch a session.
    Start,
    /// End the running session.
    Stop,
    /// Tear down every collector.
    Destroy,
}

impl Operation {
    /// The state this operation requires.
    pub fn required_state(self) -> AgentState {
        match self {
            Self::Stop => AgentState::Running,
            Self::RegisterCollector | Self::Start | Self::Destroy => AgentState::Waiting,
        }
    }
}
