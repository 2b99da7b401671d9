//! Agent error types.
//!
//! Misuse of the state machine fails fast with [`AgentError::State`]. Failures
//! of individual collectors during fan-out operations never abort the remaining
//! collectors; they are gathered into [`CollectorFailures`] in registration
//! order.

use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::agent::{AgentState, Operation};
use crate::collector::CollectorError;

/// Collector lifecycle phase a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Start,
    Stop,
    Destroy,
}

/// A single collector failure.
#[derive(Debug, Error)]
#[error("{name} ({phase}): {source}")]
pub struct CollectorFailure {
    /// Name the collector was registered under.
    pub name: String,
    /// Phase the failure occurred in.
    pub phase: Phase,
    /// Error reported by the collector.
    #[source]
    pub source: CollectorError,
}

/// Ordered set of per-collector failures from one fan-out operation.
#[derive(Debug, Default)]
pub struct CollectorFailures {
    failures: Vec<CollectorFailure>,
}

impl CollectorFailures {
    pub(crate) fn push(&mut self, name: &str, phase: Phase, source: CollectorError) {
        tracing::error!(collector = %name, phase = %phase, error = %source, "Collector failed");
        self.failures.push(CollectorFailure {
            name: name.to_string(),
            phase,
            source,
        });
    }

    /// Whether no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Iterate over failures in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, CollectorFailure> {
        self.failures.iter()
    }

    /// Failure recorded for collector `name`, if any.
    pub fn get(&self, name: &str) -> Option<&CollectorFailure> {
        self.failures.iter().find(|f| f.name == name)
    }

    /// Convert into a result: `Ok(())` when empty.
    pub(crate) fn into_result(self) -> Result<(), AgentError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AgentError::Collectors(self))
        }
    }
}

impl IntoIterator for CollectorFailures {
    type Item = CollectorFailure;
    type IntoIter = std::vec::IntoIter<CollectorFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl std::fmt::Display for CollectorFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} collector(s) failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

/// Errors returned by [`Agent`](crate::Agent) operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Operation invoked in the wrong state. No side effect took place.
    #[error("agent state error: cannot {operation} while {state}")]
    State {
        operation: Operation,
        state: AgentState,
    },

    /// A collector with this name is already registered.
    #[error("collector '{0}' is already registered")]
    DuplicateName(String),

    /// Event buffer capacity must be at least one.
    #[error("invalid buffer size: {0}")]
    InvalidBufferSize(usize),

    /// Collector initialization failed; the collector was not registered.
    #[error("collector '{name}' failed to initialize: {source}")]
    Init {
        name: String,
        #[source]
        source: CollectorError,
    },

    /// One or more collectors failed during a fan-out operation.
    #[error("{0}")]
    Collectors(CollectorFailures),
}

impl AgentError {
    /// Per-collector failures, if this is an aggregate error.
    pub fn failures(&self) -> Option<&CollectorFailures> {
        match self {
            Self::Collectors(failures) => Some(failures),
            _ => None,
        }
    }

    /// Whether this is a state machine error.
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}
