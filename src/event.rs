//! Event values flowing from collectors to the agent.

use serde::{Deserialize, Serialize};

/// A named payload emitted by a collector.
///
/// Events are immutable once constructed and compare by value. They are moved
/// into the agent's buffer on delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    name: String,
    content: String,
}

impl Event {
    /// Create a new event.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Name of the event, usually the emitting collector's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event payload.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume the event and return its parts.
    pub fn into_parts(self) -> (String, String) {
        (self.name, self.content)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_value_equality() {
        let a = Event::new("lion", "likes meat");
        let b = Event::new("lion".to_string(), "likes meat".to_string());
        assert_eq!(a, b);
        assert_ne!(a, Event::new("rabbit", "likes meat"));
    }

    #[test]
    fn test_event_display() {
        let event = Event::new("rabbit", "likes carrots");
        assert_eq!(event.to_string(), "rabbit: likes carrots");
    }

    #[test]
    fn test_event_yaml_shape() {
        let event: Event = serde_yaml::from_str("name: a\ncontent: b\n").unwrap();
        assert_eq!(event.name(), "a");
        assert_eq!(event.content(), "b");
        assert_eq!(event.into_parts(), ("a".to_string(), "b".to_string()));
    }
}
