//! Strongly-typed identifiers for focusd

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a task supplied by the persistence layer.
///
/// The engine stores it alongside the session but never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an observer subscribed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_equality() {
        let id1 = TaskId::new("task-1");
        let id2 = TaskId::from("task-1");
        let id3 = TaskId::new("task-2");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_id_uniqueness() {
        let s1 = SubscriberId::new();
        let s2 = SubscriberId::new();
        assert_ne!(s1, s2);
    }

    #[test]
    fn task_id_is_transparent_in_json() {
        let task_id = TaskId::new("inbox/42");
        let json = serde_json::to_string(&task_id).unwrap();
        assert_eq!(json, "\"inbox/42\"");
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(task_id, parsed);
    }
}
