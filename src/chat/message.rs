//! Conversation messages and the append-only message log
//!
//! The log never mutates or removes a message. Final replies observed
//! through polling go through [`MessageLog::append_once`], which refuses
//! content that was already delivered or is already present with the same
//! origin, so two overlapping poll responses carrying the same reply add
//! it only once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The customer
    User,
    /// The support assistant (or the finalized reviewer reply)
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id
    pub id: String,
    /// Message text
    pub content: String,
    /// Author
    pub origin: Origin,
    /// When the message was appended locally
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a customer message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Origin::User)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, Origin::Assistant)
    }

    fn new(content: impl Into<String>, origin: Origin) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            origin,
            timestamp: Utc::now(),
        }
    }

    /// `true` for customer messages
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }
}

/// Ordered, append-only list of messages
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    delivered: HashSet<(Origin, String)>,
}

impl MessageLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unconditionally
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append `message` unless the same content from the same origin was
    /// already delivered through this method or is already in the log.
    ///
    /// Returns `true` when the message was appended.
    pub fn append_once(&mut self, message: Message) -> bool {
        let key = (message.origin, message.content.clone());
        if self.delivered.contains(&key) {
            return false;
        }
        let present = self
            .messages
            .iter()
            .any(|m| m.origin == message.origin && m.content == message.content);
        self.delivered.insert(key);
        if present {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended after the first `seen`
    pub fn since(&self, seen: usize) -> &[Message] {
        self.messages.get(seen..).unwrap_or(&[])
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` when there are no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message and the delivered set
    ///
    /// Only a session reset starts a new log.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.delivered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let m = Message::user("hi");
        assert!(m.is_user());
        let a = Message::assistant("hello");
        assert_eq!(a.origin, Origin::Assistant);
        assert_ne!(m.id, a.id);
    }

    #[test]
    fn test_push_keeps_order() {
        let mut log = MessageLog::new();
        log.push(Message::user("one"));
        log.push(Message::assistant("two"));
        let contents: Vec<_> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[test]
    fn test_append_once_is_idempotent() {
        let mut log = MessageLog::new();
        assert!(log.append_once(Message::assistant("Your refund has been processed.")));
        assert!(!log.append_once(Message::assistant("Your refund has been processed.")));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_append_once_sees_existing_assistant_message() {
        let mut log = MessageLog::new();
        log.push(Message::assistant("Done."));
        assert!(!log.append_once(Message::assistant("Done.")));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_append_once_ignores_other_origin() {
        let mut log = MessageLog::new();
        log.push(Message::user("Done."));
        assert!(log.append_once(Message::assistant("Done.")));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_since() {
        let mut log = MessageLog::new();
        log.push(Message::user("a"));
        log.push(Message::user("b"));
        assert_eq!(log.since(1).len(), 1);
        assert!(log.since(2).is_empty());
        assert!(log.since(10).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut log = MessageLog::new();
        log.append_once(Message::assistant("x"));
        log.clear();
        assert!(log.is_empty());
        assert!(log.append_once(Message::assistant("x")));
    }
}
