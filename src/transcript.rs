//! UI-agnostic chat transcript types
//!
//! The transcript is the in-memory ordered log of every message exchanged
//! during the current session. It is append-only and lives exactly as long
//! as the process; nothing here touches the terminal or the network.

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

/// The author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message with the time it was added
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn clock_label(&self) -> String {
        clock_label(&self.timestamp)
    }
}

/// Ordered, append-only log of the session's messages.
///
/// Messages are never mutated or removed, so indices stay stable and the
/// length only ever grows within a session.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, capturing the current time.
    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(Message::new(role, text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// User-authored messages only; the history panel is built from these.
    pub fn user_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role == Role::User)
    }
}

/// Format a timestamp as `HH:MM` plus an am/pm suffix.
///
/// The hour is not converted to 12-hour form; only the suffix flips at
/// noon, so 13:05 renders as "13:05 pm". Kept as-is to match the labels
/// users already see from the deployed backend's web client.
pub fn clock_label(ts: &DateTime<Local>) -> String {
    let suffix = if ts.hour() >= 12 { "pm" } else { "am" };
    format!("{:02}:{:02} {}", ts.hour(), ts.minute(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_clock_label_afternoon_keeps_24_hour_numeral() {
        assert_eq!(clock_label(&local(13, 5)), "13:05 pm");
    }

    #[test]
    fn test_clock_label_midnight() {
        assert_eq!(clock_label(&local(0, 5)), "00:05 am");
    }

    #[test]
    fn test_clock_label_noon_is_pm() {
        assert_eq!(clock_label(&local(12, 0)), "12:00 pm");
    }

    #[test]
    fn test_clock_label_morning_zero_padded() {
        assert_eq!(clock_label(&local(9, 7)), "09:07 am");
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Role::User, "first");
        transcript.push(Role::Assistant, "second");
        transcript.push(Role::User, "third");

        let texts: Vec<&str> = transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_user_messages_excludes_assistant() {
        let mut transcript = Transcript::new();
        transcript.push(Role::User, "question one");
        transcript.push(Role::Assistant, "answer one");
        transcript.push(Role::User, "question two");
        transcript.push(Role::Assistant, "answer two");

        let history: Vec<&str> = transcript.user_messages().map(|m| m.text.as_str()).collect();
        assert_eq!(history, vec!["question one", "question two"]);
    }

    #[test]
    fn test_transcript_starts_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }
}
