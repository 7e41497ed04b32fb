//! Chat transcript model — the append-only message log every LLM call windows over.

use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name as the Anthropic Messages API expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry. The session transcript is an append-only `Vec<ChatMessage>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Returns the trailing window of at most `max` messages.
///
/// Matches the session windowing rule used across all LLM calls: a transcript
/// holding `max` or fewer entries contributes its most recent `len - 1`
/// entries — the oldest is dropped, and the newest (the just-pushed user
/// message) stays in the window.
pub fn trailing_window(messages: &[ChatMessage], max: usize) -> &[ChatMessage] {
    let take = if messages.len() > max {
        max
    } else {
        messages.len().saturating_sub(1)
    };
    &messages[messages.len() - take..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("u{i}"))
                } else {
                    ChatMessage::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_window_longer_transcript_takes_max() {
        let msgs = transcript(10);
        let window = trailing_window(&msgs, 4);
        assert_eq!(window.len(), 4);
        assert_eq!(window[3].content, "a9");
        assert_eq!(window[0].content, "u6");
    }

    #[test]
    fn test_window_shorter_transcript_drops_oldest() {
        // 4 entries with a window of 4 → the most recent 3.
        let msgs = transcript(4);
        let window = trailing_window(&msgs, 4);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].content, "a1");
        assert_eq!(window[2].content, "a3");
        assert!(!window.iter().any(|m| m.content == "u0"));
    }

    #[test]
    fn test_window_empty_transcript() {
        let window = trailing_window(&[], 4);
        assert!(window.is_empty());
    }

    #[test]
    fn test_window_single_entry() {
        let msgs = transcript(1);
        assert!(trailing_window(&msgs, 2).is_empty());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Assistant);
    }
}
