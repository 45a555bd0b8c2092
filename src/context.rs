//! Replaying recent questions as conversation context.

use chrono::{DateTime, Duration, Utc};

use crate::history::LogEntry;
use crate::openai::{ChatMessage, Role};

/// How far back an entry may be and still count as part of the conversation.
pub const WINDOW_MINUTES: i64 = 5;
/// Most prompt/response pairs replayed to the model.
pub const MAX_TURNS: usize = 5;

/// The recent turns of `log` as alternating user/assistant messages, oldest first.
///
/// Only entries created strictly after `now - 5 minutes` are considered, and of
/// those only the last [`MAX_TURNS`]. `now` should be captured once per
/// invocation.
pub fn build_context(log: &[LogEntry], now: DateTime<Utc>) -> Vec<ChatMessage> {
    let cutoff_ms = (now - Duration::minutes(WINDOW_MINUTES)).timestamp_millis();
    let recent: Vec<&LogEntry> = log
        .iter()
        .filter(|entry| entry.created.saturating_mul(1000) > cutoff_ms)
        .collect();
    let skip = recent.len().saturating_sub(MAX_TURNS);

    recent
        .into_iter()
        .skip(skip)
        .flat_map(|entry| {
            [
                ChatMessage::new(Role::User, entry.prompt.as_str()),
                ChatMessage::new(Role::Assistant, entry.response_text()),
            ]
        })
        .collect()
}

/// The outbound message list: past turns, then the new prompt, then the system instruction.
pub fn assemble_messages(
    past: Vec<ChatMessage>,
    prompt: &str,
    system_prompt: &str,
) -> Vec<ChatMessage> {
    let mut messages = past;
    messages.push(ChatMessage::new(Role::User, prompt));
    messages.push(ChatMessage::new(Role::System, system_prompt));
    messages
}
