// src/services/transcript.rs
use crate::message::{Direction, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Oldest-first chat transcript of the text messages in a Turn conversation.
///
/// Inbound messages are spoken by the user, outbound ones by the assistant.
/// Anything that is not a text message with a known direction is dropped.
pub fn transcript(messages: &[Message]) -> Vec<ChatMessage> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    ordered
        .into_iter()
        .filter(|m| m.is_text())
        .filter_map(|m| {
            let role = match m.direction() {
                Direction::Inbound => ChatRole::User,
                Direction::Outbound => ChatRole::Assistant,
                Direction::Unknown => return None,
            };
            m.body().map(|body| ChatMessage::new(role, body))
        })
        .collect()
}

/// The newest message sent by the contact, if any.
pub fn latest_inbound(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .filter(|m| m.direction() == Direction::Inbound)
        .max_by(|a, b| a.timestamp.total_cmp(&b.timestamp))
}

/// The newest inbound message that names its sender, with that sender's wa_id.
pub fn latest_contact(messages: &[Message]) -> Option<(&Message, &str)> {
    messages
        .iter()
        .filter(|m| m.direction() == Direction::Inbound)
        .filter_map(|m| Some((m, m.from.as_deref()?)))
        .max_by(|(a, _), (b, _)| a.timestamp.total_cmp(&b.timestamp))
}
