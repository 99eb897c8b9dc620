// src/services/chatbot.rs
use crate::config::OpenAiConfig;
use crate::error::{AppError, AppResult};
use crate::message::SuggestedResponse;
use crate::services::transcript::{ChatMessage, ChatRole};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const TIMEOUT_TITLE: &str = "ChatGPT Timeout";
pub const TIMEOUT_REPLY: &str =
    "Sorry, generating a suggested reply took too long. Please try again in a moment.";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    index: usize,
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// The last `limit` transcript messages behind the system prompt. A zero limit keeps them all.
pub fn build_prompt(system_prompt: &str, transcript: &[ChatMessage], limit: usize) -> Vec<ChatMessage> {
    let start = match limit {
        0 => 0,
        limit => transcript.len().saturating_sub(limit),
    };
    std::iter::once(ChatMessage::new(ChatRole::System, system_prompt))
        .chain(transcript[start..].iter().cloned())
        .collect()
}

/// Ask the chat completion API for replies to the conversation so far.
pub async fn suggested_responses(
    client: &Client,
    config: &OpenAiConfig,
    transcript: &[ChatMessage],
) -> AppResult<Vec<SuggestedResponse>> {
    if transcript.is_empty() {
        return Ok(Vec::new());
    }

    let messages = build_prompt(&config.system_prompt, transcript, config.context_messages);
    tracing::debug!(
        "Requesting completion from {} with {} messages",
        config.model,
        messages.len()
    );

    let url = format!("{}/v1/chat/completions", config.api_base);
    let result = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .timeout(config.timeout)
        .json(&CompletionRequest {
            model: &config.model,
            messages: &messages,
            temperature: 0.0,
        })
        .send()
        .await
        .and_then(|response| response.error_for_status());

    let response = match result {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            tracing::warn!("Chat completion timed out after {:?}", config.timeout);
            return Ok(vec![SuggestedResponse::text(TIMEOUT_TITLE, TIMEOUT_REPLY)]);
        }
        Err(e) => return Err(e.into()),
    };

    let completion = match response.json::<CompletionResponse>().await {
        Ok(completion) => completion,
        Err(e) if e.is_timeout() => {
            tracing::warn!("Chat completion body timed out after {:?}", config.timeout);
            return Ok(vec![SuggestedResponse::text(TIMEOUT_TITLE, TIMEOUT_REPLY)]);
        }
        Err(e) => {
            return Err(AppError::Upstream(format!(
                "Unexpected chat completion response: {}",
                e.without_url()
            )));
        }
    };

    Ok(completion
        .choices
        .into_iter()
        .map(|choice| {
            SuggestedResponse::text(
                format!("ChatGPT Reply {}", choice.index),
                choice.message.content.unwrap_or_default(),
            )
        })
        .collect())
}
