// src/services/turn_client.rs
use crate::config::TurnConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundContent {
    Text { text: TextContent },
    Image { image: ImageContent },
}

#[derive(Debug, Serialize)]
pub struct TextContent {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    pub link: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    preview_url: bool,
    recipient_type: &'static str,
    to: &'a str,

    #[serde(flatten)]
    content: OutboundContent,
}

/// Sends WhatsApp messages through the Turn messages API.
#[derive(Clone)]
pub struct TurnClient {
    client: Client,
    config: TurnConfig,
}

impl TurnClient {
    pub fn new(client: Client, config: TurnConfig) -> Self {
        Self { client, config }
    }

    pub async fn send_text(&self, to: &str, body: impl Into<String>) -> AppResult<()> {
        self.send(
            to,
            OutboundContent::Text {
                text: TextContent { body: body.into() },
            },
        )
        .await
    }

    pub async fn send_image(&self, to: &str, link: impl Into<String>, caption: Option<String>) -> AppResult<()> {
        self.send(
            to,
            OutboundContent::Image {
                image: ImageContent {
                    link: link.into(),
                    caption,
                },
            },
        )
        .await
    }

    async fn send(&self, to: &str, content: OutboundContent) -> AppResult<()> {
        if to.trim().is_empty() {
            return Err(AppError::BadRequest("Missing recipient wa_id".to_string()));
        }

        let url = format!("{}/v1/messages", self.config.api_base);
        let status = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&OutboundMessage {
                preview_url: false,
                recipient_type: "individual",
                to,
                content,
            })
            .send()
            .await?
            .status();

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Turn messages API returned {status}"
            )));
        }

        tracing::debug!("Sent message to {to}");
        Ok(())
    }
}
