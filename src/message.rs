// src/message.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const API_VERSION: &str = "1.0.0-alpha";

/// Body Turn posts to `/integration` once the handshake is done.
#[derive(Debug, Default, Deserialize)]
pub struct IntegrationRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: f64,

    #[serde(default)]
    pub text: Option<TextBody>,

    #[serde(default)]
    pub from: Option<String>,

    #[serde(rename = "_vnd", default)]
    pub vnd: Option<Vendor>,
}

impl Message {
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }

    pub fn direction(&self) -> Direction {
        self.vnd
            .as_ref()
            .map(|vnd| vnd.v1.direction)
            .unwrap_or(Direction::Unknown)
    }

    pub fn body(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.body.as_str())
    }

    pub fn author_name(&self) -> Option<&str> {
        self.vnd
            .as_ref()
            .and_then(|vnd| vnd.v1.author.as_ref())
            .and_then(|author| author.name.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub v1: VendorV1,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorV1 {
    #[serde(default)]
    pub direction: Direction,

    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    #[default]
    #[serde(other)]
    Unknown,
}

/// WhatsApp sends unix timestamps as digit strings, other senders use numbers.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let parsed = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|ts| ts.is_finite())
        .ok_or_else(|| serde::de::Error::custom(format!("Invalid message timestamp: {raw}")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub body: String,
    pub title: String,
    pub confidence: f32,
}

impl SuggestedResponse {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: "TEXT".to_string(),
            body: body.into(),
            title: title.into(),
            confidence: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextObjectSpec {
    pub title: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub actions: bool,
    pub suggested_responses: bool,
    pub context_objects: Vec<ContextObjectSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeResponse {
    pub version: String,
    pub capabilities: Capabilities,
}

impl HandshakeResponse {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            version: API_VERSION.to_string(),
            capabilities,
        }
    }
}

/// An action button Turn renders next to the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub description: String,
    pub url: String,
    pub payload: ActionPayload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub wa_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Body Turn posts back when an operator triggers an action.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub option: Option<String>,

    pub payload: ActionPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationResponse {
    pub version: String,
    pub suggested_responses: Vec<SuggestedResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<BTreeMap<String, Action>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_objects: Option<BTreeMap<String, Value>>,
}

impl IntegrationResponse {
    pub fn new(suggested_responses: Vec<SuggestedResponse>) -> Self {
        Self {
            version: API_VERSION.to_string(),
            suggested_responses,
            actions: None,
            context_objects: None,
        }
    }
}
