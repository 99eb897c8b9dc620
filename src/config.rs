// src/config.rs
use anyhow::{Context, Result, anyhow, bail};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which Turn integration this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationKind {
    SuggestedReplies,
    ContactCountry,
    Actions,
}

impl FromStr for IntegrationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "suggested_replies" | "chatgpt" => Ok(Self::SuggestedReplies),
            "contact_country" | "country" => Ok(Self::ContactCountry),
            "actions" | "giphy" => Ok(Self::Actions),
            other => Err(anyhow!("Unknown integration kind: {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub system_prompt: String,

    /// How many of the most recent transcript messages are sent upstream. Zero sends them all.
    pub context_messages: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TurnConfig {
    pub token: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct GiphyConfig {
    pub api_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub kind: IntegrationKind,
    pub address: SocketAddr,

    /// Prefix for action URLs handed to Turn. Empty means relative URLs.
    pub public_url: String,
    pub countries_path: Option<PathBuf>,

    /// Applies to every outbound call without its own timeout.
    pub upstream_timeout: Duration,

    pub openai: OpenAiConfig,
    pub turn: TurnConfig,
    pub giphy: GiphyConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = match var("TURN_INTEGRATION") {
            Some(v) => v.parse().context("Failed to parse TURN_INTEGRATION")?,
            None => IntegrationKind::SuggestedReplies,
        };

        let host: IpAddr = parse_or(var("HOST"), "HOST", default_host())?;
        let port: u16 = parse_or(var("PORT"), "PORT", default_port())?;

        let context_messages: usize = parse_or(
            var("NUMBER_OF_MESSAGES_FOR_CONTEXT"),
            "NUMBER_OF_MESSAGES_FOR_CONTEXT",
            default_context_messages(),
        )?;
        let timeout_secs: u64 = parse_or(
            var("OPENAI_TIMEOUT_SECS"),
            "OPENAI_TIMEOUT_SECS",
            default_timeout_secs(),
        )?;

        let upstream_timeout_secs: u64 = parse_or(
            var("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            default_upstream_timeout_secs(),
        )?;

        let config = Self {
            kind,
            address: SocketAddr::new(host, port),
            public_url: var("PUBLIC_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            countries_path: var("COUNTRIES_PATH").map(PathBuf::from),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY").unwrap_or_default(),
                api_base: base_url(var("OPENAI_API_BASE"), "https://api.openai.com"),
                model: var("MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
                system_prompt: var("SYSTEM_PROMPT").unwrap_or_else(default_system_prompt),
                context_messages,
                timeout: Duration::from_secs(timeout_secs),
            },
            turn: TurnConfig {
                token: var("TURN_TOKEN").unwrap_or_default(),
                api_base: base_url(var("TURN_API_BASE"), "https://whatsapp.turn.io"),
            },
            giphy: GiphyConfig {
                api_key: var("GIPHY_API_KEY").unwrap_or_default(),
                api_base: base_url(var("GIPHY_API_BASE"), "https://api.giphy.com"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.kind {
            IntegrationKind::SuggestedReplies if self.openai.api_key.is_empty() => {
                bail!("Missing required OPENAI_API_KEY environment variable for suggested_replies!")
            }
            IntegrationKind::Actions if self.turn.token.is_empty() => {
                bail!("Missing required TURN_TOKEN environment variable for actions!")
            }
            IntegrationKind::Actions if self.giphy.api_key.is_empty() => {
                bail!("Missing required GIPHY_API_KEY environment variable for actions!")
            }
            _ => Ok(()),
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {key} value {v:?}")),
        None => Ok(default),
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}
fn default_port() -> u16 {
    8080
}
fn default_context_messages() -> usize {
    4
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_upstream_timeout_secs() -> u64 {
    10
}
fn default_system_prompt() -> String {
    "You are a helpful assistant who provides informative answers about healthy living."
        .to_string()
}
