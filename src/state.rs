// src/state.rs
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::AppConfig;
use crate::services::countries::CountryDirectory;
use crate::services::turn_client::TurnClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub http: Client,
    pub countries: CountryDirectory,
    pub turn: TurnClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.upstream_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let countries = match &config.countries_path {
            Some(path) => CountryDirectory::from_path(path)?,
            None => CountryDirectory::bundled()?,
        };

        Ok(Self {
            turn: TurnClient::new(http.clone(), config.turn.clone()),
            config,
            http,
            countries,
        })
    }
}
