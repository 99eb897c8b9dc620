// src/services/giphy.rs
use crate::config::GiphyConfig;
use crate::error::AppResult;
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Gif>,
}

#[derive(Deserialize)]
struct Gif {
    images: Images,
}

#[derive(Deserialize)]
struct Images {
    original: Rendition,
}

#[derive(Deserialize)]
struct Rendition {
    url: String,
}

/// URL of the best match for `query`, or `None` when nothing matched.
pub async fn search(client: &Client, config: &GiphyConfig, query: &str) -> AppResult<Option<String>> {
    let url = format!("{}/v1/gifs/search", config.api_base);
    let response: SearchResponse = client
        .get(&url)
        .query(&[
            ("api_key", config.api_key.as_str()),
            ("q", query),
            ("limit", "1"),
            ("rating", "g"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.data.into_iter().next().map(|gif| gif.images.original.url))
}
