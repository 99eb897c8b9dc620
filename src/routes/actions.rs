// src/routes/actions.rs
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    message::ActionRequest,
    services::{dice, giphy},
    state::SharedState,
};

const DEFAULT_GIF_QUERY: &str = "hello";

pub async fn roll_the_dice_handler(
    State(state): State<SharedState>,
    Json(request): Json<ActionRequest>,
) -> AppResult<StatusCode> {
    let value = dice::roll();
    tracing::info!("Rolled a {value} for {}", request.payload.wa_id);

    state
        .turn
        .send_text(&request.payload.wa_id, dice::roll_message(value))
        .await?;
    Ok(StatusCode::OK)
}

pub async fn giphy_handler(
    State(state): State<SharedState>,
    Json(request): Json<ActionRequest>,
) -> AppResult<StatusCode> {
    let query = gif_query(&request);
    tracing::info!(
        "Searching GIFs for {query:?} ({})",
        request.action.as_deref().unwrap_or("giphy")
    );

    let wa_id = &request.payload.wa_id;
    match giphy::search(&state.http, &state.config.giphy, &query).await? {
        Some(url) => state.turn.send_image(wa_id, url, Some(query)).await?,
        None => {
            state
                .turn
                .send_text(wa_id, format!("No GIFs found for \"{query}\""))
                .await?
        }
    }
    Ok(StatusCode::OK)
}

/// Selected option first, then the text the action was offered for.
pub fn gif_query(request: &ActionRequest) -> String {
    [request.option.as_deref(), request.payload.query.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|q| !q.is_empty())
        .unwrap_or(DEFAULT_GIF_QUERY)
        .to_string()
}
