// src/routes/integration.rs
use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    config::IntegrationKind,
    error::{AppError, AppResult},
    message::{
        Action, ActionPayload, Capabilities, ContextObjectSpec, HandshakeResponse,
        IntegrationRequest, IntegrationResponse, Message,
    },
    services::{
        chatbot::suggested_responses,
        countries::Country,
        transcript::{latest_contact, latest_inbound, transcript},
    },
    state::{AppState, SharedState},
};

pub const COUNTRY_CONTEXT_CODE: &str = "contact_country";
pub const GIPHY_SEARCH_TERMS: [(&str, &str); 4] = [
    ("cats", "Cats"),
    ("celebrate", "Celebrate"),
    ("thank you", "Thank you"),
    ("thumbs up", "Thumbs up"),
];

pub fn capabilities(kind: IntegrationKind) -> Capabilities {
    match kind {
        IntegrationKind::SuggestedReplies => Capabilities {
            actions: false,
            suggested_responses: true,
            context_objects: Vec::new(),
        },
        IntegrationKind::ContactCountry => Capabilities {
            actions: false,
            suggested_responses: false,
            context_objects: vec![ContextObjectSpec {
                title: "Contact country".to_string(),
                code: COUNTRY_CONTEXT_CODE.to_string(),
                kind: "table".to_string(),
                icon: "none".to_string(),
            }],
        },
        IntegrationKind::Actions => Capabilities {
            actions: true,
            suggested_responses: false,
            context_objects: Vec::new(),
        },
    }
}

pub async fn integration_handler(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    // The handshake wins no matter what else the body carries. Only JSON `true` counts.
    if body.get("handshake").and_then(Value::as_bool).unwrap_or(false) {
        tracing::info!("Answering handshake for {:?}", state.config.kind);
        return Ok(Json(HandshakeResponse::new(capabilities(state.config.kind))).into_response());
    }

    let request: IntegrationRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid integration payload: {e}")))?;

    let response = match state.config.kind {
        IntegrationKind::SuggestedReplies => reply_suggestions(&state, &request.messages).await?,
        IntegrationKind::ContactCountry => contact_country(&state, &request.messages),
        IntegrationKind::Actions => contact_actions(&state, &request.messages),
    };

    Ok(Json(response).into_response())
}

async fn reply_suggestions(state: &AppState, messages: &[Message]) -> AppResult<IntegrationResponse> {
    let chat = transcript(messages);
    if let Some(author) = latest_inbound(messages).and_then(Message::author_name) {
        tracing::debug!("Suggesting replies to {author} from {} messages", chat.len());
    }

    let replies = suggested_responses(&state.http, &state.config.openai, &chat).await?;
    Ok(IntegrationResponse::new(replies))
}

fn contact_country(state: &AppState, messages: &[Message]) -> IntegrationResponse {
    let country = latest_contact(messages)
        .map(|(_, wa_id)| state.countries.lookup(wa_id))
        .unwrap_or_else(Country::unknown);

    let mut response = IntegrationResponse::new(Vec::new());
    response.context_objects = Some(BTreeMap::from([(
        COUNTRY_CONTEXT_CODE.to_string(),
        country.to_context_object(),
    )]));
    response
}

fn contact_actions(state: &AppState, messages: &[Message]) -> IntegrationResponse {
    let mut response = IntegrationResponse::new(Vec::new());
    let Some((latest, wa_id)) = latest_contact(messages) else {
        response.actions = Some(BTreeMap::new());
        return response;
    };

    let base = &state.config.public_url;
    let dice = Action {
        description: "Roll the dice".to_string(),
        url: format!("{base}/action/roll_the_dice"),
        payload: ActionPayload {
            wa_id: wa_id.to_string(),
            query: None,
        },
        options: None,
    };
    let giphy = Action {
        description: "Send a GIF".to_string(),
        url: format!("{base}/action/giphy"),
        payload: ActionPayload {
            wa_id: wa_id.to_string(),
            query: latest.body().map(str::to_string),
        },
        options: Some(
            GIPHY_SEARCH_TERMS
                .iter()
                .map(|(term, label)| (term.to_string(), label.to_string()))
                .collect(),
        ),
    };

    response.actions = Some(BTreeMap::from([
        ("roll_the_dice".to_string(), dice),
        ("giphy".to_string(), giphy),
    ]));
    response
}
