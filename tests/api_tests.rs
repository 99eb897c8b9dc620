use turn_ui_integration::config::AppConfig;
use turn_ui_integration::message::{HandshakeResponse, IntegrationResponse};
use turn_ui_integration::routes::{LIVENESS, create_router};
use turn_ui_integration::state::AppState;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

fn app(pairs: &[(&str, &str)]) -> Router {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = AppConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
    let kind = config.kind;
    let state = Arc::new(AppState::new(config).unwrap());
    create_router(kind).with_state(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn text(ts: u64, direction: &str, body: &str) -> Value {
    json!({
        "type": "text",
        "timestamp": ts.to_string(),
        "from": "27820000000",
        "text": {"body": body},
        "_vnd": {"v1": {"direction": direction, "author": {"name": "Jane"}}}
    })
}

#[tokio::test]
async fn test_liveness() {
    let app = app(&[("OPENAI_API_KEY", "sk-test")]);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], LIVENESS.as_bytes());
}

#[tokio::test]
async fn test_handshake_ignores_other_fields() {
    let app = app(&[("OPENAI_API_KEY", "sk-test")]);
    let response = app
        .oneshot(post_json(
            "/integration",
            json!({"handshake": true, "messages": "not a list", "extra": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "version": "1.0.0-alpha",
            "capabilities": {
                "actions": false,
                "suggested_responses": true,
                "context_objects": []
            }
        })
    );
}

#[tokio::test]
async fn test_handshake_per_variant() {
    let country = app(&[("TURN_INTEGRATION", "contact_country")]);
    let response = country
        .oneshot(post_json("/integration", json!({"handshake": true})))
        .await
        .unwrap();
    let handshake: HandshakeResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert!(!handshake.capabilities.suggested_responses);
    assert_eq!(handshake.capabilities.context_objects[0].code, "contact_country");

    let actions = app(&[
        ("TURN_INTEGRATION", "actions"),
        ("TURN_TOKEN", "turn-token"),
        ("GIPHY_API_KEY", "giphy-key"),
    ]);
    let response = actions
        .oneshot(post_json("/integration", json!({"handshake": true})))
        .await
        .unwrap();
    let handshake: HandshakeResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert!(handshake.capabilities.actions);
}

#[tokio::test]
async fn test_missing_messages_is_bad_request() {
    let app = app(&[("OPENAI_API_KEY", "sk-test")]);
    let response = app
        .oneshot(post_json("/integration", json!({"handshake": false})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_suggested_replies_from_last_messages() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "model": "gpt-3.5-turbo",
                    "temperature": 0.0,
                    "messages": [
                        {"role": "system", "content": "Be brief."},
                        {"role": "assistant", "content": "two"},
                        {"role": "user", "content": "three"}
                    ]
                }));
            then.status(200).json_body(json!({
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Sure!"}},
                    {"index": 1, "message": {"role": "assistant", "content": "Of course."}}
                ]
            }));
        })
        .await;

    let base = server.base_url();
    let app = app(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_API_BASE", base.as_str()),
        ("SYSTEM_PROMPT", "Be brief."),
        ("NUMBER_OF_MESSAGES_FOR_CONTEXT", "2"),
    ]);

    // Out of order, with a non-text message in between.
    let messages = json!([
        text(30, "inbound", "three"),
        {"type": "image", "timestamp": "25", "_vnd": {"v1": {"direction": "inbound"}}},
        text(10, "inbound", "one"),
        text(20, "outbound", "two"),
    ]);
    let response = app
        .oneshot(post_json("/integration", json!({"messages": messages})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let reply: IntegrationResponse = serde_json::from_value(body_json(response).await).unwrap();
    completion.assert_async().await;

    assert_eq!(reply.version, "1.0.0-alpha");
    assert_eq!(reply.suggested_responses.len(), 2);
    assert_eq!(reply.suggested_responses[0].kind, "TEXT");
    assert_eq!(reply.suggested_responses[0].title, "ChatGPT Reply 0");
    assert_eq!(reply.suggested_responses[1].body, "Of course.");
    assert!(reply.actions.is_none());
}

#[tokio::test]
async fn test_empty_transcript_skips_upstream() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500);
        })
        .await;

    let base = server.base_url();
    let app = app(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_API_BASE", base.as_str())]);
    let response = app
        .oneshot(post_json("/integration", json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["suggested_responses"], json!([]));
    assert_eq!(completion.hits_async().await, 0);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("boom");
        })
        .await;

    let base = server.base_url();
    let app = app(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_API_BASE", base.as_str())]);
    let response = app
        .oneshot(post_json(
            "/integration",
            json!({"messages": [text(1, "inbound", "hello")]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_contact_country_context_object() {
    let app = app(&[("TURN_INTEGRATION", "contact_country")]);
    let response = app
        .oneshot(post_json(
            "/integration",
            json!({"messages": [text(1, "inbound", "hi")]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["suggested_responses"], json!([]));
    assert_eq!(
        body["context_objects"]["contact_country"],
        json!({"Country": "South Africa", "ISO code": "ZA", "Calling code": "+27"})
    );
}

#[tokio::test]
async fn test_contact_country_unknown() {
    let app = app(&[("TURN_INTEGRATION", "contact_country")]);
    let mut message = text(1, "inbound", "hi");
    message["from"] = json!("0000");
    let response = app
        .oneshot(post_json("/integration", json!({"messages": [message]})))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(
        body["context_objects"]["contact_country"],
        json!({"Country": "Unknown", "ISO code": "Unknown", "Calling code": "Unknown"})
    );
}

#[tokio::test]
async fn test_action_routes_only_for_actions_variant() {
    let app = app(&[("TURN_INTEGRATION", "contact_country")]);
    let response = app
        .oneshot(post_json(
            "/action/roll_the_dice",
            json!({"payload": {"wa_id": "27820000000"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sparse_vendor_and_float_timestamps() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .json_body(json!({
                    "model": "gpt-3.5-turbo",
                    "temperature": 0.0,
                    "messages": [
                        {"role": "system", "content": "Be brief."},
                        {"role": "user", "content": "early"},
                        {"role": "assistant", "content": "late"}
                    ]
                }));
            then.status(200).json_body(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Ok"}}]
            }));
        })
        .await;

    let base = server.base_url();
    let app = app(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_API_BASE", base.as_str()),
        ("SYSTEM_PROMPT", "Be brief."),
        ("NUMBER_OF_MESSAGES_FOR_CONTEXT", "0"),
    ]);

    let messages = json!([
        {"type": "text", "timestamp": 1589906940.75, "text": {"body": "late"},
         "_vnd": {"v1": {"direction": "outbound"}}},
        {"type": "text", "timestamp": 1589906940.25, "text": {"body": "early"},
         "_vnd": {"v1": {"direction": "inbound"}}},
        {"type": "text", "timestamp": "3", "text": {"body": "no vendor"}, "_vnd": {}},
    ]);
    let response = app
        .oneshot(post_json("/integration", json!({"messages": messages})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    completion.assert_async().await;
}

#[tokio::test]
async fn test_contact_country_skips_inbound_without_sender() {
    let app = app(&[("TURN_INTEGRATION", "contact_country")]);
    let mut anonymous = text(9, "inbound", "later");
    anonymous.as_object_mut().unwrap().remove("from");
    let response = app
        .oneshot(post_json(
            "/integration",
            json!({"messages": [text(1, "inbound", "hi"), anonymous]}),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["context_objects"]["contact_country"]["Country"], "South Africa");
}
