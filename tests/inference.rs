//! Network-path tests against a local mock of the multimodal endpoint.

use std::time::Duration;

use httpmock::prelude::*;
use reqwest::Client;
use serde_json::json;

use ghostlens_lib::config::{Config, API_VERSION, INSTRUCTION, MODEL};
use ghostlens_lib::inference;
use ghostlens_lib::pipeline;
use ghostlens_lib::preprocess::EncodedImage;
use ghostlens_lib::presenter::{OverlayState, Presenter};

fn test_config(server: &MockServer) -> Config {
    Config {
        endpoint: server.url("/v1/messages"),
        api_key: "sk-test".into(),
    }
}

fn test_image() -> EncodedImage {
    EncodedImage {
        data: "aGVsbG8=".into(),
        width: 4,
        height: 2,
    }
}

#[tokio::test]
async fn analyze_returns_first_content_block_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "sk-test")
                .header("anthropic-version", API_VERSION)
                .json_body_partial(
                    json!({
                        "model": MODEL,
                        "messages": [{
                            "role": "user",
                            "content": [{ "type": "text", "text": INSTRUCTION }]
                        }]
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({
                "content": [
                    { "type": "text", "text": "def solve():\n    pass" },
                    { "type": "text", "text": "ignored trailing block" }
                ]
            }));
        })
        .await;

    let client = Client::new();
    let text = inference::analyze(&client, &test_config(&server), &test_image())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, "def solve():\n    pass");
}

#[tokio::test]
async fn analyze_surfaces_endpoint_rejection() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401)
                .json_body(json!({ "error": { "message": "invalid x-api-key" } }));
        })
        .await;

    let client = Client::new();
    let err = inference::analyze(&client, &test_config(&server), &test_image())
        .await
        .unwrap_err();

    match err {
        ghostlens_lib::error::InferenceError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid x-api-key"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn analyze_rejects_response_without_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({ "content": [] }));
        })
        .await;

    let client = Client::new();
    let err = inference::analyze(&client, &test_config(&server), &test_image())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ghostlens_lib::error::InferenceError::MalformedResponse
    ));
}

#[tokio::test]
async fn failed_cycle_presents_failure_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).body("overloaded");
        })
        .await;

    let app = tauri::test::mock_app();
    let presenter = Presenter::new(app.handle().clone());
    let client = Client::new();
    let config = test_config(&server);

    pipeline::finish_cycle(&presenter, &client, &config, &test_image()).await;

    match presenter.last() {
        OverlayState::Failure { detail } => assert!(detail.contains("529")),
        other => panic!("expected Failure, got {other:?}"),
    }
}

/// Two overlapping cycles: whichever response arrives last owns the surface,
/// regardless of start order.
#[tokio::test]
async fn overlapping_cycles_last_response_wins() {
    let server = MockServer::start_async().await;
    let slow = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .json_body_partial(json!({ "max_tokens": 1000 }).to_string())
                .header("x-api-key", "slow-key");
            then.status(200)
                .delay(Duration::from_millis(400))
                .json_body(json!({ "content": [{ "type": "text", "text": "slow answer" }] }));
        })
        .await;
    let fast = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "fast-key");
            then.status(200)
                .json_body(json!({ "content": [{ "type": "text", "text": "fast answer" }] }));
        })
        .await;

    let app = tauri::test::mock_app();
    let presenter = Presenter::new(app.handle().clone());
    let client = Client::new();
    let image = test_image();

    let slow_config = Config {
        endpoint: server.url("/v1/messages"),
        api_key: "slow-key".into(),
    };
    let fast_config = Config {
        endpoint: server.url("/v1/messages"),
        api_key: "fast-key".into(),
    };

    tokio::join!(
        pipeline::finish_cycle(&presenter, &client, &slow_config, &image),
        pipeline::finish_cycle(&presenter, &client, &fast_config, &image),
    );

    slow.assert_async().await;
    fast.assert_async().await;
    assert_eq!(
        presenter.last(),
        OverlayState::Success {
            text: "slow answer".into()
        }
    );
}
