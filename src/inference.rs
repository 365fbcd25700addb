use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{Config, API_VERSION, INSTRUCTION, MAX_TOKENS, MODEL};
use crate::error::InferenceError;
use crate::preprocess::EncodedImage;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// One round-trip to the multimodal endpoint: fixed instruction plus the
/// encoded screenshot in, analysis text out.
///
/// The credential is forwarded as-is without client-side validation; a missing
/// or placeholder key is rejected remotely and surfaces as `Status`. The
/// result is exactly the `text` field of the first content block.
pub async fn analyze(
    client: &Client,
    config: &Config,
    image: &EncodedImage,
) -> Result<String, InferenceError> {
    let body = json!({
        "model": MODEL,
        "max_tokens": MAX_TOKENS,
        "messages": [{
            "role": "user",
            "content": [
                {
                    "type": "text",
                    "text": INSTRUCTION
                },
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": "image/png",
                        "data": image.data
                    }
                }
            ]
        }]
    });

    debug!(
        "posting {}x{} screenshot to {}",
        image.width, image.height, config.endpoint
    );

    let response = client
        .post(&config.endpoint)
        .header("content-type", "application/json")
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InferenceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: MessagesResponse = response
        .json()
        .await
        .map_err(|_| InferenceError::MalformedResponse)?;

    let text = parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(InferenceError::MalformedResponse)?;

    info!("inference returned {} chars", text.len());
    Ok(text)
}
