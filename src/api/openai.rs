// OpenAI chat completions client

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::session::ChatMessage;

const PROVIDER: &str = "OpenAI";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Generate a short per-video summary from the title alone.
pub async fn generate_summary(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let body = json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": 0.7,
    });
    request_text(client, api_key, body).await
}

/// Continue the brainstorm conversation with the whole transcript as context.
/// The transcript's "model" role maps to OpenAI's "assistant".
pub async fn generate_chat(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    transcript: &[ChatMessage],
) -> Result<String> {
    let messages: Vec<Value> = transcript
        .iter()
        .map(|msg| {
            let role = if msg.role == "model" { "assistant" } else { "user" };
            json!({ "role": role, "content": msg.content })
        })
        .collect();

    let body = json!({
        "model": model,
        "messages": messages,
        "temperature": 0.7,
    });
    request_text(client, api_key, body).await
}

/// Minimal one-token probe used when a key is added to the vault.
pub async fn validate_key(client: &reqwest::Client, api_key: &str) -> bool {
    let body = json!({
        "model": DEFAULT_MODEL,
        "messages": [{ "role": "user", "content": "test" }],
        "max_tokens": 1,
    });
    let Ok(response) = client
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
    else {
        return false;
    };
    response.status().is_success()
}

async fn request_text(client: &reqwest::Client, api_key: &str, body: Value) -> Result<String> {
    let response = client
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;

    let status = response.status();
    let parsed: OpenAiResponse = response
        .json()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;

    if !status.is_success() {
        let message = parsed
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| format!("HTTP status {}", status));
        return Err(AppError::Provider {
            provider: PROVIDER,
            message,
        });
    }

    parsed
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| AppError::Provider {
            provider: PROVIDER,
            message: "No choices in response".to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Option<Vec<OpenAiChoice>>,
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
