// Gemini API client

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::session::ChatMessage;

const PROVIDER: &str = "Gemini";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

fn endpoint(model: &str, api_key: &str) -> String {
    format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    )
}

/// Generate a short per-video summary from the title alone.
pub async fn generate_summary(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let body = json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }]
    });
    request_text(client, api_key, model, body).await
}

/// Continue the brainstorm conversation with the whole transcript as context.
/// Gemini's role names match the transcript's ("user"/"model") directly.
pub async fn generate_chat(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    transcript: &[ChatMessage],
) -> Result<String> {
    let contents: Vec<Value> = transcript
        .iter()
        .map(|msg| {
            json!({
                "role": msg.role,
                "parts": [{ "text": msg.content }]
            })
        })
        .collect();

    request_text(client, api_key, model, json!({ "contents": contents })).await
}

/// Minimal probe used when a key is added to the vault.
pub async fn validate_key(client: &reqwest::Client, api_key: &str) -> bool {
    let body = json!({
        "contents": [{
            "parts": [{ "text": "test" }]
        }]
    });
    let Ok(response) = client
        .post(endpoint(DEFAULT_MODEL, api_key))
        .json(&body)
        .send()
        .await
    else {
        return false;
    };
    response.status().is_success()
}

async fn request_text(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    body: Value,
) -> Result<String> {
    let response = client
        .post(endpoint(model, api_key))
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Provider {
            provider: PROVIDER,
            message: error_message(&body)
                .unwrap_or_else(|| format!("HTTP status {}", status)),
        });
    }

    let parsed: GeminiResponse = response
        .json()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;

    parsed
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.text.clone())
        .ok_or_else(|| AppError::Provider {
            provider: PROVIDER,
            message: "No text in response".to_string(),
        })
}

/// The API's `error.message` from a failure body, if present.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(String::from)
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_body_yields_the_api_message() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Quota exceeded"));
    }

    #[test]
    fn test_unparseable_failure_body_yields_nothing() {
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"error": "flat string"}"#), None);
    }
}
