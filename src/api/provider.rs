// AI provider selection
// Two interchangeable backends behind one surface; which one handles a
// request is purely a configuration value.

use serde::{Deserialize, Serialize};

use crate::api::{gemini, openai};
use crate::error::Result;
use crate::models::session::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl AiProvider {
    pub fn label(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "Gemini",
            AiProvider::OpenAi => "OpenAI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(AiProvider::Gemini),
            "openai" => Some(AiProvider::OpenAi),
            _ => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => gemini::DEFAULT_MODEL,
            AiProvider::OpenAi => openai::DEFAULT_MODEL,
        }
    }

    pub async fn generate_summary(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        model: &str,
        title: &str,
    ) -> Result<String> {
        let prompt = summary_prompt(title);
        match self {
            AiProvider::Gemini => gemini::generate_summary(client, api_key, model, &prompt).await,
            AiProvider::OpenAi => openai::generate_summary(client, api_key, model, &prompt).await,
        }
    }

    pub async fn generate_chat(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        model: &str,
        transcript: &[ChatMessage],
    ) -> Result<String> {
        match self {
            AiProvider::Gemini => gemini::generate_chat(client, api_key, model, transcript).await,
            AiProvider::OpenAi => openai::generate_chat(client, api_key, model, transcript).await,
        }
    }

    pub async fn validate_key(&self, client: &reqwest::Client, api_key: &str) -> bool {
        match self {
            AiProvider::Gemini => gemini::validate_key(client, api_key).await,
            AiProvider::OpenAi => openai::validate_key(client, api_key).await,
        }
    }
}

fn summary_prompt(title: &str) -> String {
    format!(
        "You are a YouTube content analyst. Write a short, engaging script \
         summary (3-4 sentences) for a video with the following title: \
         \"{}\". Focus on the main points the video likely covers, based on \
         the title.",
        title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_label() {
        assert_eq!(AiProvider::parse("gemini"), Some(AiProvider::Gemini));
        assert_eq!(AiProvider::parse("OpenAI"), Some(AiProvider::OpenAi));
        assert_eq!(AiProvider::parse("claude"), None);
        assert_eq!(AiProvider::OpenAi.label(), "OpenAI");
    }

    #[test]
    fn test_serialized_form_is_stable() {
        assert_eq!(
            serde_json::to_string(&AiProvider::Gemini).unwrap(),
            "\"gemini\""
        );
        assert_eq!(
            serde_json::from_str::<AiProvider>("\"openai\"").unwrap(),
            AiProvider::OpenAi
        );
    }
}
