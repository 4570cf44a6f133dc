// Saved session snapshots and the brainstorm chat transcript

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::video::{ChannelDetails, VideoRecord};

/// One turn of the brainstorm transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// "user" or "model"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            content: content.into(),
        }
    }
}

/// Full snapshot of a working session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "channelUrl")]
    pub channel_url: String,
    pub videos: Vec<VideoRecord>,
    #[serde(rename = "channelDetails")]
    pub channel_details: Option<ChannelDetails>,
    #[serde(rename = "chatHistory")]
    pub chat_history: Vec<ChatMessage>,
}

/// A named, immutable saved session. The id doubles as the creation
/// timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    #[serde(rename = "videoCount")]
    pub video_count: usize,
    pub data: SessionData,
}

impl Session {
    /// Snapshot the given working state under a user-chosen name. The data is
    /// cloned in full, so the session stays independent of later edits.
    pub fn snapshot(name: &str, data: SessionData) -> Self {
        let now = Utc::now();
        let channel_title = data
            .channel_details
            .as_ref()
            .map(|c| c.title.clone())
            .unwrap_or_else(|| "Unknown channel".to_string());

        Self {
            id: now.timestamp_millis(),
            name: name.to_string(),
            created_at: now.to_rfc3339(),
            channel_title,
            video_count: data.videos.len(),
            data,
        }
    }
}
