// YouTube Data API v3 client
// Channel resolution, uploads-playlist pagination and batch video detail
// fetches. Every response body is checked for an `error` object, which the
// API can return regardless of HTTP status.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use crate::error::{AppError, Result};
use crate::ingest::{IdPage, VideoFeed};
use crate::models::video::{ChannelDetails, VideoRecord, PENDING_SUMMARY};
use crate::utils::duration::format_clock_duration;

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const PROVIDER: &str = "YouTube";

/// Page-size and batch-fetch cap of the API
pub const PAGE_SIZE: usize = 50;

/// How a channel URL references the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Literal `/channel/UC...` id, resolvable with zero network calls
    Id(String),
    /// `/c/<handle>` or `/@handle` custom URL
    Handle(String),
    /// Legacy `/user/<name>` URL
    Username(String),
}

/// Parse the path of a channel URL into a [`ChannelRef`].
pub fn parse_channel_url(channel_url: &str) -> Result<ChannelRef> {
    let parsed = Url::parse(channel_url).map_err(|_| AppError::InvalidChannelUrl)?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        ["channel", id, ..] if id.starts_with("UC") => Ok(ChannelRef::Id(id.to_string())),
        ["c", handle, ..] => Ok(ChannelRef::Handle(handle.to_string())),
        ["user", name, ..] => Ok(ChannelRef::Username(name.to_string())),
        [first, ..] if first.starts_with('@') => {
            Ok(ChannelRef::Handle(first.trim_start_matches('@').to_string()))
        }
        _ => Err(AppError::InvalidChannelUrl),
    }
}

/// Thin client over the shared HTTP client and the active YouTube key
pub struct YouTubeClient<'a> {
    client: &'a reqwest::Client,
    api_key: &'a str,
}

impl<'a> YouTubeClient<'a> {
    pub fn new(client: &'a reqwest::Client, api_key: &'a str) -> Self {
        Self { client, api_key }
    }

    /// Map a channel URL to a canonical channel id. Literal `/channel/UC...`
    /// URLs resolve without touching the network; handle and legacy username
    /// forms go through a search or lookup call. Every failure along the way
    /// is normalized to a single invalid-URL error.
    pub async fn resolve_channel_id(&self, channel_url: &str) -> Result<String> {
        match parse_channel_url(channel_url)? {
            ChannelRef::Id(id) => Ok(id),
            ChannelRef::Handle(handle) => self
                .search_channel_by_handle(&handle)
                .await
                .map_err(|_| AppError::InvalidChannelUrl),
            ChannelRef::Username(name) => self
                .channel_by_username(&name)
                .await
                .map_err(|_| AppError::InvalidChannelUrl),
        }
    }

    async fn search_channel_by_handle(&self, handle: &str) -> Result<String> {
        let url = format!(
            "{}/search?part=snippet&q={}&type=channel&key={}",
            API_BASE_URL,
            urlencoding::encode(handle),
            self.api_key
        );
        let response: SearchResponse = api_get(self.client, &url).await?;
        let items = response.items.unwrap_or_default();

        // Prefer an exact custom-URL or title match over the first hit
        let exact = items.iter().find(|item| {
            item.snippet
                .custom_url
                .as_deref()
                .is_some_and(|u| matches_handle(u, handle))
                || matches_handle(&item.snippet.title, handle)
        });

        exact
            .or(items.first())
            .map(|item| item.snippet.channel_id.clone())
            .ok_or(AppError::InvalidChannelUrl)
    }

    async fn channel_by_username(&self, username: &str) -> Result<String> {
        let url = format!(
            "{}/channels?part=id&forUsername={}&key={}",
            API_BASE_URL,
            urlencoding::encode(username),
            self.api_key
        );
        let response: ChannelIdResponse = api_get(self.client, &url).await?;
        response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|item| item.id)
            .ok_or(AppError::InvalidChannelUrl)
    }

    /// Resolve the uploads-playlist id of a channel.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String> {
        let url = format!(
            "{}/channels?part=contentDetails&id={}&key={}",
            API_BASE_URL, channel_id, self.api_key
        );
        let response: ChannelContentResponse = api_get(self.client, &url).await?;
        response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| AppError::Provider {
                provider: PROVIDER,
                message: format!("No channel found for id {}", channel_id),
            })
    }

    /// Fetch channel metadata for the details panel.
    pub async fn channel_details(&self, channel_id: &str) -> Result<ChannelDetails> {
        let url = format!(
            "{}/channels?part=snippet,statistics&id={}&key={}",
            API_BASE_URL, channel_id, self.api_key
        );
        let response: ChannelDetailsResponse = api_get(self.client, &url).await?;
        let item = response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider {
                provider: PROVIDER,
                message: format!("No channel found for id {}", channel_id),
            })?;

        Ok(ChannelDetails {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            published_at: item.snippet.published_at,
            custom_url: item.snippet.custom_url.unwrap_or_default(),
            country: item.snippet.country,
            subscriber_count: parse_count(item.statistics.subscriber_count),
            video_count: parse_count(item.statistics.video_count),
            view_count: parse_count(item.statistics.view_count),
            thumbnail_url: pick_thumbnail(&item.snippet.thumbnails),
        })
    }

    /// Validate a key with a minimal, low-quota search call.
    pub async fn validate_key(client: &reqwest::Client, key: &str) -> bool {
        let url = format!("{}/search?part=snippet&q=google&key={}", API_BASE_URL, key);
        match client.get(&url).send().await {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body.get("error").is_none(),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }
}

impl VideoFeed for YouTubeClient<'_> {
    /// One page of video ids from the uploads playlist.
    async fn playlist_page(&self, playlist_id: &str, cursor: Option<&str>) -> Result<IdPage> {
        let mut url = format!(
            "{}/playlistItems?part=contentDetails&playlistId={}&maxResults={}&key={}",
            API_BASE_URL, playlist_id, PAGE_SIZE, self.api_key
        );
        if let Some(token) = cursor {
            url.push_str("&pageToken=");
            url.push_str(token);
        }

        let response: PlaylistItemsResponse = api_get(self.client, &url).await?;
        let video_ids: Vec<String> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect();
        debug!(count = video_ids.len(), "fetched playlist page");

        Ok(IdPage {
            video_ids,
            next_cursor: response.next_page_token,
        })
    }

    /// Batch-fetch details for up to [`PAGE_SIZE`] video ids. Ids pointing at
    /// removed or private videos are silently absent from the result.
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/videos?part=snippet,statistics,contentDetails&id={}&key={}",
            API_BASE_URL,
            ids.join(","),
            self.api_key
        );
        let response: VideosResponse = api_get(self.client, &url).await?;

        let records = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| VideoRecord {
                id: item.id,
                title: item.snippet.title,
                description: item.snippet.description,
                published_at: item.snippet.published_at,
                views: parse_count(item.statistics.view_count),
                likes: parse_count(item.statistics.like_count),
                duration: format_clock_duration(&item.content_details.duration),
                summary: PENDING_SUMMARY.to_string(),
            })
            .collect();
        Ok(records)
    }
}

/// GET a JSON endpoint, surface the body's `error` object if present, then
/// deserialize into the expected shape.
async fn api_get<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::provider(PROVIDER, e))?;

    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("request rejected")
            .to_string();
        return Err(AppError::Provider {
            provider: PROVIDER,
            message,
        });
    }

    serde_json::from_value(body).map_err(|e| AppError::provider(PROVIDER, e))
}

/// Case-insensitive handle comparison. Handles are not ASCII-only, so this
/// goes through full Unicode lowercasing.
fn matches_handle(candidate: &str, handle: &str) -> bool {
    candidate.to_lowercase() == handle.to_lowercase()
}

/// Statistics counters arrive as decimal strings; missing or malformed
/// counters count as zero.
fn parse_count(value: Option<String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn pick_thumbnail(thumbnails: &HashMap<String, Thumbnail>) -> String {
    ["high", "medium", "default"]
        .iter()
        .find_map(|size| thumbnails.get(*size))
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

// YouTube API response structures

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    #[serde(rename = "channelId")]
    channel_id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "customUrl")]
    custom_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelIdResponse {
    items: Option<Vec<ChannelIdItem>>,
}

#[derive(Debug, Deserialize)]
struct ChannelIdItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelContentResponse {
    items: Option<Vec<ChannelContentItem>>,
}

#[derive(Debug, Deserialize)]
struct ChannelContentItem {
    #[serde(rename = "contentDetails")]
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
struct ChannelDetailsResponse {
    items: Option<Vec<ChannelDetailsItem>>,
}

#[derive(Debug, Deserialize)]
struct ChannelDetailsItem {
    id: String,
    snippet: ChannelSnippet,
    statistics: ChannelStatistics,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
    #[serde(rename = "customUrl")]
    custom_url: Option<String>,
    country: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    video_count: Option<String>,
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    items: Option<Vec<PlaylistItem>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: PlaylistItemContent,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemContent {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    items: Option<Vec<VideoItem>>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    statistics: VideoStatistics,
    #[serde(rename = "contentDetails")]
    content_details: VideoContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct VideoStatistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_channel_id_needs_no_network() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCabc123").unwrap(),
            ChannelRef::Id("UCabc123".to_string())
        );
    }

    #[test]
    fn test_handle_forms() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/@somecreator").unwrap(),
            ChannelRef::Handle("somecreator".to_string())
        );
        assert_eq!(
            parse_channel_url("https://www.youtube.com/c/SomeCreator/videos").unwrap(),
            ChannelRef::Handle("SomeCreator".to_string())
        );
    }

    #[test]
    fn test_legacy_username_form() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/user/oldname").unwrap(),
            ChannelRef::Username("oldname".to_string())
        );
    }

    #[test]
    fn test_unsupported_urls_rejected() {
        assert!(matches!(
            parse_channel_url("not a url"),
            Err(AppError::InvalidChannelUrl)
        ));
        assert!(matches!(
            parse_channel_url("https://www.youtube.com/watch?v=abc"),
            Err(AppError::InvalidChannelUrl)
        ));
        // /channel/ without a UC token is not a literal id
        assert!(matches!(
            parse_channel_url("https://www.youtube.com/channel/xyz"),
            Err(AppError::InvalidChannelUrl)
        ));
    }

    #[test]
    fn test_handle_match_is_unicode_case_insensitive() {
        assert!(matches_handle("SomeCreator", "somecreator"));
        // Diacritics must survive the comparison
        assert!(matches_handle("HọcTiếngViệt", "họctiếngviệt"));
        assert!(!matches_handle("HocTiengViet", "họctiếngviệt"));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("1234".to_string())), 1234);
        assert_eq!(parse_count(Some("not-a-number".to_string())), 0);
        assert_eq!(parse_count(None), 0);
    }
}
