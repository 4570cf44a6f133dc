// Application working state
// One App corresponds to one dashboard session: the working video set, the
// continuation cursor, analytics derived on demand, the chat transcript, and
// the persisted credential/session state behind the storage port.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::analytics::{extract_hashtags, extract_keywords, HashtagEntry, KeywordEntry};
use crate::api::provider::AiProvider;
use crate::api::youtube::YouTubeClient;
use crate::dispatch::{dispatch_summaries, SharedVideoSet};
use crate::error::{AppError, Result};
use crate::ingest::{fetch_usable_page, PageOutcome};
use crate::models::credentials::{CredentialBundle, CredentialStatus, ProviderKind};
use crate::models::session::{ChatMessage, Session, SessionData};
use crate::models::video::{sorted_view, ChannelDetails, SortKey, SortState, VideoRecord, VideoSet};
use crate::store::{
    migrate_legacy_credentials, read_credentials, read_model, read_provider, read_sessions,
    write_credentials, write_model, write_provider, write_sessions, KvMap, StoragePort,
};

pub struct App {
    client: reqwest::Client,
    store: Box<dyn StoragePort>,
    kv: KvMap,
    pub bundle: CredentialBundle,
    pub provider: AiProvider,
    pub gemini_model: String,
    pub openai_model: String,
    pub sessions: Vec<Session>,

    // Working state of the current analysis
    pub channel_url: String,
    pub channel: Option<ChannelDetails>,
    videos: SharedVideoSet,
    uploads_playlist: Option<String>,
    pub next_cursor: Option<String>,
    pub chat: Vec<ChatMessage>,
    pub sort: Option<SortState>,
}

impl App {
    /// Load persisted state through the port, applying the legacy credential
    /// migration on first load.
    pub fn new(client: reqwest::Client, store: Box<dyn StoragePort>) -> Result<Self> {
        let mut kv = store.load()?;
        if migrate_legacy_credentials(&mut kv) {
            store.save(&kv)?;
        }

        let bundle = read_credentials(&kv);
        let provider = read_provider(&kv);
        let gemini_model = read_model(&kv, AiProvider::Gemini);
        let openai_model = read_model(&kv, AiProvider::OpenAi);
        let sessions = read_sessions(&kv);

        Ok(Self {
            client,
            store,
            kv,
            bundle,
            provider,
            gemini_model,
            openai_model,
            sessions,
            channel_url: String::new(),
            channel: None,
            videos: Arc::new(Mutex::new(VideoSet::default())),
            uploads_playlist: None,
            next_cursor: None,
            chat: Vec::new(),
            sort: None,
        })
    }

    /// Write all persisted keys back through the port, wholesale.
    fn persist(&mut self) -> Result<()> {
        write_credentials(&mut self.kv, &self.bundle);
        write_sessions(&mut self.kv, &self.sessions);
        write_provider(&mut self.kv, self.provider);
        write_model(&mut self.kv, AiProvider::Gemini, &self.gemini_model);
        write_model(&mut self.kv, AiProvider::OpenAi, &self.openai_model);
        self.store.save(&self.kv)
    }

    // ----- credentials -----

    fn youtube_key(&self) -> Result<String> {
        self.bundle
            .active_key(ProviderKind::YouTube)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::InvalidInput(
                    "No active YouTube API key. Add one with 'keys youtube add <key>'".to_string(),
                )
            })
    }

    fn ai_key(&self) -> Result<String> {
        let kind = match self.provider {
            AiProvider::Gemini => ProviderKind::Gemini,
            AiProvider::OpenAi => ProviderKind::OpenAi,
        };
        self.bundle
            .active_key(kind)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "No active {} API key. Add one with 'keys {} add <key>'",
                    self.provider.label(),
                    self.provider.label().to_lowercase()
                ))
            })
    }

    pub fn active_model(&self) -> &str {
        match self.provider {
            AiProvider::Gemini => &self.gemini_model,
            AiProvider::OpenAi => &self.openai_model,
        }
    }

    /// Validate a new credential against its provider and store the result.
    pub async fn add_credential(
        &mut self,
        kind: ProviderKind,
        secret: &str,
    ) -> Result<CredentialStatus> {
        let valid = match kind {
            ProviderKind::YouTube => YouTubeClient::validate_key(&self.client, secret).await,
            ProviderKind::Gemini => AiProvider::Gemini.validate_key(&self.client, secret).await,
            ProviderKind::OpenAi => AiProvider::OpenAi.validate_key(&self.client, secret).await,
        };
        let status = if valid {
            CredentialStatus::Valid
        } else {
            CredentialStatus::Invalid
        };

        self.bundle.provider_mut(kind).add(secret, status)?;
        self.persist()?;
        info!(provider = kind.label(), status = status.label(), "stored credential");
        Ok(status)
    }

    pub fn remove_credential(&mut self, kind: ProviderKind, id: &str) -> Result<()> {
        if !self.bundle.provider_mut(kind).remove(id) {
            return Err(AppError::InvalidInput("No credential with that id".to_string()));
        }
        self.persist()
    }

    pub fn activate_credential(&mut self, kind: ProviderKind, id: &str) -> Result<()> {
        self.bundle.provider_mut(kind).set_active(id)?;
        self.persist()
    }

    pub fn set_provider(&mut self, provider: AiProvider) -> Result<()> {
        self.provider = provider;
        self.persist()
    }

    pub fn set_model(&mut self, provider: AiProvider, model: &str) -> Result<()> {
        match provider {
            AiProvider::Gemini => self.gemini_model = model.to_string(),
            AiProvider::OpenAi => self.openai_model = model.to_string(),
        }
        self.persist()
    }

    // ----- analysis -----

    /// Fresh analysis of a channel URL. Replaces the whole working state, but
    /// only after every fetch succeeded; a failure leaves the previous state
    /// untouched.
    pub async fn analyze(&mut self, channel_url: &str) -> Result<usize> {
        let channel_url = channel_url.trim();
        if channel_url.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter a channel URL".to_string(),
            ));
        }
        let api_key = self.youtube_key()?;
        let client = self.client.clone();
        let yt = YouTubeClient::new(&client, &api_key);

        let channel_id = yt.resolve_channel_id(channel_url).await?;
        let details = yt.channel_details(&channel_id).await?;
        let playlist_id = yt.uploads_playlist_id(&channel_id).await?;
        let outcome = fetch_usable_page(&yt, &playlist_id, None).await?;

        if outcome.videos.is_empty() {
            return Err(AppError::NoVideos);
        }
        info!(channel = %details.title, count = outcome.videos.len(), "analyzed channel");
        self.commit_fresh(channel_url, details, playlist_id, outcome).await;
        Ok(self.videos.lock().await.len())
    }

    async fn commit_fresh(
        &mut self,
        channel_url: &str,
        details: ChannelDetails,
        playlist_id: String,
        outcome: PageOutcome,
    ) {
        self.channel_url = channel_url.to_string();
        self.channel = Some(details);
        self.uploads_playlist = Some(playlist_id);
        self.videos.lock().await.replace(outcome.videos);
        self.next_cursor = outcome.next_cursor;
        self.sort = None;
        self.chat.clear();
    }

    /// Fetch the next usable page and append it to the working set. Returns
    /// the number of appended records; zero means the collection is done.
    pub async fn load_more(&mut self) -> Result<usize> {
        let Some(cursor) = self.next_cursor.clone() else {
            return Ok(0);
        };
        let Some(playlist_id) = self.uploads_playlist.clone() else {
            return Ok(0);
        };
        let api_key = self.youtube_key()?;
        let client = self.client.clone();
        let yt = YouTubeClient::new(&client, &api_key);

        let outcome = fetch_usable_page(&yt, &playlist_id, Some(cursor)).await?;
        let appended = outcome.videos.len();
        self.videos.lock().await.append(outcome.videos);
        self.next_cursor = outcome.next_cursor;
        Ok(appended)
    }

    pub async fn videos_snapshot(&self) -> Vec<VideoRecord> {
        self.videos.lock().await.videos()
    }

    pub async fn video_count(&self) -> usize {
        self.videos.lock().await.len()
    }

    /// The results view: the master order re-sorted by the active sort state.
    pub async fn sorted_videos(&self) -> Vec<VideoRecord> {
        sorted_view(&self.videos_snapshot().await, self.sort)
    }

    pub fn toggle_sort(&mut self, key: SortKey) -> SortState {
        let state = SortState::toggle(self.sort, key);
        self.sort = Some(state);
        state
    }

    pub async fn keywords(&self) -> Vec<KeywordEntry> {
        extract_keywords(&self.videos_snapshot().await)
    }

    pub async fn hashtags(&self) -> Vec<HashtagEntry> {
        extract_hashtags(&self.videos_snapshot().await)
    }

    // ----- AI -----

    /// Fan out summary requests for every record still pending. Returns how
    /// many requests were dispatched.
    pub async fn summarize_pending(&mut self) -> Result<usize> {
        let api_key = self.ai_key()?;
        let model = self.active_model().to_string();
        let provider = self.provider;
        let client = self.client.clone();

        let targets = self.videos.lock().await.pending_summaries();
        if targets.is_empty() {
            return Ok(0);
        }
        let count = targets.len();

        dispatch_summaries(Arc::clone(&self.videos), targets, move |title| {
            let client = client.clone();
            let api_key = api_key.clone();
            let model = model.clone();
            async move {
                provider
                    .generate_summary(&client, &api_key, &model, &title)
                    .await
            }
        })
        .await;

        Ok(count)
    }

    /// Append the user's turn, send the whole transcript, append the reply.
    /// A provider failure becomes an inline model turn instead of an error.
    pub async fn send_chat(&mut self, text: &str) -> Result<String> {
        let api_key = self.ai_key()?;
        let model = self.active_model().to_string();
        let provider = self.provider;
        let client = self.client.clone();

        self.send_chat_with(text, move |transcript| {
            let client = client.clone();
            let api_key = api_key.clone();
            let model = model.clone();
            async move {
                provider
                    .generate_chat(&client, &api_key, &model, &transcript)
                    .await
            }
        })
        .await
    }

    async fn send_chat_with<F, Fut>(&mut self, text: &str, request: F) -> Result<String>
    where
        F: FnOnce(Vec<ChatMessage>) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Message is empty".to_string()));
        }

        self.chat.push(ChatMessage::user(text));
        let reply = match request(self.chat.clone()).await {
            Ok(reply) => reply,
            Err(e) => format!("Sorry, I cannot respond right now: {}", e),
        };
        self.chat.push(ChatMessage::model(reply.clone()));
        Ok(reply)
    }

    // ----- sessions -----

    /// Snapshot the working state under a name. The snapshot is a deep copy,
    /// independent of the live state.
    pub async fn save_session(&mut self, name: &str) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Session name is empty".to_string()));
        }
        let videos = self.videos_snapshot().await;
        if videos.is_empty() && self.channel.is_none() {
            return Err(AppError::InvalidInput(
                "Nothing to save yet. Analyze a channel first".to_string(),
            ));
        }

        let session = Session::snapshot(
            name.trim(),
            SessionData {
                channel_url: self.channel_url.clone(),
                videos,
                channel_details: self.channel.clone(),
                chat_history: self.chat.clone(),
            },
        );
        let id = session.id;
        self.sessions.push(session);
        self.persist()?;
        Ok(id)
    }

    /// Replace the live working state with a saved snapshot. The session's
    /// continuation cursor is gone by design, so load-more starts over with a
    /// fresh analysis.
    pub async fn load_session(&mut self, id: i64) -> Result<()> {
        let session = self
            .sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::InvalidInput("No session with that id".to_string()))?;
        let data = session.data.clone();

        self.channel_url = data.channel_url;
        self.channel = data.channel_details;
        self.videos.lock().await.replace(data.videos);
        self.chat = data.chat_history;
        self.uploads_playlist = None;
        self.next_cursor = None;
        self.sort = None;
        Ok(())
    }

    pub fn delete_session(&mut self, id: i64) -> Result<()> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Err(AppError::InvalidInput("No session with that id".to_string()));
        }
        self.persist()
    }
}
