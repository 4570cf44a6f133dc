// Paginated video ingestion
// A page can be full at the protocol level yet yield zero usable videos when
// every entry points at a removed or private video. The loop keeps paginating
// past such pages; only a genuinely failed call aborts it.

use tracing::warn;

use crate::error::Result;
use crate::models::video::VideoRecord;

/// One page of video ids from the uploads collection
#[derive(Debug, Clone)]
pub struct IdPage {
    pub video_ids: Vec<String>,
    /// Opaque continuation cursor; absent means the collection is exhausted
    pub next_cursor: Option<String>,
}

/// Source of paginated video ids and batch details. Implemented by the
/// YouTube client and by in-memory fixtures in tests.
#[allow(async_fn_in_trait)]
pub trait VideoFeed {
    async fn playlist_page(&self, playlist_id: &str, cursor: Option<&str>) -> Result<IdPage>;
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoRecord>>;
}

/// Bound on consecutive zero-yield pages. A channel with thousands of removed
/// videos in a row would otherwise keep the loop spinning; hitting the bound
/// ends the operation with the cursor preserved so the user can continue.
pub const MAX_SKIPPED_PAGES: usize = 25;

/// Result of one ingestion step: the next usable batch (possibly empty) and
/// the cursor to continue from, if any.
#[derive(Debug)]
pub struct PageOutcome {
    pub videos: Vec<VideoRecord>,
    pub next_cursor: Option<String>,
}

/// Fetch the next batch of usable videos starting at `cursor`.
///
/// Pages whose ids all fail to resolve are skipped while a continuation
/// cursor remains. An empty id list ends the collection. The caller decides
/// whether an empty outcome on a fresh analysis is the "no videos" condition.
pub async fn fetch_usable_page<F: VideoFeed>(
    feed: &F,
    playlist_id: &str,
    cursor: Option<String>,
) -> Result<PageOutcome> {
    let mut cursor = cursor;
    let mut skipped = 0usize;

    loop {
        let page = feed.playlist_page(playlist_id, cursor.as_deref()).await?;
        if page.video_ids.is_empty() {
            return Ok(PageOutcome {
                videos: Vec::new(),
                next_cursor: None,
            });
        }

        let videos = feed.video_details(&page.video_ids).await?;
        if !videos.is_empty() {
            return Ok(PageOutcome {
                videos,
                next_cursor: page.next_cursor,
            });
        }

        // Every id on this page pointed at a gone video
        match page.next_cursor {
            Some(next) => {
                skipped += 1;
                if skipped >= MAX_SKIPPED_PAGES {
                    warn!(skipped, "stopping after too many empty pages in a row");
                    return Ok(PageOutcome {
                        videos: Vec::new(),
                        next_cursor: Some(next),
                    });
                }
                cursor = Some(next);
            }
            None => {
                return Ok(PageOutcome {
                    videos: Vec::new(),
                    next_cursor: None,
                })
            }
        }
    }
}
