// Video and channel data models
// Field names serialize in camelCase to match the stored session format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::duration::clock_to_seconds;

/// Sentinel summary for records whose AI summary has not arrived yet.
pub const PENDING_SUMMARY: &str = "Summary pending...";

/// Prefix marking an inline per-video summary failure.
pub const SUMMARY_ERROR_PREFIX: &str = "Error:";

/// One video of the working set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub views: u64,
    pub likes: u64,
    /// Clock-format duration, `H:MM:SS` or `MM:SS`
    pub duration: String,
    #[serde(default = "pending_summary")]
    pub summary: String,
}

fn pending_summary() -> String {
    PENDING_SUMMARY.to_string()
}

impl VideoRecord {
    pub fn summary_is_pending(&self) -> bool {
        self.summary == PENDING_SUMMARY
    }
}

/// Channel metadata shown by the `channel` command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelDetails {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(rename = "customUrl", default)]
    pub custom_url: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: u64,
    #[serde(rename = "videoCount")]
    pub video_count: u64,
    #[serde(rename = "viewCount")]
    pub view_count: u64,
    #[serde(rename = "thumbnailUrl", default)]
    pub thumbnail_url: String,
}

/// Sortable columns of the results view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PublishedAt,
    Views,
    Likes,
    Duration,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "published" | "date" => Some(SortKey::PublishedAt),
            "views" => Some(SortKey::Views),
            "likes" => Some(SortKey::Likes),
            "duration" => Some(SortKey::Duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Active sort of the results view. Selecting a new column starts at
/// descending; re-selecting the same column toggles the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortState {
    pub fn toggle(current: Option<SortState>, key: SortKey) -> SortState {
        match current {
            Some(state) if state.key == key => SortState {
                key,
                order: match state.order {
                    SortOrder::Asc => SortOrder::Desc,
                    SortOrder::Desc => SortOrder::Asc,
                },
            },
            _ => SortState {
                key,
                order: SortOrder::Desc,
            },
        }
    }
}

/// Stable re-sort of the master insertion order. The view is always derived
/// from the unsorted working set, so ties keep their original order and
/// toggling a column twice round-trips.
pub fn sorted_view(videos: &[VideoRecord], sort: Option<SortState>) -> Vec<VideoRecord> {
    let mut view: Vec<VideoRecord> = videos.to_vec();
    let Some(SortState { key, order }) = sort else {
        return view;
    };

    view.sort_by(|a, b| {
        let ordering = match key {
            SortKey::PublishedAt => a.published_at.cmp(&b.published_at),
            SortKey::Views => a.views.cmp(&b.views),
            SortKey::Likes => a.likes.cmp(&b.likes),
            SortKey::Duration => {
                clock_to_seconds(&a.duration).cmp(&clock_to_seconds(&b.duration))
            }
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    view
}

/// The working set of videos, keyed by id with insertion order preserved.
///
/// Summary merges address records by id, so concurrent arrivals for different
/// videos never interfere and arrival order is irrelevant.
#[derive(Debug, Default, Clone)]
pub struct VideoSet {
    order: Vec<String>,
    records: HashMap<String, VideoRecord>,
}

impl VideoSet {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Replace the whole working set (fresh analysis).
    pub fn replace(&mut self, batch: Vec<VideoRecord>) {
        self.order.clear();
        self.records.clear();
        self.append(batch);
    }

    /// Append a batch at the end (load more), skipping ids already present.
    pub fn append(&mut self, batch: Vec<VideoRecord>) {
        for record in batch {
            if self.records.contains_key(&record.id) {
                continue;
            }
            self.order.push(record.id.clone());
            self.records.insert(record.id.clone(), record);
        }
    }

    /// Merge a summary into the record with the given id. Returns false when
    /// the id is no longer part of the working set (stale arrival, dropped).
    pub fn set_summary(&mut self, id: &str, summary: String) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.summary = summary;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the records in insertion order.
    pub fn videos(&self) -> Vec<VideoRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// (id, title) pairs of records still awaiting a summary.
    pub fn pending_summaries(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| r.summary_is_pending())
            .map(|r| (r.id.clone(), r.title.clone()))
            .collect()
    }
}

#[cfg(test)]
pub fn test_video(id: &str, title: &str) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        published_at: "2024-01-01T00:00:00Z".to_string(),
        views: 0,
        likes: 0,
        duration: "01:00".to_string(),
        summary: PENDING_SUMMARY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, views: u64, published: &str, duration: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("video {}", id),
            description: String::new(),
            published_at: published.to_string(),
            views,
            likes: views / 10,
            duration: duration.to_string(),
            summary: PENDING_SUMMARY.to_string(),
        }
    }

    #[test]
    fn test_replace_and_append_dedupe() {
        let mut set = VideoSet::default();
        set.replace(vec![video("a", 1, "2024-01-01", "01:00")]);
        set.append(vec![
            video("a", 99, "2024-01-02", "02:00"),
            video("b", 2, "2024-01-03", "03:00"),
        ]);

        let videos = set.videos();
        assert_eq!(videos.len(), 2);
        // Duplicate id did not overwrite the existing record
        assert_eq!(videos[0].views, 1);
        assert_eq!(videos[1].id, "b");
    }

    #[test]
    fn test_set_summary_by_id() {
        let mut set = VideoSet::default();
        set.replace(vec![video("a", 1, "2024-01-01", "01:00")]);

        assert!(set.set_summary("a", "done".to_string()));
        assert!(!set.set_summary("gone", "stale".to_string()));
        assert_eq!(set.videos()[0].summary, "done");
        assert!(set.pending_summaries().is_empty());
    }

    #[test]
    fn test_sorted_view_is_stable_and_round_trips() {
        let master = vec![
            video("a", 10, "2024-01-03", "01:00"),
            video("b", 30, "2024-01-01", "10:00"),
            video("c", 10, "2024-01-02", "00:30"),
        ];

        let desc = sorted_view(&master, Some(SortState { key: SortKey::Views, order: SortOrder::Desc }));
        assert_eq!(
            desc.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "a", "c"] // tie between a and c keeps master order
        );

        let asc = sorted_view(&master, Some(SortState { key: SortKey::Views, order: SortOrder::Asc }));
        let asc_again = sorted_view(&master, Some(SortState { key: SortKey::Views, order: SortOrder::Asc }));
        assert_eq!(asc, asc_again);

        // Unsorted view reproduces the master sequence
        assert_eq!(sorted_view(&master, None), master);
    }

    #[test]
    fn test_sort_by_duration_uses_seconds() {
        let master = vec![
            video("a", 0, "2024-01-01", "10:00"),
            video("b", 0, "2024-01-01", "01:02:03"),
            video("c", 0, "2024-01-01", "00:45"),
        ];
        let desc = sorted_view(&master, Some(SortState { key: SortKey::Duration, order: SortOrder::Desc }));
        assert_eq!(
            desc.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn test_toggle_semantics() {
        let first = SortState::toggle(None, SortKey::Views);
        assert_eq!(first.order, SortOrder::Desc);

        let second = SortState::toggle(Some(first), SortKey::Views);
        assert_eq!(second.order, SortOrder::Asc);

        // Switching column resets to descending
        let third = SortState::toggle(Some(second), SortKey::Likes);
        assert_eq!(third.key, SortKey::Likes);
        assert_eq!(third.order, SortOrder::Desc);
    }
}
