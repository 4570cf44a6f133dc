// Per-video summary fan-out
// Each request resolves independently and merges into the shared working set
// by video id, so arrival order does not matter and one failure never blocks
// the others. A merge whose id has left the working set (a new analysis
// replaced it) is dropped.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AppError;
use crate::models::video::{VideoSet, SUMMARY_ERROR_PREFIX};

/// Shared handle to the working video set
pub type SharedVideoSet = Arc<Mutex<VideoSet>>;

/// Fan out one summary request per (id, title) target. On failure the error
/// becomes an inline placeholder on just that record.
pub async fn dispatch_summaries<F, Fut>(
    set: SharedVideoSet,
    targets: Vec<(String, String)>,
    request: F,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, AppError>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(targets.len());

    for (id, title) in targets {
        let set = Arc::clone(&set);
        let pending = request(title);
        handles.push(tokio::spawn(async move {
            let summary = match pending.await {
                Ok(text) => text,
                Err(e) => format!("{} {}", SUMMARY_ERROR_PREFIX, e),
            };
            // Read-then-write against the current accumulator, not a
            // snapshot captured at dispatch time
            let merged = set.lock().await.set_summary(&id, summary);
            if !merged {
                debug!(video_id = %id, "dropped summary for a video no longer in the working set");
            }
        }));
    }

    for result in join_all(handles).await {
        if let Err(e) = result {
            debug!("summary task aborted: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video::test_video;
    use std::time::Duration;

    fn shared_set(ids: &[&str]) -> SharedVideoSet {
        let mut set = VideoSet::default();
        set.replace(
            ids.iter()
                .map(|id| test_video(id, &format!("title {}", id)))
                .collect(),
        );
        Arc::new(Mutex::new(set))
    }

    async fn run_with_delays(delay_a: u64, delay_b: u64) -> Vec<(String, String)> {
        let set = shared_set(&["a", "b"]);
        let targets = vec![
            ("a".to_string(), "title a".to_string()),
            ("b".to_string(), "title b".to_string()),
        ];

        dispatch_summaries(Arc::clone(&set), targets, move |title| {
            let delay = if title.ends_with('a') { delay_a } else { delay_b };
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(format!("summary of {}", title))
            }
        })
        .await;

        let set = set.lock().await;
        set.videos()
            .into_iter()
            .map(|v| (v.id, v.summary))
            .collect()
    }

    #[tokio::test]
    async fn test_merge_is_commutative_in_arrival_order() {
        // a finishes last vs a finishes first: same final list
        let a_last = run_with_delays(40, 5).await;
        let a_first = run_with_delays(5, 40).await;
        assert_eq!(a_last, a_first);
        assert_eq!(a_last[0].1, "summary of title a");
        assert_eq!(a_last[1].1, "summary of title b");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_siblings() {
        let set = shared_set(&["a", "b"]);
        let targets = vec![
            ("a".to_string(), "title a".to_string()),
            ("b".to_string(), "title b".to_string()),
        ];

        dispatch_summaries(Arc::clone(&set), targets, |title| async move {
            if title.ends_with('a') {
                Err(AppError::Provider {
                    provider: "Gemini",
                    message: "quota exceeded".to_string(),
                })
            } else {
                Ok("fine".to_string())
            }
        })
        .await;

        let videos = set.lock().await.videos();
        assert!(videos[0].summary.starts_with(SUMMARY_ERROR_PREFIX));
        assert!(videos[0].summary.contains("quota exceeded"));
        assert_eq!(videos[1].summary, "fine");
    }

    #[tokio::test]
    async fn test_stale_arrivals_are_dropped() {
        let set = shared_set(&["a"]);
        // "z" was part of a superseded analysis
        let targets = vec![
            ("a".to_string(), "title a".to_string()),
            ("z".to_string(), "old title".to_string()),
        ];

        dispatch_summaries(Arc::clone(&set), targets, |_title| async move {
            Ok("done".to_string())
        })
        .await;

        let set = set.lock().await;
        assert_eq!(set.len(), 1);
        assert!(!set.contains("z"));
        assert_eq!(set.videos()[0].summary, "done");
    }
}
