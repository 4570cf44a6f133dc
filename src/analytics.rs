// Text analytics over the working video set
// Keyword/phrase frequency from titles, hashtag frequency from descriptions.
// Both tables are pure functions of the video list and are recomputed from
// scratch whenever the list changes.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::models::video::VideoRecord;

/// Ranked phrase from video titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub text: String,
    pub count: usize,
}

/// Ranked hashtag from video descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagEntry {
    pub text: String,
    pub count: usize,
}

/// Longest phrase considered, in words
const MAX_PHRASE_WORDS: usize = 3;

/// Ranked keyword table cap
const KEYWORD_LIMIT: usize = 20;

// English plus Vietnamese function words, matching the audience of the
// channels this tool is pointed at.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // English
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from",
        "has", "have", "he", "her", "his", "how", "i", "if", "in", "is", "it",
        "its", "my", "no", "not", "of", "on", "or", "our", "out", "she", "so",
        "that", "the", "their", "them", "then", "there", "these", "they",
        "this", "to", "up", "was", "we", "were", "what", "when", "where",
        "which", "who", "why", "will", "with", "you", "your",
        // Vietnamese
        "anh", "bạn", "bị", "các", "cách", "cho", "chưa", "chỉ", "cái", "có",
        "cùng", "của", "cũng", "em", "gì", "khi", "không", "là", "làm", "lại",
        "mà", "mình", "mới", "một", "nào", "này", "nhất", "như", "nhưng",
        "những", "phải", "ra", "rất", "rồi", "sao", "sẽ", "thì", "trong",
        "trên", "tại", "và", "vì", "với", "đã", "đang", "đến", "được", "đây",
        "để",
    ])
});

/// Lowercase and strip everything that is not a letter, digit or whitespace.
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

fn is_numeric_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_numeric())
}

/// A phrase is worth counting only if at least one of its words carries
/// meaning: not a stop word and not purely numeric. Single words shorter
/// than three characters are always dropped.
fn is_significant_phrase(words: &[&str]) -> bool {
    if words.len() == 1 && words[0].chars().count() < 3 {
        return false;
    }
    words
        .iter()
        .any(|w| !STOP_WORDS.contains(*w) && !is_numeric_word(w))
}

/// Ranked 1-3 word phrases across all video titles. Phrases seen only once
/// are dropped; ties keep discovery order; capped at the top 20.
pub fn extract_keywords(videos: &[VideoRecord]) -> Vec<KeywordEntry> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut discovery: Vec<String> = Vec::new();

    for video in videos {
        let normalized = normalize_title(&video.title);
        let words: Vec<&str> = normalized.split_whitespace().collect();

        for size in 1..=MAX_PHRASE_WORDS {
            for window in words.windows(size) {
                if !is_significant_phrase(window) {
                    continue;
                }
                let phrase = window.join(" ");
                match counts.get_mut(&phrase) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(phrase.clone(), 1);
                        discovery.push(phrase);
                    }
                }
            }
        }
    }

    let mut ranked: Vec<KeywordEntry> = discovery
        .into_iter()
        .filter_map(|phrase| {
            let count = counts[&phrase];
            (count > 1).then_some(KeywordEntry { text: phrase, count })
        })
        .collect();

    // Stable sort keeps discovery order within equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(KEYWORD_LIMIT);
    ranked
}

/// Ranked hashtags across all video descriptions: `#` followed by letters,
/// digits or underscores, lowercased so casing variants collapse. Uncapped.
pub fn extract_hashtags(videos: &[VideoRecord]) -> Vec<HashtagEntry> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut discovery: Vec<String> = Vec::new();

    for video in videos {
        let mut chars = video.description.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '#' {
                continue;
            }
            let mut tag = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    tag.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if tag.is_empty() {
                continue;
            }
            let tag = format!("#{}", tag.to_lowercase());
            match counts.get_mut(&tag) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(tag.clone(), 1);
                    discovery.push(tag);
                }
            }
        }
    }

    let mut ranked: Vec<HashtagEntry> = discovery
        .into_iter()
        .map(|tag| {
            let count = counts[&tag];
            HashtagEntry { text: tag, count }
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video::PENDING_SUMMARY;

    fn video(title: &str, description: &str) -> VideoRecord {
        VideoRecord {
            id: format!("id-{}", title.len()),
            title: title.to_string(),
            description: description.to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            views: 0,
            likes: 0,
            duration: "01:00".to_string(),
            summary: PENDING_SUMMARY.to_string(),
        }
    }

    #[test]
    fn test_repeated_phrase_is_ranked() {
        let videos = vec![
            video("Rust tutorial for beginners", ""),
            video("Rust tutorial part two", ""),
        ];
        let keywords = extract_keywords(&videos);
        let top: Vec<&str> = keywords.iter().map(|k| k.text.as_str()).collect();

        assert!(top.contains(&"rust"));
        assert!(top.contains(&"rust tutorial"));
        // "for beginners" appeared once, so it is dropped
        assert!(!top.contains(&"for beginners"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let videos = vec![
            video("Learn Rust fast", "desc"),
            video("Learn Rust slowly", "desc"),
            video("Learn Go fast", "desc"),
        ];
        assert_eq!(extract_keywords(&videos), extract_keywords(&videos));
        assert_eq!(extract_hashtags(&videos), extract_hashtags(&videos));
    }

    #[test]
    fn test_stop_word_only_phrases_excluded() {
        let videos = vec![
            video("the and of", ""),
            video("the and of", ""),
            video("2024 100", ""),
            video("2024 100", ""),
        ];
        // Every candidate is all stop words or all numbers
        assert!(extract_keywords(&videos).is_empty());
    }

    #[test]
    fn test_short_single_words_excluded() {
        let videos = vec![video("go go go", ""), video("go home now", "")];
        let keywords = extract_keywords(&videos);
        assert!(keywords.iter().all(|k| k.text != "go"));
        // Multi-word phrases containing the short word are still allowed
        assert!(keywords.iter().any(|k| k.text == "go go"));
    }

    #[test]
    fn test_punctuation_stripped_and_case_folded() {
        let videos = vec![video("Rust: The Basics!", ""), video("RUST the basics?", "")];
        let keywords = extract_keywords(&videos);
        assert!(keywords.iter().any(|k| k.text == "rust" && k.count == 2));
        assert!(keywords.iter().any(|k| k.text == "rust the basics" && k.count == 2));
    }

    #[test]
    fn test_keyword_table_caps_at_twenty() {
        // 30 distinct words, each appearing twice
        let mut videos = Vec::new();
        for round in 0..2 {
            for i in 0..30 {
                videos.push(video(&format!("topicword{} r{}", i, round), ""));
            }
        }
        let keywords = extract_keywords(&videos);
        assert_eq!(keywords.len(), 20);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let videos = vec![
            video("alpha first", ""),
            video("alpha first", ""),
            video("beta second", ""),
            video("beta second", ""),
        ];
        let keywords = extract_keywords(&videos);
        let alpha_pos = keywords.iter().position(|k| k.text == "alpha").unwrap();
        let beta_pos = keywords.iter().position(|k| k.text == "beta").unwrap();
        assert!(alpha_pos < beta_pos);
    }

    #[test]
    fn test_hashtags_collapse_case_and_keep_prefix() {
        let videos = vec![
            video("t", "check #Rust and #RUST plus #go_lang"),
            video("t", "more #rust here, plus a lone # sign"),
        ];
        let hashtags = extract_hashtags(&videos);

        assert!(hashtags.iter().all(|h| h.text.starts_with('#')));
        let rust = hashtags.iter().find(|h| h.text == "#rust").unwrap();
        assert_eq!(rust.count, 3);
        assert!(hashtags.iter().any(|h| h.text == "#go_lang"));
        // The bare '#' did not produce an empty tag
        assert!(hashtags.iter().all(|h| h.text.len() > 1));
    }

    #[test]
    fn test_empty_set_yields_empty_tables() {
        assert!(extract_keywords(&[]).is_empty());
        assert!(extract_hashtags(&[]).is_empty());
    }
}
