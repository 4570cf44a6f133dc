// Export builders - CSV for the keyword/video tables, plain text for
// brainstorm transcripts. Simple delimited formats, no schema versioning.

use chrono::Utc;

use crate::analytics::KeywordEntry;
use crate::api::provider::AiProvider;
use crate::models::session::ChatMessage;
use crate::models::video::{ChannelDetails, VideoRecord};

// Byte-order mark so spreadsheet tools detect UTF-8
const BOM: &str = "\u{feff}";

fn csv_escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn keywords_csv(keywords: &[KeywordEntry]) -> String {
    let mut content = String::from(BOM);
    content.push_str("rank,phrase,count\n");
    for (index, keyword) in keywords.iter().enumerate() {
        content.push_str(&format!(
            "{},{},{}\n",
            index + 1,
            csv_escape(&keyword.text),
            keyword.count
        ));
    }
    content
}

pub fn videos_csv(videos: &[VideoRecord]) -> String {
    let mut content = String::from(BOM);
    content.push_str("title,description,publishedAt,views,likes,duration,summary\n");
    for video in videos {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_escape(&video.title),
            csv_escape(&video.description),
            video.published_at,
            video.views,
            video.likes,
            video.duration,
            csv_escape(&video.summary)
        ));
    }
    content
}

pub fn chat_transcript(
    provider: AiProvider,
    channel: Option<&ChannelDetails>,
    chat: &[ChatMessage],
) -> String {
    let channel_title = channel.map(|c| c.title.as_str()).unwrap_or("N/A");

    let mut content = format!("--- Brainstorm Session with {} ---\n", provider.label());
    content.push_str(&format!("Channel: {}\n", channel_title));
    content.push_str(&format!("Date: {}\n\n", Utc::now().format("%Y-%m-%d %H:%M")));

    for msg in chat {
        let prefix = if msg.role == "user" { "[YOU]" } else { "[AI]" };
        content.push_str(&format!(
            "{}:\n{}\n\n--------------------------------\n\n",
            prefix, msg.content
        ));
    }

    content
}

/// Suggested transcript filename, e.g. `brainstorm-Some_Channel-2024-05-01.txt`
pub fn transcript_filename(channel: Option<&ChannelDetails>) -> String {
    let channel_name: String = channel
        .map(|c| {
            c.title
                .chars()
                .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
                .collect()
        })
        .unwrap_or_else(|| "unknown-channel".to_string());

    format!(
        "brainstorm-{}-{}.txt",
        channel_name,
        Utc::now().format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_csv_escapes_quotes() {
        let keywords = vec![
            KeywordEntry {
                text: "rust tutorial".to_string(),
                count: 4,
            },
            KeywordEntry {
                text: "say \"hi\"".to_string(),
                count: 2,
            },
        ];
        let csv = keywords_csv(&keywords);

        assert!(csv.starts_with(BOM));
        assert!(csv.contains("rank,phrase,count\n"));
        assert!(csv.contains("1,\"rust tutorial\",4\n"));
        assert!(csv.contains("2,\"say \"\"hi\"\"\",2\n"));
    }

    #[test]
    fn test_videos_csv_has_all_columns() {
        use crate::models::video::test_video;
        let mut video = test_video("a", "My, \"quoted\" title");
        video.views = 12;
        let csv = videos_csv(&[video]);

        assert!(csv.contains("title,description,publishedAt,views,likes,duration,summary\n"));
        assert!(csv.contains("\"My, \"\"quoted\"\" title\""));
        assert!(csv.contains(",12,"));
    }

    #[test]
    fn test_transcript_layout() {
        let chat = vec![
            ChatMessage::user("ideas for shorts?"),
            ChatMessage::model("three come to mind"),
        ];
        let text = chat_transcript(AiProvider::Gemini, None, &chat);

        assert!(text.starts_with("--- Brainstorm Session with Gemini ---"));
        assert!(text.contains("Channel: N/A"));
        assert!(text.contains("[YOU]:\nideas for shorts?"));
        assert!(text.contains("[AI]:\nthree come to mind"));
    }

    #[test]
    fn test_transcript_filename_sanitized() {
        assert_eq!(
            transcript_filename(None),
            format!(
                "brainstorm-unknown-channel-{}.txt",
                Utc::now().format("%Y-%m-%d")
            )
        );
    }
}
