// Console command dispatch
// One input line is one command, the analogue of the dashboard's controls.

pub mod export;

use crate::api::provider::AiProvider;
use crate::app::App;
use crate::error::{AppError, Result};
use crate::models::credentials::ProviderKind;
use crate::models::video::{SortKey, SortOrder};
use crate::utils::formatters::{format_count_short, format_date, format_number, truncate};

pub enum Outcome {
    Continue,
    Quit,
}

pub async fn dispatch(app: &mut App, line: &str) -> Outcome {
    let line = line.trim();
    if line.is_empty() {
        return Outcome::Continue;
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    let result = match command {
        "help" => {
            print_help();
            Ok(())
        }
        "quit" | "exit" => return Outcome::Quit,
        "analyze" => analyze(app, rest).await,
        "more" => load_more(app).await,
        "list" => {
            print_videos(app).await;
            Ok(())
        }
        "sort" => sort(app, rest).await,
        "keywords" => {
            print_keywords(app).await;
            Ok(())
        }
        "hashtags" => {
            print_hashtags(app).await;
            Ok(())
        }
        "channel" => {
            print_channel(app);
            Ok(())
        }
        "summarize" => summarize(app).await,
        "chat" => chat(app, rest).await,
        "provider" => set_provider(app, rest),
        "model" => set_model(app, rest),
        "keys" => keys(app, rest).await,
        "save" => save_session(app, rest).await,
        "sessions" => {
            print_sessions(app);
            Ok(())
        }
        "load" => load_session(app, rest).await,
        "delete" => delete_session(app, rest),
        "export" => export_file(app, rest).await,
        _ => Err(AppError::InvalidInput(format!(
            "Unknown command '{}'. Try 'help'",
            command
        ))),
    };

    if let Err(e) = result {
        println!("Error: {}", e);
    }
    Outcome::Continue
}

fn print_help() {
    println!("Commands:");
    println!("  analyze <channel url>     analyze a channel's uploads");
    println!("  more                      load the next page of videos");
    println!("  list                      show the results table");
    println!("  sort <published|views|likes|duration>");
    println!("                            sort the table (repeat to toggle)");
    println!("  keywords                  top title phrases");
    println!("  hashtags                  hashtags found in descriptions");
    println!("  channel                   channel details");
    println!("  summarize                 generate AI summaries for pending videos");
    println!("  chat <message>            brainstorm with the selected provider");
    println!("  provider <gemini|openai>  choose the AI provider");
    println!("  model <gemini|openai> <name>");
    println!("                            choose the model for a provider");
    println!("  keys <youtube|gemini|openai> list|add <key>|use <id>|rm <id>");
    println!("  save <name>               save the working session");
    println!("  sessions                  list saved sessions");
    println!("  load <id>                 load a saved session");
    println!("  delete <id>               delete a saved session");
    println!("  export keywords|videos|chat [path]");
    println!("  quit");
}

async fn analyze(app: &mut App, url: &str) -> Result<()> {
    println!("Analyzing channel...");
    let count = app.analyze(url).await?;
    let title = app
        .channel
        .as_ref()
        .map(|c| c.title.as_str())
        .unwrap_or("channel");
    println!("Loaded {} videos from {}.", count, title);
    if app.next_cursor.is_some() {
        println!("More pages available - use 'more' to continue.");
    }
    Ok(())
}

async fn load_more(app: &mut App) -> Result<()> {
    if app.next_cursor.is_none() {
        println!("No more pages.");
        return Ok(());
    }
    let appended = app.load_more().await?;
    if appended == 0 {
        println!("No further videos found.");
    } else {
        println!(
            "Loaded {} more videos ({} total).",
            appended,
            app.video_count().await
        );
    }
    Ok(())
}

async fn print_videos(app: &App) {
    let videos = app.sorted_videos().await;
    if videos.is_empty() {
        println!("No videos loaded. Use 'analyze <channel url>' first.");
        return;
    }

    println!(
        "{:<4} {:<45} {:<11} {:>8} {:>7} {:>9}  {}",
        "#", "Title", "Published", "Views", "Likes", "Duration", "Summary"
    );
    for (index, video) in videos.iter().enumerate() {
        println!(
            "{:<4} {:<45} {:<11} {:>8} {:>7} {:>9}  {}",
            index + 1,
            truncate(&video.title, 45),
            format_date(&video.published_at),
            format_count_short(video.views),
            format_count_short(video.likes),
            video.duration,
            truncate(&video.summary, 40)
        );
    }
}

async fn sort(app: &mut App, column: &str) -> Result<()> {
    let key = SortKey::parse(column).ok_or_else(|| {
        AppError::InvalidInput(
            "Sortable columns: published, views, likes, duration".to_string(),
        )
    })?;
    let state = app.toggle_sort(key);
    let direction = match state.order {
        SortOrder::Asc => "ascending",
        SortOrder::Desc => "descending",
    };
    println!("Sorted by {} ({}).", column, direction);
    print_videos(app).await;
    Ok(())
}

async fn print_keywords(app: &App) {
    let keywords = app.keywords().await;
    if keywords.is_empty() {
        println!("No recurring phrases found in the loaded titles.");
        return;
    }
    println!("Top phrases in titles:");
    for (index, keyword) in keywords.iter().enumerate() {
        println!("{:>3}. {:>3}x  {}", index + 1, keyword.count, keyword.text);
    }
}

async fn print_hashtags(app: &App) {
    let hashtags = app.hashtags().await;
    if hashtags.is_empty() {
        println!("No hashtags found in the loaded descriptions.");
        return;
    }
    println!("Hashtags in descriptions:");
    for hashtag in &hashtags {
        println!("{:>5}x  {}", hashtag.count, hashtag.text);
    }
}

fn print_channel(app: &App) {
    let Some(channel) = &app.channel else {
        println!("No channel loaded. Use 'analyze <channel url>' first.");
        return;
    };
    println!("{}", channel.title);
    if !channel.custom_url.is_empty() {
        println!("  {}", channel.custom_url);
    }
    println!("  Published:   {}", format_date(&channel.published_at));
    if let Some(country) = &channel.country {
        println!("  Country:     {}", country);
    }
    println!("  Subscribers: {}", format_number(channel.subscriber_count));
    println!("  Videos:      {}", format_number(channel.video_count));
    println!("  Total views: {}", format_number(channel.view_count));
    if !channel.description.is_empty() {
        println!("  {}", truncate(&channel.description, 200));
    }
}

async fn summarize(app: &mut App) -> Result<()> {
    println!(
        "Requesting summaries from {} ({})...",
        app.provider.label(),
        app.active_model()
    );
    let count = app.summarize_pending().await?;
    if count == 0 {
        println!("Nothing pending - every video already has a summary.");
    } else {
        println!("Done. {} summaries merged.", count);
    }
    Ok(())
}

async fn chat(app: &mut App, message: &str) -> Result<()> {
    let reply = app.send_chat(message).await?;
    println!("[{}] {}", app.provider.label(), reply);
    Ok(())
}

fn set_provider(app: &mut App, name: &str) -> Result<()> {
    let provider = AiProvider::parse(name)
        .ok_or_else(|| AppError::InvalidInput("Providers: gemini, openai".to_string()))?;
    app.set_provider(provider)?;
    println!(
        "Using {} with model {}.",
        provider.label(),
        app.active_model()
    );
    Ok(())
}

fn set_model(app: &mut App, rest: &str) -> Result<()> {
    let (name, model) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| AppError::InvalidInput("Usage: model <gemini|openai> <name>".to_string()))?;
    let provider = AiProvider::parse(name)
        .ok_or_else(|| AppError::InvalidInput("Providers: gemini, openai".to_string()))?;
    app.set_model(provider, model.trim())?;
    println!("{} model set to {}.", provider.label(), model.trim());
    Ok(())
}

async fn keys(app: &mut App, rest: &str) -> Result<()> {
    let usage = || {
        AppError::InvalidInput(
            "Usage: keys <youtube|gemini|openai> list|add <key>|use <id>|rm <id>".to_string(),
        )
    };
    let mut parts = rest.splitn(3, char::is_whitespace);
    let kind = parts
        .next()
        .and_then(ProviderKind::parse)
        .ok_or_else(usage)?;
    let action = parts.next().unwrap_or("list");
    let argument = parts.next().unwrap_or("").trim();

    match action {
        "list" => {
            let provider = app.bundle.provider(kind);
            if provider.keys.is_empty() {
                println!("No {} keys stored.", kind.label());
                return Ok(());
            }
            for credential in &provider.keys {
                let active = if provider.active_id.as_deref() == Some(credential.id.as_str()) {
                    " (active)"
                } else {
                    ""
                };
                println!(
                    "{}  {}  {}{}",
                    credential.id,
                    mask_key(&credential.key),
                    credential.status.label(),
                    active
                );
            }
            Ok(())
        }
        "add" => {
            if argument.is_empty() {
                return Err(usage());
            }
            println!("Validating {} key...", kind.label());
            let status = app.add_credential(kind, argument).await?;
            println!("Key stored with status '{}'.", status.label());
            Ok(())
        }
        "use" => {
            app.activate_credential(kind, argument)?;
            println!("Active {} key switched.", kind.label());
            Ok(())
        }
        "rm" => {
            app.remove_credential(kind, argument)?;
            println!("Key removed.");
            Ok(())
        }
        _ => Err(usage()),
    }
}

fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        "*".repeat(count)
    } else {
        let head: String = key.chars().take(4).collect();
        let tail: String = key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{}...{}", head, tail)
    }
}

async fn save_session(app: &mut App, name: &str) -> Result<()> {
    let id = app.save_session(name).await?;
    println!("Session '{}' saved (id {}).", name.trim(), id);
    Ok(())
}

fn print_sessions(app: &App) {
    if app.sessions.is_empty() {
        println!("No saved sessions yet. Analyze a channel and use 'save <name>'.");
        return;
    }
    // Newest first, like the original library view
    let mut sessions: Vec<_> = app.sessions.iter().collect();
    sessions.sort_by(|a, b| b.id.cmp(&a.id));
    for session in sessions {
        println!(
            "{}  {}  ({} - {} videos, saved {})",
            session.id,
            session.name,
            session.channel_title,
            session.video_count,
            format_date(&session.created_at)
        );
    }
}

async fn load_session(app: &mut App, id: &str) -> Result<()> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::InvalidInput("Usage: load <session id>".to_string()))?;
    app.load_session(id).await?;
    println!(
        "Loaded session: {} videos from {}.",
        app.video_count().await,
        app.channel
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("unknown channel")
    );
    Ok(())
}

fn delete_session(app: &mut App, id: &str) -> Result<()> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::InvalidInput("Usage: delete <session id>".to_string()))?;
    app.delete_session(id)?;
    println!("Session deleted.");
    Ok(())
}

async fn export_file(app: &mut App, rest: &str) -> Result<()> {
    let (what, path) = match rest.split_once(char::is_whitespace) {
        Some((w, p)) => (w, Some(p.trim().to_string())),
        None => (rest, None),
    };

    let (content, default_path) = match what {
        "keywords" => (
            export::keywords_csv(&app.keywords().await),
            "keywords.csv".to_string(),
        ),
        "videos" => (
            export::videos_csv(&app.sorted_videos().await),
            "videos.csv".to_string(),
        ),
        "chat" => (
            export::chat_transcript(app.provider, app.channel.as_ref(), &app.chat),
            export::transcript_filename(app.channel.as_ref()),
        ),
        _ => {
            return Err(AppError::InvalidInput(
                "Usage: export keywords|videos|chat [path]".to_string(),
            ))
        }
    };

    let path = path.unwrap_or(default_path);
    std::fs::write(&path, content).map_err(|e| AppError::Storage(e.to_string()))?;
    println!("Exported to {}.", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key_short_and_long() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("AIzaSyD-secret-key"), "AIza...-key");
    }

    #[test]
    fn test_mask_key_handles_multibyte_keys() {
        // Every char is multi-byte; masking must never split one
        assert_eq!(mask_key("中中中中"), "****");
        assert_eq!(mask_key("khóa-bí-mật-dài"), "khóa...-dài");
        assert_eq!(mask_key("ключключключ"), "ключ...ключ");
    }
}
