//! Conversation review commands: list (optionally with transcripts) and
//! summarize.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use zeny_types::chat::{ConversationRecord, MessageRole};
use zeny_types::error::ReviewError;
use zeny_types::id::{AvatarId, ConversationId};

use super::output::{self, format_timestamp, spinner, truncate};
use super::parse_id;
use crate::state::AppState;

fn print_transcript(record: &ConversationRecord) {
    println!();
    println!(
        "  {} {}",
        style(&record.id).cyan().bold(),
        style(format_timestamp(&record.started_at)).dim()
    );
    for message in &record.messages {
        let label = match message.role {
            MessageRole::Visitor => style("visitor").green(),
            MessageRole::Avatar => style("avatar").cyan(),
            MessageRole::System => style("system").yellow(),
        };
        println!("  {} {}", label.bold(), message.content);
    }
    if let Some(summary) = &record.summary {
        println!("  {} {}", style("summary").magenta().bold(), style(summary).dim());
    }
}

pub async fn list_conversations(
    state: &AppState,
    avatar_id: &str,
    transcript: bool,
    json: bool,
) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let review = state.review();

    let progress = spinner("Loading conversations...");
    let loaded = review.select_avatar(avatar_id.clone()).await;
    progress.finish_and_clear();
    loaded?;

    let conversations = review.conversations();
    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        output::info(&format!("No conversations for avatar {avatar_id} yet."));
        return Ok(());
    }

    if transcript {
        for record in &conversations {
            print_transcript(record);
        }
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Opening").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
    ]);

    for record in &conversations {
        let summary_cell = match &record.summary {
            Some(summary) => Cell::new(truncate(summary, 40)),
            None => Cell::new("—").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(record.id.as_str()).fg(Color::Cyan),
            Cell::new(format_timestamp(&record.started_at)).fg(Color::DarkGrey),
            Cell::new(record.messages.len()),
            Cell::new(truncate(record.opening_line().unwrap_or(""), 40)),
            summary_cell,
        ]);
    }

    let unsummarized = conversations.iter().filter(|c| !c.has_summary()).count();
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}, {} without a summary",
        style(conversations.len()).bold(),
        if conversations.len() == 1 { "" } else { "s" },
        unsummarized
    );
    if unsummarized > 0 {
        println!(
            "  Summarize one with: {}",
            style(format!("zeny summarize {avatar_id} <conversation-id>")).yellow()
        );
    }
    println!();
    Ok(())
}

pub async fn summarize(
    state: &AppState,
    avatar_id: &str,
    conversation_id: &str,
    json: bool,
) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let conversation_id: ConversationId = parse_id(conversation_id)?;
    let review = state.review();

    let progress = spinner("Loading conversations...");
    let loaded = review.select_avatar(avatar_id).await;
    progress.set_message("Summarizing...");
    let summarized = match loaded {
        Ok(_) => review.summarize(&conversation_id).await,
        Err(e) => Err(e),
    };
    progress.finish_and_clear();

    let summary = match summarized {
        Ok(summary) => summary,
        Err(ReviewError::AlreadySummarized(_)) => {
            let existing = review
                .conversation(&conversation_id)
                .and_then(|c| c.summary)
                .unwrap_or_default();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "conversation_id": conversation_id,
                        "summary": existing,
                        "generated": false,
                    })
                );
            } else {
                output::info("This conversation already has a summary.");
                println!("  {}", existing);
                println!();
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "conversation_id": conversation_id,
                "summary": summary,
                "generated": true,
            })
        );
        return Ok(());
    }

    output::success(&format!("Summary for {}:", style(&conversation_id).cyan()));
    println!("  {summary}");
    println!();
    Ok(())
}
