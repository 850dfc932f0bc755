//! Avatar management commands: list, show, create, update, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use zeny_types::avatar::{Avatar, UpdateAvatarRequest};
use zeny_types::id::AvatarId;

use super::output::{self, format_timestamp, spinner, truncate};
use super::parse_id;
use crate::state::AppState;

fn status_cell(avatar: &Avatar) -> Cell {
    if avatar.is_active {
        Cell::new("● active").fg(Color::Green)
    } else {
        Cell::new("○ inactive").fg(Color::Yellow)
    }
}

/// List all avatars in a table.
pub async fn list_avatars(state: &AppState, json: bool) -> Result<()> {
    let registry = state.registry();
    let progress = spinner("Loading avatars...");
    let loaded = registry.refresh_avatars().await;
    progress.finish_and_clear();
    loaded?;

    let avatars = registry.avatars();
    if json {
        println!("{}", serde_json::to_string_pretty(&avatars)?);
        return Ok(());
    }

    if avatars.is_empty() {
        println!();
        println!(
            "  {} No avatars yet. Create one with: {}",
            style("i").blue().bold(),
            style("zeny avatars create").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Personality").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for avatar in &avatars {
        let created = avatar
            .created_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&avatar.name).fg(Color::Cyan),
            Cell::new(avatar.id.as_str()).fg(Color::DarkGrey),
            status_cell(avatar),
            Cell::new(truncate(&avatar.personality_description, 50)),
            Cell::new(created).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} avatar{}",
        style(avatars.len()).bold(),
        if avatars.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Show one avatar's profile and its training documents.
pub async fn show_avatar(state: &AppState, avatar_id: &str, json: bool) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let registry = state.registry();

    let progress = spinner("Loading avatar...");
    let loaded = async {
        registry.refresh_avatars().await?;
        registry.select(&avatar_id).await
    }
    .await;
    progress.finish_and_clear();
    loaded?;

    let Some(avatar) = registry.selected() else {
        anyhow::bail!("avatar '{avatar_id}' not found");
    };
    let documents = registry.documents();

    if json {
        let out = serde_json::json!({
            "avatar": avatar,
            "documents": documents
                .iter()
                .map(|d| serde_json::json!({
                    "id": d.id,
                    "filename": d.filename,
                    "content_type": d.content_type,
                    "uploaded_at": d.uploaded_at,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&avatar.name).cyan().bold());
    println!("  {}", style(&avatar.personality_description).dim());
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}      {}", style("ID:").bold(), style(&avatar.id).dim());
    println!(
        "  {}  {}",
        style("Status:").bold(),
        if avatar.is_active {
            style("active").green()
        } else {
            style("inactive").yellow()
        }
    );
    if let Some(created) = &avatar.created_at {
        println!("  {} {}", style("Created:").bold(), format_timestamp(created));
    }
    if let Some(updated) = &avatar.updated_at {
        println!("  {} {}", style("Updated:").bold(), format_timestamp(updated));
    }
    println!();
    println!("  {}", style("── Training Documents ──").dim());
    if documents.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for document in &documents {
        println!(
            "  {} {} {}",
            style("•").dim(),
            document.filename,
            style(format!("({})", document.content_type)).dim()
        );
    }
    println!();
    Ok(())
}

/// Create an avatar, prompting for any field not given as a flag.
pub async fn create_avatar(
    state: &AppState,
    name: Option<String>,
    personality: Option<String>,
    json: bool,
) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Avatar name")
            .interact_text()?,
    };
    let personality = match personality {
        Some(p) => p,
        None => Input::<String>::new()
            .with_prompt("Personality description")
            .interact_text()?,
    };

    let registry = state.registry();
    let progress = spinner("Creating avatar...");
    let created = registry.create_avatar(&name, &personality).await;
    progress.finish_and_clear();
    let avatar = created?;

    if json {
        println!("{}", serde_json::to_string_pretty(&avatar)?);
        return Ok(());
    }

    output::success(&format!("Avatar {} created.", style(&avatar.name).cyan()));
    println!("  {}  {}", style("ID:").bold(), style(&avatar.id).dim());
    println!(
        "  Chat with it: {}",
        style(format!("zeny chat {}", avatar.id)).yellow()
    );
    println!();
    Ok(())
}

pub async fn update_avatar(
    state: &AppState,
    avatar_id: &str,
    request: UpdateAvatarRequest,
    json: bool,
) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let registry = state.registry();

    let progress = spinner("Updating avatar...");
    let updated = registry.update_avatar(&avatar_id, request).await;
    progress.finish_and_clear();
    let avatar = updated?;

    if json {
        println!("{}", serde_json::to_string_pretty(&avatar)?);
        return Ok(());
    }

    output::success(&format!(
        "Avatar {} updated ({}).",
        style(&avatar.name).cyan(),
        if avatar.is_active { "active" } else { "inactive" }
    ));
    Ok(())
}

/// Delete an avatar after confirmation.
pub async fn delete_avatar(state: &AppState, avatar_id: &str, force: bool, json: bool) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let registry = state.registry();
    registry.refresh_avatars().await?;
    let label = registry
        .avatar(&avatar_id)
        .map(|a| a.name)
        .unwrap_or_else(|| avatar_id.to_string());

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete avatar '{}'?",
                style(&label).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let progress = spinner(&format!("Deleting {label}..."));
    let deleted = registry.delete_avatar(&avatar_id).await;
    progress.finish_and_clear();
    deleted?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "avatar_id": avatar_id}));
    } else {
        println!("  {} Avatar '{}' deleted.", style("✓").red().bold(), label);
    }
    Ok(())
}
