//! Training document commands: list, upload, delete.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use zeny_core::registry::view::RegistryView;
use zeny_infra::http::client::HttpApiClient;
use zeny_types::id::{AvatarId, DocumentId};

use super::output::{self, format_timestamp, spinner};
use super::parse_id;
use crate::state::AppState;

/// Load the registry with `avatar_id` selected and its documents fetched.
async fn selected_registry(
    state: &AppState,
    avatar_id: &AvatarId,
) -> Result<RegistryView<HttpApiClient>> {
    let registry = state.registry();
    let progress = spinner("Loading documents...");
    let loaded = async {
        registry.refresh_avatars().await?;
        registry.select(avatar_id).await
    }
    .await;
    progress.finish_and_clear();
    loaded?;
    Ok(registry)
}

pub async fn list_documents(state: &AppState, avatar_id: &str, json: bool) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let registry = selected_registry(state, &avatar_id).await?;
    let documents = registry.documents();

    if json {
        let out: Vec<_> = documents
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "avatar_id": d.avatar_id,
                    "filename": d.filename,
                    "content_type": d.content_type,
                    "uploaded_at": d.uploaded_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if documents.is_empty() {
        output::info(&format!(
            "No training documents. Upload one with: {}",
            style(format!("zeny docs upload {avatar_id} <path>")).yellow()
        ));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Filename").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Uploaded").fg(Color::White),
    ]);
    for document in &documents {
        table.add_row(vec![
            Cell::new(&document.filename).fg(Color::Cyan),
            Cell::new(document.id.as_str()).fg(Color::DarkGrey),
            Cell::new(&document.content_type),
            Cell::new(
                document
                    .uploaded_at
                    .as_ref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "-".to_string()),
            )
            .fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn upload_document(
    state: &AppState,
    avatar_id: &str,
    path: &Path,
    json: bool,
) -> Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let registry = selected_registry(state, &avatar_id).await?;
    let progress = spinner(&format!("Uploading {filename}..."));
    let uploaded = registry.upload_document(&filename, &content).await;
    progress.finish_and_clear();
    let document = uploaded?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "id": document.id,
                "avatar_id": document.avatar_id,
                "filename": document.filename,
                "content_type": document.content_type,
            })
        );
        return Ok(());
    }

    output::success(&format!(
        "Uploaded {} ({}, {} bytes).",
        style(&document.filename).cyan(),
        document.content_type,
        content.len()
    ));
    Ok(())
}

pub async fn delete_document(
    state: &AppState,
    document_id: &str,
    avatar_id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let document_id: DocumentId = parse_id(document_id)?;
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let registry = selected_registry(state, &avatar_id).await?;
    let label = registry
        .documents()
        .into_iter()
        .find(|d| d.id == document_id)
        .map(|d| d.filename)
        .unwrap_or_else(|| document_id.to_string());

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete document '{}'?", style(&label).red().bold()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let progress = spinner(&format!("Deleting {label}..."));
    let deleted = registry.delete_document(&document_id).await;
    progress.finish_and_clear();
    deleted?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "document_id": document_id}));
    } else {
        println!("  {} Document '{}' deleted.", style("✓").red().bold(), label);
    }
    Ok(())
}
