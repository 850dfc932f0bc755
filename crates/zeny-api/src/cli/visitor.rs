//! `zeny visitor` -- show the persistent visitor identity.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn show_visitor(state: &AppState, json: bool) -> Result<()> {
    let visitor_id = state.identity.get_or_create().await;
    let persistent = state.identity.kv().is_persistent();

    if json {
        let out = serde_json::json!({
            "visitor_id": visitor_id,
            "namespace": state.config.storage_namespace,
            "persistent": persistent,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Visitor:").bold(), style(&visitor_id).cyan());
    println!(
        "  {}  {}",
        style("Namespace:").bold(),
        style(&state.config.storage_namespace).dim()
    );
    if !persistent {
        println!(
            "  {}",
            style("Local storage unavailable; this identity lasts for this run only.").yellow()
        );
    }
    println!();
    Ok(())
}
