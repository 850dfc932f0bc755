//! `zeny status` -- client configuration and backend health.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let health = state.api.health().await;
    let persistent = state.identity.kv().is_persistent();

    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "api_base_url": state.api.base_url(),
            "backend_reachable": health.is_ok(),
            "backend_error": health.as_ref().err().map(|e| e.to_string()),
            "data_dir": state.data_dir.display().to_string(),
            "persistent_storage": persistent,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let check_mark = |ok: bool| {
        if ok {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };

    println!();
    println!("  {} Zeny v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();
    println!("  {}", style("── Backend ──").dim());
    println!("  URL:       {}", style(state.api.base_url()).cyan());
    match &health {
        Ok(_) => println!("  {} reachable", check_mark(true)),
        Err(e) => println!("  {} unreachable: {}", check_mark(false), style(e).dim()),
    }
    println!();
    println!("  {}", style("── Local ──").dim());
    println!("  Data dir:  {}", style(state.data_dir.display()).dim());
    println!("  {} persistent visitor storage", check_mark(persistent));
    println!();
    Ok(())
}
