//! Welcome banner display for chat sessions.

use console::style;

/// Print the banner shown once the avatar has loaded.
pub fn print_welcome_banner(name: &str, personality: &str, avatar_id: &str, visitor_id: &str) {
    println!();
    println!("  {}", style(name).cyan().bold());
    println!("  {}", style(personality).dim());
    println!();
    println!("  {}   {}", style("Avatar:").bold(), style(avatar_id).dim());
    println!("  {}  {}", style("Visitor:").bold(), style(visitor_id).dim());
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
