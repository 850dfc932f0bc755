//! Main chat loop orchestration.
//!
//! Resolves the visitor identity, mounts a widget for the avatar, then
//! forwards input lines as turns until the visitor exits. Input typed while
//! a reply is pending is offered to the widget too, which refuses it.

use console::style;
use tracing::debug;

use zeny_core::chat::session::SubmitRejection;
use zeny_core::chat::state::SessionState;
use zeny_core::chat::widget::{ChatWidget, SendOutcome};
use zeny_infra::http::client::HttpApiClient;
use zeny_types::chat::{Message, MessageRole};
use zeny_types::id::AvatarId;

use crate::cli::output::spinner;
use crate::cli::parse_id;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

fn print_message(message: &Message, avatar_name: &str) {
    match message.role {
        MessageRole::Avatar => {
            println!("\n  {} {}\n", style(avatar_name).cyan().bold(), message.content);
        }
        MessageRole::System => {
            println!("\n  {} {}\n", style("!").yellow().bold(), style(&message.content).yellow());
        }
        MessageRole::Visitor => {
            println!("  {} {}", style("You").green().bold(), message.content);
        }
    }
}

fn print_rejection(rejection: SubmitRejection) {
    let text = match rejection {
        SubmitRejection::Blank => return,
        SubmitRejection::Busy => "Still waiting for the previous reply.",
        SubmitRejection::NotReady => "The avatar is still loading.",
        SubmitRejection::Unavailable => "This avatar is not available.",
        SubmitRejection::Closed => "The session has ended.",
    };
    println!("  {}", style(text).dim());
}

/// Send one turn while still listening for input.
///
/// Lines typed meanwhile are submitted to the widget, which rejects them as
/// busy. Ctrl+C or Ctrl+D unmounts the widget and abandons the reply.
async fn send_turn(
    widget: &ChatWidget<HttpApiClient>,
    input: &mut ChatInput,
    text: &str,
) -> SendOutcome {
    let progress = spinner("thinking...");
    let send = widget.send(text);
    tokio::pin!(send);

    let outcome = loop {
        tokio::select! {
            outcome = &mut send => break outcome,
            event = input.read_line() => match event {
                InputEvent::Message(extra) => {
                    if let SendOutcome::Rejected(rejection) = widget.send(&extra).await {
                        progress.suspend(|| print_rejection(rejection));
                    }
                }
                InputEvent::Interrupted | InputEvent::Eof => {
                    debug!("Abandoning pending reply");
                    widget.unmount();
                    break (&mut send).await;
                }
            },
        }
    };

    progress.finish_and_clear();
    outcome
}

/// Run the interactive chat loop for an avatar.
pub async fn run_chat_loop(state: &AppState, avatar_id: &str) -> anyhow::Result<()> {
    let avatar_id: AvatarId = parse_id(avatar_id)?;
    let visitor_id = state.identity.get_or_create().await;

    let progress = spinner("Loading avatar...");
    let widget = ChatWidget::mount(state.api.clone(), avatar_id.clone(), visitor_id.clone()).await;
    progress.finish_and_clear();

    let Some(avatar) = widget.avatar().filter(|_| widget.state() == SessionState::Ready) else {
        for message in widget.messages() {
            print_message(&message, "");
        }
        return Ok(());
    };

    print_welcome_banner(
        &avatar.name,
        &avatar.personality_description,
        avatar_id.as_str(),
        visitor_id.as_str(),
    );
    for message in widget.messages() {
        print_message(&message, &avatar.name);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::History => {
                    println!();
                    for message in widget.messages() {
                        print_message(&message, &avatar.name);
                    }
                }
                ChatCommand::Info => {
                    let conversation = widget
                        .conversation_id()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "(not started)".to_string());
                    println!();
                    println!("  {} {}", style("Conversation:").bold(), style(conversation).dim());
                    println!("  {}      {}", style("Visitor:").bold(), style(&visitor_id).dim());
                    println!();
                }
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        let seen = widget.messages().len();
        match send_turn(&widget, &mut chat_input, &text).await {
            SendOutcome::Replied | SendOutcome::Failed => {
                for message in widget.messages_since(seen) {
                    if message.role != MessageRole::Visitor {
                        print_message(&message, &avatar.name);
                    }
                }
            }
            SendOutcome::Rejected(SubmitRejection::Blank) => {}
            SendOutcome::Rejected(rejection) => {
                print_rejection(rejection);
                if !widget.accepts_input() && !widget.is_pending() {
                    break;
                }
            }
            SendOutcome::Dropped => {
                println!("\n  {}", style("Reply abandoned.").dim());
                break;
            }
        }
    }

    widget.unmount();
    println!("\n  {}", style("Session ended.").dim());
    if let Some(conversation_id) = widget.conversation_id() {
        println!("  {} {}", style("Conversation:").bold(), style(conversation_id).dim());
    }
    Ok(())
}
