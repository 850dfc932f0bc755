//! Zeny CLI entry point.
//!
//! Binary name: `zeny`
//!
//! Parses CLI arguments, initializes tracing and client state, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use zeny_types::avatar::UpdateAvatarRequest;

use cli::{AvatarCommand, Cli, Commands, DocumentCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,zeny=debug",
        _ => "trace",
    };
    zeny_observe::tracing_setup::init_tracing(filter, cli.log_json, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    zeny_observe::tracing_setup::shutdown_tracing();

    if let Err(e) = result {
        cli::output::failure(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "zeny", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.api_url.clone()).await?;
    let json = cli.json;

    match cli.command {
        Commands::Chat { avatar_id } => {
            cli::chat::loop_runner::run_chat_loop(&state, &avatar_id).await?;
        }

        Commands::Visitor => {
            cli::visitor::show_visitor(&state, json).await?;
        }

        Commands::Status => {
            cli::status::status(&state, json).await?;
        }

        Commands::Avatars { action } => match action {
            AvatarCommand::List => cli::avatar::list_avatars(&state, json).await?,
            AvatarCommand::Show { avatar_id } => {
                cli::avatar::show_avatar(&state, &avatar_id, json).await?;
            }
            AvatarCommand::Create { name, personality } => {
                cli::avatar::create_avatar(&state, name, personality, json).await?;
            }
            AvatarCommand::Update {
                avatar_id,
                name,
                personality,
                active,
            } => {
                let request = UpdateAvatarRequest {
                    name,
                    personality_description: personality,
                    is_active: active,
                };
                cli::avatar::update_avatar(&state, &avatar_id, request, json).await?;
            }
            AvatarCommand::Delete { avatar_id, force } => {
                cli::avatar::delete_avatar(&state, &avatar_id, force, json).await?;
            }
        },

        Commands::Docs { action } => match action {
            DocumentCommand::List { avatar_id } => {
                cli::document::list_documents(&state, &avatar_id, json).await?;
            }
            DocumentCommand::Upload { avatar_id, path } => {
                cli::document::upload_document(&state, &avatar_id, &path, json).await?;
            }
            DocumentCommand::Delete {
                document_id,
                avatar_id,
                force,
            } => {
                cli::document::delete_document(&state, &document_id, &avatar_id, force, json)
                    .await?;
            }
        },

        Commands::Conversations {
            avatar_id,
            transcript,
        } => {
            cli::conversation::list_conversations(&state, &avatar_id, transcript, json).await?;
        }

        Commands::Summarize {
            avatar_id,
            conversation_id,
        } => {
            cli::conversation::summarize(&state, &avatar_id, &conversation_id, json).await?;
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}
