//! CLI command definitions for the `zeny` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `zeny avatars list`, `zeny docs upload`).

pub mod avatar;
pub mod chat;
pub mod conversation;
pub mod document;
pub mod output;
pub mod status;
pub mod visitor;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with AI avatars and manage them from the terminal.
#[derive(Parser)]
#[command(name = "zeny", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend API base URL (overrides config.toml).
    #[arg(long, global = true, env = "ZENY_API_URL")]
    pub api_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with an avatar.
    Chat {
        /// Avatar ID to chat with.
        avatar_id: String,
    },

    /// Show this device's visitor identity.
    Visitor,

    /// Show client configuration and backend reachability.
    Status,

    /// Manage avatars (list, show, create, update, delete).
    #[command(alias = "avatar")]
    Avatars {
        #[command(subcommand)]
        action: AvatarCommand,
    },

    /// Manage an avatar's training documents.
    #[command(alias = "doc")]
    Docs {
        #[command(subcommand)]
        action: DocumentCommand,
    },

    /// List an avatar's conversations.
    #[command(alias = "convos")]
    Conversations {
        /// Avatar whose conversations to list.
        avatar_id: String,

        /// Print every conversation's full transcript.
        #[arg(long)]
        transcript: bool,
    },

    /// Generate a summary for one conversation.
    Summarize {
        /// Avatar the conversation belongs to.
        avatar_id: String,

        /// Conversation to summarize.
        conversation_id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AvatarCommand {
    /// List all avatars.
    #[command(alias = "ls")]
    List,

    /// Show one avatar with its training documents.
    Show {
        avatar_id: String,
    },

    /// Create an avatar. Missing fields are prompted for.
    Create {
        #[arg(long)]
        name: Option<String>,

        /// Personality description used to prompt the avatar.
        #[arg(long)]
        personality: Option<String>,
    },

    /// Update an avatar's name, personality, or active flag.
    Update {
        avatar_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        personality: Option<String>,

        /// Set whether visitors can chat with the avatar.
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete an avatar.
    #[command(alias = "rm")]
    Delete {
        avatar_id: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommand {
    /// List an avatar's training documents.
    #[command(alias = "ls")]
    List {
        avatar_id: String,
    },

    /// Upload a file as a training document.
    Upload {
        avatar_id: String,

        /// File to upload.
        path: PathBuf,
    },

    /// Delete a training document.
    #[command(alias = "rm")]
    Delete {
        document_id: String,

        /// Avatar the document belongs to.
        #[arg(long = "avatar")]
        avatar_id: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Parse a command-line identifier, rejecting blank input.
pub fn parse_id<T: FromStr<Err = String>>(raw: &str) -> anyhow::Result<T> {
    raw.parse::<T>().map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_id_rejects_blank() {
        assert!(parse_id::<zeny_types::id::AvatarId>("  ").is_err());
        let id: zeny_types::id::AvatarId = parse_id(" av-1 ").unwrap();
        assert_eq!(id.as_str(), "av-1");
    }

    #[test]
    fn test_parse_doc_delete() {
        let cli = Cli::parse_from(["zeny", "docs", "delete", "doc-1", "--avatar", "av-1"]);
        match cli.command {
            Commands::Docs {
                action:
                    DocumentCommand::Delete {
                        document_id,
                        avatar_id,
                        force,
                    },
            } => {
                assert_eq!(document_id, "doc-1");
                assert_eq!(avatar_id, "av-1");
                assert!(!force);
            }
            _ => panic!("expected docs delete"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "zeny",
            "conversations",
            "av-1",
            "--transcript",
            "--json",
            "--api-url",
            "http://backend:8001/api",
        ]);
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://backend:8001/api"));
        assert!(matches!(
            cli.command,
            Commands::Conversations { transcript: true, .. }
        ));
    }
}
