//! Command-line interface definition for Ecomdesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the customer chat, session management, reviewer, and
//! photo upload commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ecomdesk - Returns & warranty support desk
///
/// File returns and warranty claims through chat, and review claims
/// as a human reviewer.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecomdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long, env = "ECOMDESK_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Override the session database path
    #[arg(long)]
    pub session_db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Ecomdesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive customer chat
    Chat {
        /// Order number to attach to messages (e.g. 10003 or ORD-10003)
        #[arg(short, long)]
        order_id: Option<String>,

        /// Prefer store credit over a refund to the original payment
        #[arg(long)]
        store_credit: bool,
    },

    /// Inspect or reset the local chat session
    Session {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Review claims (requires reviewer credentials)
    Cases {
        /// Reviewer username
        #[arg(short, long, env = "ECOMDESK_REVIEWER_USER")]
        username: Option<String>,

        /// Reviewer password
        #[arg(short, long, env = "ECOMDESK_REVIEWER_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Case review subcommand
        #[command(subcommand)]
        command: CasesCommand,
    },

    /// Send photo evidence for the active case
    Photo {
        /// Photo subcommand
        #[command(subcommand)]
        command: PhotoCommand,
    },
}

/// Local session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Show the stored session id and active case
    Show,

    /// Discard the stored session and start a fresh one
    Reset,
}

/// Reviewer subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CasesCommand {
    /// List cases, by default those waiting for human review
    List {
        /// Status filter (e.g. ready_for_human_review, approved, closed)
        #[arg(short, long, default_value = "ready_for_human_review")]
        status: String,

        /// List every case regardless of status
        #[arg(long, conflicts_with = "status")]
        all: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the full record for one case
    Show {
        /// Case identifier
        case_id: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Record a human decision (approved, denied, more_info_requested)
    Decide {
        /// Case identifier
        case_id: String,

        /// Decision to record
        decision: String,

        /// Optional reviewer notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Generate the customer reply and close the case
    Finalize {
        /// Case identifier
        case_id: String,
    },
}

/// Photo subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PhotoCommand {
    /// Upload a JPG, PNG, or WebP image for the active case
    Upload {
        /// Path to the image file
        path: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_base_url: None,
            session_db: None,
            command: Commands::Session {
                command: SessionCommand::Show,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_chat_with_order() {
        let cli = Cli::try_parse_from(["ecomdesk", "chat", "--order-id", "10003", "--store-credit"])
            .unwrap();
        match cli.command {
            Commands::Chat {
                order_id,
                store_credit,
            } => {
                assert_eq!(order_id.as_deref(), Some("10003"));
                assert!(store_credit);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_cases_decide() {
        let cli = Cli::try_parse_from([
            "ecomdesk",
            "cases",
            "--username",
            "reviewer",
            "--password",
            "secret",
            "decide",
            "c1",
            "approved",
            "--notes",
            "photos confirm damage",
        ])
        .unwrap();
        match cli.command {
            Commands::Cases {
                username,
                command:
                    CasesCommand::Decide {
                        case_id,
                        decision,
                        notes,
                    },
                ..
            } => {
                assert_eq!(username.as_deref(), Some("reviewer"));
                assert_eq!(case_id, "c1");
                assert_eq!(decision, "approved");
                assert_eq!(notes.as_deref(), Some("photos confirm damage"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cases_list_default_status() {
        let cli = Cli::try_parse_from(["ecomdesk", "cases", "list"]).unwrap();
        match cli.command {
            Commands::Cases {
                command: CasesCommand::List { status, all, json },
                ..
            } => {
                assert_eq!(status, "ready_for_human_review");
                assert!(!all);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_session_reset() {
        let cli = Cli::try_parse_from(["ecomdesk", "session", "reset"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Session {
                command: SessionCommand::Reset
            }
        ));
    }
}
