//! Special commands parser for the interactive customer chat
//!
//! Lines starting with `/` (plus bare `exit`/`quit`) are commands for the
//! chat client itself and are never sent to the backend. Command names are
//! case-insensitive; arguments keep their case so file paths work.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands handled by the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Discard the session and start a new conversation
    NewSession,

    /// Show session, case, and status
    ShowStatus,

    /// Upload a photo for the active case
    UploadPhoto(PathBuf),

    /// Set (or with `None`, clear) the order number attached to messages
    SetOrder(Option<String>),

    /// Toggle the store credit preference
    SetStoreCredit(bool),

    /// Display help information
    Help,

    /// Leave the chat
    Exit,

    /// Not a command; send the text as a message
    None,
}

/// Parse a line of input into a [`SpecialCommand`]
///
/// # Examples
///
/// ```
/// use ecomdesk::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(
///     parse_special_command("my blender is broken").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" | "/reset" => Ok(SpecialCommand::NewSession),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/photo" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/photo".to_string(),
            usage: "/photo <path>".to_string(),
        }),
        "/photo" => Ok(SpecialCommand::UploadPhoto(PathBuf::from(arg))),

        "/order" if arg.is_empty() => Ok(SpecialCommand::SetOrder(None)),
        "/order" => Ok(SpecialCommand::SetOrder(Some(arg.to_string()))),

        "/credit" => match arg.to_lowercase().as_str() {
            "on" | "yes" => Ok(SpecialCommand::SetStoreCredit(true)),
            "off" | "no" => Ok(SpecialCommand::SetStoreCredit(false)),
            "" => Err(CommandError::MissingArgument {
                command: "/credit".to_string(),
                usage: "/credit on|off".to_string(),
            }),
            other => Err(CommandError::UnsupportedArgument {
                command: "/credit".to_string(),
                arg: other.to_string(),
            }),
        },

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /new            - Start a new conversation (forgets the current case)
  /status         - Show session, case, and case status
  /photo <path>   - Upload a JPG, PNG, or WebP photo for the active case
  /order <id>     - Attach an order number (e.g. 10003) to your messages
  /order          - Stop attaching an order number
  /credit on|off  - Prefer store credit over a refund
  /help           - Show this help
  exit            - Leave the chat

Anything else is sent to the assistant. While a case is under review the
chat is read-only; updates appear here automatically.
"#
    );
}
