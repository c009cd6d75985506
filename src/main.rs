//! Ecomdesk - Returns & warranty support desk CLI
//!
#![doc = "Ecomdesk - Returns & warranty support desk CLI"]
#![doc = "Main entry point for the Ecomdesk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecomdesk::cli::{Cli, Commands, PhotoCommand, SessionCommand};
use ecomdesk::commands;
use ecomdesk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            order_id,
            store_credit,
        } => {
            tracing::info!("Starting customer chat");
            if let Some(o) = &order_id {
                tracing::debug!("Using order number: {}", o);
            }
            if store_credit {
                tracing::debug!("Store credit preferred");
            }

            commands::chat::run_chat(config, order_id, store_credit).await?;
            Ok(())
        }
        Commands::Session { command } => {
            tracing::info!("Starting session command");
            match command {
                SessionCommand::Show => commands::session::show_session(config).await?,
                SessionCommand::Reset => commands::session::reset_session(config).await?,
            }
            Ok(())
        }
        Commands::Cases {
            username,
            password,
            command,
        } => {
            tracing::info!("Starting case review command");
            commands::cases::run_cases(config, username, password, command).await?;
            Ok(())
        }
        Commands::Photo { command } => {
            tracing::info!("Starting photo command");
            match command {
                PhotoCommand::Upload { path } => {
                    commands::photo::upload_photo(config, &path).await?;
                }
            }
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ecomdesk=debug"
    } else {
        "ecomdesk=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
