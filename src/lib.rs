//! Ecomdesk - Returns & warranty support desk library
//!
//! This library provides the client side of a returns and warranty claims
//! desk: a customer chat that keeps its session and case in sync with the
//! claims backend, and a reviewer desk for human decisions.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend API trait, HTTP client, and an in-process fake
//! - `chat`: Message log, case lifecycle, synchronizer, and status polling
//! - `reviewer`: Reviewer credentials and case review operations
//! - `storage`: Persisted session id and active-case pointer
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ecomdesk::api::http::HttpBackend;
//! use ecomdesk::chat::Synchronizer;
//! use ecomdesk::storage::SqliteSessionStore;
//! use ecomdesk::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let api = Arc::new(HttpBackend::from_config(&config.api)?);
//!     let store = Arc::new(SqliteSessionStore::open(config.storage.path.as_deref())?);
//!     let mut sync = Synchronizer::new(api, store);
//!     sync.initialize().await;
//!     sync.send_user_message("My blender arrived broken", Some("10003"), false).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod reviewer;
pub mod storage;

// Re-export commonly used types
pub use api::BackendApi;
pub use chat::Synchronizer;
pub use config::Config;
pub use error::{EcomdeskError, Result};
pub use reviewer::ReviewerDesk;
pub use storage::SessionStore;

#[cfg(test)]
pub mod test_utils;
