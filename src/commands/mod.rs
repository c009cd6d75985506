/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     — Interactive customer chat
- `session`  — Inspect or reset the stored chat session
- `photo`    — Upload photo evidence for the active case
- `cases`    — Reviewer case listing, decisions, and finalization

Handlers build the HTTP backend and the SQLite session store from
configuration and then delegate to the library components.
*/

use crate::api::http::HttpBackend;
use crate::api::BackendApi;
use crate::chat::Notice;
use crate::config::Config;
use crate::error::Result;
use crate::storage::{SessionStore, SqliteSessionStore};
use std::sync::Arc;

// Special commands parser for the chat REPL
pub mod special_commands;

// Reviewer commands
pub mod cases;

/// Build the backend client from configuration
pub fn build_backend(config: &Config) -> Result<Arc<dyn BackendApi>> {
    Ok(Arc::new(HttpBackend::from_config(&config.api)?))
}

/// Open the session store configured for this run
pub fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    Ok(Arc::new(SqliteSessionStore::open(
        config.storage.path.as_deref(),
    )?))
}

/// Print notices on stderr, colored by level
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{}", notice.colored());
    }
}

// Chat command handler
pub mod chat {
    //! Interactive customer chat handler.
    //!
    //! Restores or starts a session, then runs a readline loop. Plain lines
    //! are sent to the assistant; `/` lines are client commands. While a
    //! case is active a [`CaseWatch`] polls its status and a printer task
    //! writes new messages as they arrive.

    use super::*;
    use crate::chat::message::Message;
    use crate::chat::{CaseWatch, PollOutcome, SendOutcome, SendRejection, Synchronizer};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    /// Start the interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `order_id` - Order number attached to messages, if any
    /// * `store_credit` - Initial store credit preference
    pub async fn run_chat(
        config: Config,
        order_id: Option<String>,
        store_credit: bool,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let api = build_backend(&config)?;
        let store = open_store(&config)?;
        let mut session = ChatSession::new(
            api,
            store,
            config.chat.poll_interval(),
            order_id,
            store_credit,
        );
        session.start().await;

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&session);
        session.flush().await;

        loop {
            let prompt = session.prompt().await;
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => session.send(trimmed).await,
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Help) => print_help(),
                        Ok(SpecialCommand::ShowStatus) => session.print_status().await,
                        Ok(SpecialCommand::NewSession) => session.reset().await,
                        Ok(SpecialCommand::UploadPhoto(path)) => session.upload(&path).await,
                        Ok(SpecialCommand::SetOrder(order)) => {
                            match &order {
                                Some(o) => println!("Order number set to {}\n", o.cyan()),
                                None => println!("Order number cleared\n"),
                            }
                            session.order_id = order;
                        }
                        Ok(SpecialCommand::SetStoreCredit(on)) => {
                            session.store_credit = on;
                            println!(
                                "Store credit preference: {}\n",
                                if on { "on".green() } else { "off".normal() }
                            );
                        }
                        Err(e) => eprintln!("{}\n", e.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        session.stop_watch();
        println!("Goodbye!");
        Ok(())
    }

    /// REPL state around a shared [`Synchronizer`]
    struct ChatSession {
        sync: Arc<Mutex<Synchronizer>>,
        api: Arc<dyn BackendApi>,
        poll_interval: Duration,
        order_id: Option<String>,
        store_credit: bool,
        printed: Arc<AtomicUsize>,
        watch: Option<CaseWatch>,
        printer: Option<JoinHandle<()>>,
    }

    impl ChatSession {
        fn new(
            api: Arc<dyn BackendApi>,
            store: Arc<dyn SessionStore>,
            poll_interval: Duration,
            order_id: Option<String>,
            store_credit: bool,
        ) -> Self {
            Self {
                sync: Arc::new(Mutex::new(Synchronizer::new(api.clone(), store))),
                api,
                poll_interval,
                order_id,
                store_credit,
                printed: Arc::new(AtomicUsize::new(0)),
                watch: None,
                printer: None,
            }
        }

        async fn start(&mut self) {
            self.sync.lock().await.initialize().await;
            self.ensure_watch().await;
        }

        async fn send(&mut self, text: &str) {
            let outcome = self
                .sync
                .lock()
                .await
                .send_user_message(text, self.order_id.as_deref(), self.store_credit)
                .await;

            match outcome {
                SendOutcome::Rejected(SendRejection::CaseActive) => {
                    let sync = self.sync.lock().await;
                    if let Some(banner) = sync.banner() {
                        println!("{}\n", banner.yellow());
                    }
                }
                SendOutcome::Rejected(SendRejection::NoSession) => {
                    eprintln!("{}\n", "No chat session. Type /new to try again.".red());
                }
                _ => {}
            }

            self.flush().await;
            self.ensure_watch().await;
        }

        async fn upload(&mut self, path: &Path) {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("{}\n", format!("Cannot read {}: {}", path.display(), e).red());
                    return;
                }
            };
            let url = self
                .sync
                .lock()
                .await
                .upload_photo(&path.to_string_lossy(), bytes)
                .await;
            if let Some(url) = url {
                tracing::debug!("Photo stored at {}", url);
            }
            self.flush().await;
            self.ensure_watch().await;
        }

        async fn reset(&mut self) {
            self.stop_watch();
            {
                let mut sync = self.sync.lock().await;
                sync.reset_session().await;
                self.printed.store(0, Ordering::SeqCst);
            }
            println!("{}\n", "Started a new conversation".green());
            self.flush().await;
        }

        /// Print messages not shown yet, then pending notices
        async fn flush(&self) {
            let mut sync = self.sync.lock().await;
            print_new_messages(&mut sync, &self.printed);
        }

        /// Make sure a watch is polling the live case
        async fn ensure_watch(&mut self) {
            let case_id = {
                let sync = self.sync.lock().await;
                if !sync.is_case_active() {
                    return;
                }
                sync.case_id().map(str::to_string)
            };
            let Some(case_id) = case_id else {
                return;
            };

            let running = self
                .watch
                .as_ref()
                .is_some_and(|w| w.case_id() == case_id && !w.is_finished());
            if running {
                return;
            }

            self.stop_watch();
            let watch = CaseWatch::spawn(
                self.sync.clone(),
                self.api.clone(),
                case_id,
                self.poll_interval,
            );
            let mut updates = watch.updates();
            let sync = self.sync.clone();
            let printed = self.printed.clone();
            self.printer = Some(tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let outcome = *updates.borrow_and_update();
                    let mut sync = sync.lock().await;
                    print_new_messages(&mut sync, &printed);
                    if matches!(outcome, Some(PollOutcome::Closed { .. })) {
                        println!(
                            "{}\n",
                            "This case is closed. You can start a new request.".green()
                        );
                    }
                }
            }));
            self.watch = Some(watch);
        }

        fn stop_watch(&mut self) {
            if let Some(watch) = self.watch.take() {
                watch.cancel();
            }
            if let Some(printer) = self.printer.take() {
                printer.abort();
            }
        }

        async fn prompt(&self) -> String {
            let sync = self.sync.lock().await;
            if sync.input_enabled() {
                format!("{} ", "you>".cyan().bold())
            } else if sync.shows_photo_upload() {
                format!("{} ", "photo needed>".yellow())
            } else {
                format!("{} ", "waiting>".yellow())
            }
        }

        async fn print_status(&self) {
            let sync = self.sync.lock().await;
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                    Ecomdesk Session Status                   ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");
            println!("Session:      {}", sync.session_id().unwrap_or("none"));
            println!("Case:         {}", sync.case_id().unwrap_or("none"));
            println!(
                "Case status:  {}",
                sync.case_status()
                    .map(|s| s.label().to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            println!(
                "Order:        {}",
                self.order_id.as_deref().unwrap_or("not set")
            );
            println!(
                "Store credit: {}",
                if self.store_credit { "on" } else { "off" }
            );
            println!("Messages:     {}", sync.messages().len());
            if let Some(banner) = sync.banner() {
                println!("\n{}", banner.yellow());
            }
            for action in sync.next_actions() {
                println!("Next action:  {}", action.action);
            }
            println!();
        }
    }

    // Customer lines are already on screen as typed input.
    fn print_new_messages(sync: &mut Synchronizer, printed: &AtomicUsize) {
        let seen = printed.load(Ordering::SeqCst);
        let fresh = sync.messages().since(seen);
        for message in fresh.iter().filter(|m| !m.is_user()) {
            print_message(message);
        }
        printed.store(seen + fresh.len(), Ordering::SeqCst);
        print_notices(&sync.take_notices());
    }

    fn print_message(message: &Message) {
        println!("{} {}\n", "Assistant:".green().bold(), message.content);
    }

    fn print_welcome_banner(session: &ChatSession) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║          Ecomdesk Returns & Warranty Chat - Welcome!         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        if let Some(order) = &session.order_id {
            println!("Order:  {}", order.cyan());
        }
        if session.store_credit {
            println!("Store credit preferred");
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

// Session command handler
pub mod session {
    //! Inspect or reset the locally stored chat session.

    use super::*;
    use crate::chat::Synchronizer;
    use colored::Colorize;

    /// Print the stored session id, active case, and its public status
    pub async fn show_session(config: Config) -> Result<()> {
        let store = open_store(&config)?;
        let Some(session_id) = store.load()? else {
            println!("No stored chat session");
            return Ok(());
        };
        println!("Session:  {}", session_id);

        match store.load_active_case(&session_id)? {
            Some(case_id) => {
                println!("Case:     {}", case_id);
                let api = build_backend(&config)?;
                match api.case_public_status(&case_id).await {
                    Ok(status) => {
                        let label = status
                            .status
                            .map(|s| s.label().to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                        println!("Status:   {}", label);
                        if let Some(reply) = status.final_customer_reply {
                            println!("Reply:    {}", reply);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to fetch status of case {}: {}", case_id, e);
                        println!("Status:   {}", "unavailable".yellow());
                    }
                }
            }
            None => println!("Case:     none"),
        }
        Ok(())
    }

    /// Discard the stored session and start a new one
    pub async fn reset_session(config: Config) -> Result<()> {
        let api = build_backend(&config)?;
        let store = open_store(&config)?;
        let mut sync = Synchronizer::new(api, store);
        let started = sync.reset_session().await;
        print_notices(&sync.take_notices());
        match sync.session_id() {
            Some(session_id) if started => {
                println!("Started new session {}", session_id.green());
                Ok(())
            }
            _ => Err(crate::error::EcomdeskError::Connection(
                "Unable to start new session".to_string(),
            )
            .into()),
        }
    }
}

// Photo command handler
pub mod photo {
    //! Upload photo evidence for the stored session's active case.

    use super::*;
    use crate::chat::Synchronizer;
    use crate::error::EcomdeskError;
    use colored::Colorize;
    use std::path::Path;

    /// Upload the image at `path` for the active case
    pub async fn upload_photo(config: Config, path: &Path) -> Result<()> {
        let store = open_store(&config)?;
        let has_case = match store.load()? {
            Some(session_id) => store.load_active_case(&session_id)?.is_some(),
            None => false,
        };
        if !has_case {
            return Err(EcomdeskError::NoActiveCase.into());
        }

        let bytes = tokio::fs::read(path).await?;
        let api = build_backend(&config)?;
        let mut sync = Synchronizer::new(api, store);
        sync.initialize().await;
        let uploaded = sync.upload_photo(&path.to_string_lossy(), bytes).await;
        print_notices(&sync.take_notices());

        match uploaded {
            Some(url) => {
                println!("Uploaded {}", url.green());
                Ok(())
            }
            None => Err(EcomdeskError::InvalidPhoto(format!(
                "Failed to upload {}",
                path.display()
            ))
            .into()),
        }
    }
}
