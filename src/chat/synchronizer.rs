//! Session and case synchronization for the customer chat
//!
//! The [`Synchronizer`] owns the local view of a chat: the session id,
//! the active case and its status, the message log, and pending notices.
//! It reconciles that view with the backend through two paths:
//!
//! - direct interaction ([`Synchronizer::send_user_message`],
//!   [`Synchronizer::upload_photo`]), whose responses flow into
//!   [`Synchronizer::apply_case_update`]
//! - background polling, whose responses flow into
//!   [`Synchronizer::apply_poll_update`]
//!
//! Only the session id and the active-case pointer are persisted. The
//! pointer is removed exactly when the case closes, whether the backend
//! reports `closed` or a final reply shows up.
//!
//! Backend failures never escape these operations. They are logged and
//! turned into [`Notice`]s, and the synchronizer stays usable.

use std::sync::Arc;

use crate::api::{BackendApi, CasePublicStatus, ChatMessageRequest, NextAction, PhotoUpload};
use crate::chat::message::{Message, MessageLog};
use crate::chat::notice::{Notice, Notices};
use crate::chat::order_id::order_id_for_request;
use crate::chat::status::{is_expected_transition, CaseStatus};
use crate::storage::SessionStore;

/// Greeting for a brand new session
pub const WELCOME_MESSAGE: &str = "Hello! I'm your Returns & Warranty Assistant. I can help you with returns, exchanges, and warranty claims. How can I assist you today?";

/// Greeting for a restored session
pub const WELCOME_BACK_MESSAGE: &str =
    "Welcome back! How can I help you with your return or warranty request today?";

/// Banner shown while the customer must upload photos
pub const PHOTOS_NEEDED_BANNER: &str = "Please upload photos to continue.";

/// Banner shown while a case is under review
pub const UNDER_REVIEW_BANNER: &str = "Your case is under review. You'll receive an update here.";

/// Why a message was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    /// The message was blank
    EmptyMessage,
    /// No session exists (session creation failed)
    NoSession,
    /// A case is still open for this session
    CaseActive,
}

/// Result of [`Synchronizer::send_user_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The backend replied; `case_id` is set when the reply opened a case
    Sent {
        /// Case opened or continued by the reply
        case_id: Option<String>,
    },
    /// Nothing was sent or appended
    Rejected(SendRejection),
    /// The user message was appended but the backend call failed
    Failed,
}

/// Result of applying one poll response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The response did not concern the live case
    Ignored,
    /// The case is still open; carries the status if one was reported
    Updated(Option<CaseStatus>),
    /// The case closed; `reply_appended` is false for a duplicate reply or
    /// a close without reply
    Closed {
        /// A final reply was appended to the log
        reply_appended: bool,
    },
}

impl PollOutcome {
    /// `true` when no further polls are needed for this case
    pub fn stops_polling(&self) -> bool {
        !matches!(self, PollOutcome::Updated(_))
    }
}

/// Local chat state reconciled with the backend
pub struct Synchronizer {
    api: Arc<dyn BackendApi>,
    store: Arc<dyn SessionStore>,
    session_id: Option<String>,
    case_id: Option<String>,
    case_status: Option<CaseStatus>,
    closed_case_id: Option<String>,
    next_actions: Vec<NextAction>,
    messages: MessageLog,
    notices: Notices,
}

impl Synchronizer {
    /// Create a synchronizer; call [`Synchronizer::initialize`] before use
    pub fn new(api: Arc<dyn BackendApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            session_id: None,
            case_id: None,
            case_status: None,
            closed_case_id: None,
            next_actions: Vec::new(),
            messages: MessageLog::new(),
            notices: Notices::default(),
        }
    }

    /// Restore the persisted session or start a new one
    ///
    /// A restored session keeps its active case (status unknown until the
    /// next poll) and greets the customer with a welcome-back message; no
    /// history is fetched. Without a persisted session a new one is
    /// requested from the backend. A failed request leaves the
    /// synchronizer without a session and queues a notice.
    pub async fn initialize(&mut self) {
        self.messages.clear();
        self.case_id = None;
        self.case_status = None;
        self.closed_case_id = None;
        self.next_actions.clear();

        let persisted = self.store.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read stored session: {}", e);
            None
        });

        match persisted {
            Some(session_id) => {
                tracing::info!("Restored chat session {}", session_id);
                self.case_id = self
                    .store
                    .load_active_case(&session_id)
                    .unwrap_or_else(|e| {
                        tracing::warn!("Failed to read stored active case: {}", e);
                        None
                    });
                if let Some(case_id) = &self.case_id {
                    tracing::info!("Resuming active case {}", case_id);
                }
                self.session_id = Some(session_id);
                self.messages.push(Message::assistant(WELCOME_BACK_MESSAGE));
            }
            None => {
                self.start_new_session("Unable to start chat session. Please try again.")
                    .await;
            }
        }
    }

    async fn start_new_session(&mut self, failure_description: &str) -> bool {
        match self.api.start_session().await {
            Ok(started) => {
                if let Err(e) = self.store.save(&started.session_id) {
                    tracing::warn!("Failed to persist session id: {}", e);
                }
                tracing::info!("Started chat session {}", started.session_id);
                self.session_id = Some(started.session_id);
                self.messages.push(Message::assistant(WELCOME_MESSAGE));
                true
            }
            Err(e) => {
                tracing::error!("Failed to start chat session: {}", e);
                self.notices
                    .push(Notice::error("Connection failed", Some(failure_description)));
                false
            }
        }
    }

    /// Send a customer message
    ///
    /// Rejected without any network call when the text is blank, when no
    /// session exists, or while a case is active. Otherwise the message is
    /// appended first, then sent with the normalized order number. The
    /// user message stays in the log even if the send fails.
    pub async fn send_user_message(
        &mut self,
        text: &str,
        order_id_hint: Option<&str>,
        wants_store_credit: bool,
    ) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected(SendRejection::EmptyMessage);
        }
        let Some(session_id) = self.session_id.clone() else {
            return SendOutcome::Rejected(SendRejection::NoSession);
        };
        if self.is_case_active() {
            tracing::debug!("Ignoring message while case {:?} is active", self.case_id);
            return SendOutcome::Rejected(SendRejection::CaseActive);
        }

        let request = ChatMessageRequest {
            message: text.to_string(),
            order_id: order_id_for_request(order_id_hint),
            wants_store_credit,
        };

        self.messages.push(Message::user(text));

        match self.api.send_message(&session_id, &request).await {
            Ok(response) => {
                self.messages
                    .push(Message::assistant(response.assistant_message));
                self.apply_case_update(response.case_id.as_deref(), response.status);
                SendOutcome::Sent {
                    case_id: response.case_id,
                }
            }
            Err(e) => {
                tracing::error!("Failed to send message: {}", e);
                self.notices.push(Notice::error(
                    "We couldn't generate a response. Please try again.",
                    None,
                ));
                SendOutcome::Failed
            }
        }
    }

    /// Record a case id and/or status observed from the backend
    ///
    /// A case id different from the current one starts a fresh case and
    /// is persisted as the session's active case. A `closed` status runs
    /// the close cleanup. Both the send path and the poll path end up
    /// here.
    pub fn apply_case_update(&mut self, case_id: Option<&str>, status: Option<CaseStatus>) {
        if let Some(case_id) = case_id {
            if self.closed_case_id.as_deref() == Some(case_id) {
                tracing::warn!("Ignoring update for closed case {}", case_id);
                return;
            }
            if self.case_id.as_deref() != Some(case_id) {
                tracing::info!("Tracking case {}", case_id);
                self.case_status = None;
                self.next_actions.clear();
                self.case_id = Some(case_id.to_string());
            }
            if let Some(session_id) = &self.session_id {
                if let Err(e) = self.store.save_active_case(session_id, case_id) {
                    tracing::warn!("Failed to persist active case: {}", e);
                }
            }
        }

        let Some(status) = status else {
            return;
        };

        if self.case_id.is_some() && !is_expected_transition(self.case_status, status) {
            tracing::warn!(
                "Unexpected case transition {:?} -> {}",
                self.case_status,
                status
            );
        }

        if status.is_terminal() {
            self.close_case();
        } else {
            self.case_status = Some(status);
        }
    }

    /// Apply a public status response for `case_id`
    ///
    /// Responses for any case other than the live one are ignored. A final
    /// reply is appended at most once and closes the case; a `closed`
    /// status without a reply closes it without appending anything.
    pub fn apply_poll_update(&mut self, case_id: &str, update: &CasePublicStatus) -> PollOutcome {
        if self.case_id.as_deref() != Some(case_id) {
            tracing::debug!("Ignoring stale status for case {}", case_id);
            return PollOutcome::Ignored;
        }

        if let Some(reply) = update
            .final_customer_reply
            .as_deref()
            .filter(|r| !r.is_empty())
        {
            let reply_appended = self.messages.append_once(Message::assistant(reply));
            if !reply_appended {
                tracing::debug!("Final reply for case {} already delivered", case_id);
            }
            self.next_actions = update.next_actions.clone().unwrap_or_default();
            self.close_case();
            return PollOutcome::Closed { reply_appended };
        }

        match update.status {
            Some(CaseStatus::Closed) => {
                self.close_case();
                PollOutcome::Closed {
                    reply_appended: false,
                }
            }
            status => {
                self.apply_case_update(None, status);
                PollOutcome::Updated(status)
            }
        }
    }

    /// Fetch and apply the live case's public status once
    ///
    /// Fetch failures are logged and dropped; the next poll retries.
    pub async fn poll_case_status(&mut self) -> PollOutcome {
        let Some(case_id) = self.case_id.clone() else {
            return PollOutcome::Ignored;
        };
        match self.api.case_public_status(&case_id).await {
            Ok(update) => self.apply_poll_update(&case_id, &update),
            Err(e) => {
                tracing::debug!("Status poll for case {} failed: {}", case_id, e);
                PollOutcome::Updated(self.case_status)
            }
        }
    }

    fn close_case(&mut self) {
        if let Some(case_id) = self.case_id.take() {
            tracing::info!("Case {} closed", case_id);
            self.closed_case_id = Some(case_id);
        }
        if let Some(session_id) = &self.session_id {
            if let Err(e) = self.store.clear_active_case(session_id) {
                tracing::warn!("Failed to clear active case: {}", e);
            }
        }
        self.case_status = Some(CaseStatus::Closed);
    }

    /// Upload photo evidence for the live case
    ///
    /// Returns the stored photo URL. On success the case moves to human
    /// review. Invalid files are rejected before any network call.
    pub async fn upload_photo(&mut self, file_name: &str, bytes: Vec<u8>) -> Option<String> {
        let Some(case_id) = self.case_id.clone() else {
            self.notices.push(Notice::error(
                "No active case",
                Some("Describe your issue first so we can open a case"),
            ));
            return None;
        };

        let photo = match PhotoUpload::from_bytes(file_name, bytes) {
            Ok(photo) => photo,
            Err(e) => {
                tracing::debug!("Rejected photo {}: {}", file_name, e);
                self.notices.push(Notice::error(
                    "Invalid file type",
                    Some("Please upload a JPG, PNG, or WebP image"),
                ));
                return None;
            }
        };

        match self.api.upload_photo(&case_id, photo).await {
            Ok(uploaded) => {
                self.notices.push(Notice::info(
                    "Photo uploaded",
                    Some("Your photo has been sent for review"),
                ));
                if self.case_id.as_deref() == Some(case_id.as_str()) {
                    self.apply_case_update(None, Some(CaseStatus::ReadyForHumanReview));
                }
                Some(uploaded.photo_url)
            }
            Err(e) => {
                tracing::error!("Failed to upload photo: {}", e);
                self.notices
                    .push(Notice::error("Upload failed", Some("Please try again")));
                None
            }
        }
    }

    /// Discard the session and start a new one
    ///
    /// Always requests a fresh session id, even when the current one is
    /// still valid.
    pub async fn reset_session(&mut self) -> bool {
        if let Some(session_id) = &self.session_id {
            if let Err(e) = self.store.clear_active_case(session_id) {
                tracing::warn!("Failed to clear active case: {}", e);
            }
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }

        self.session_id = None;
        self.case_id = None;
        self.case_status = None;
        self.closed_case_id = None;
        self.next_actions.clear();
        self.messages.clear();

        self.start_new_session("Unable to start new session").await
    }

    /// Current session id
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Live case id
    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }

    /// Last observed case status
    pub fn case_status(&self) -> Option<CaseStatus> {
        self.case_status
    }

    /// Follow-up actions delivered with the last final reply
    pub fn next_actions(&self) -> &[NextAction] {
        &self.next_actions
    }

    /// Message log
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Take pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// `true` while a case is set and not closed
    pub fn is_case_active(&self) -> bool {
        self.case_id.is_some() && self.case_status != Some(CaseStatus::Closed)
    }

    /// `true` when the customer may type a new message
    pub fn input_enabled(&self) -> bool {
        self.session_id.is_some() && !self.is_case_active()
    }

    /// `true` when the photo upload affordance should be shown
    pub fn shows_photo_upload(&self) -> bool {
        self.case_id.is_some() && self.case_status == Some(CaseStatus::NeedsCustomerPhotos)
    }

    /// Banner explaining why input is disabled
    pub fn banner(&self) -> Option<&'static str> {
        if !self.is_case_active() {
            return None;
        }
        if self.case_status == Some(CaseStatus::NeedsCustomerPhotos) {
            Some(PHOTOS_NEEDED_BANNER)
        } else {
            Some(UNDER_REVIEW_BANNER)
        }
    }
}
