//! In-process fake backend for unit and integration tests
//!
//! [`FakeBackend`] implements [`BackendApi`] from scripted responses and
//! records every call it receives, so tests can assert both on the state
//! the synchronizer ends up in and on which network calls were made.
//!
//! Public status responses are queued per case. When only one response is
//! left it keeps being returned, which models a backend whose status does
//! not change between poll ticks.
//!
//! # Example
//!
//! ```
//! use ecomdesk::api::fake::{FakeBackend, Call};
//! use ecomdesk::api::BackendApi;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fake = FakeBackend::new();
//! fake.push_session_id("s-1");
//! let started = fake.start_session().await.unwrap();
//! assert_eq!(started.session_id, "s-1");
//! assert_eq!(fake.calls(), vec![Call::StartSession]);
//! # }
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use super::{
    BackendApi, CasePublicStatus, CaseRecord, ChatMessageRequest, ChatResponse,
    ChatStartResponse, DecisionResponse, FinalizeResponse, HumanDecision, NextAction,
    PhotoUpload, PhotoUploadResponse, ReviewerCredentials,
};
use crate::chat::status::CaseStatus;
use crate::error::{EcomdeskError, Result};

/// A call received by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `POST /chat/start`
    StartSession,
    /// `POST /chat/{session_id}`
    SendMessage {
        /// Session the message was sent on
        session_id: String,
        /// Request body
        request: ChatMessageRequest,
    },
    /// `GET /cases/{id}/public`
    CasePublicStatus {
        /// Polled case
        case_id: String,
    },
    /// `POST /cases/{id}/photos`
    UploadPhoto {
        /// Target case
        case_id: String,
        /// Uploaded file name
        file_name: String,
    },
    /// `GET /cases`
    ListCases {
        /// Status filter
        status: Option<CaseStatus>,
    },
    /// `GET /cases/{id}`
    GetCase {
        /// Requested case
        case_id: String,
    },
    /// `POST /cases/{id}/decision`
    SubmitDecision {
        /// Target case
        case_id: String,
        /// Recorded decision
        decision: HumanDecision,
        /// Reviewer notes
        notes: Option<String>,
    },
    /// `POST /cases/{id}/finalize`
    FinalizeCase {
        /// Target case
        case_id: String,
    },
}

type Scripted<T> = std::result::Result<T, String>;

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    session_ids: VecDeque<Scripted<String>>,
    sessions_started: usize,
    chat_responses: VecDeque<Scripted<ChatResponse>>,
    public_statuses: HashMap<String, VecDeque<Scripted<CasePublicStatus>>>,
    upload_failures: usize,
    cases: BTreeMap<String, CaseRecord>,
    credentials: Option<ReviewerCredentials>,
    reviewer_failures: usize,
    finalize_reply: Option<String>,
}

/// Scripted [`BackendApi`] implementation
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

fn connection_error(message: String) -> anyhow::Error {
    EcomdeskError::Connection(message).into()
}

impl FakeBackend {
    /// Create a fake with nothing scripted
    ///
    /// Unscripted session starts return `session-1`, `session-2`, ...
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        // A poisoned lock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the id returned by the next `start_session`
    pub fn push_session_id(&self, session_id: &str) {
        self.state()
            .session_ids
            .push_back(Ok(session_id.to_string()));
    }

    /// Make the next `start_session` fail
    pub fn fail_next_start(&self) {
        self.state()
            .session_ids
            .push_back(Err("connection refused".to_string()));
    }

    /// Queue the response to the next `send_message`
    pub fn push_chat_response(&self, response: ChatResponse) {
        self.state().chat_responses.push_back(Ok(response));
    }

    /// Make the next `send_message` fail
    pub fn fail_next_send(&self) {
        self.state()
            .chat_responses
            .push_back(Err("connection reset".to_string()));
    }

    /// Queue a public status response for `case_id`
    pub fn push_public_status(&self, case_id: &str, status: CasePublicStatus) {
        self.state()
            .public_statuses
            .entry(case_id.to_string())
            .or_default()
            .push_back(Ok(status));
    }

    /// Queue a failing public status response for `case_id`
    pub fn fail_next_public_status(&self, case_id: &str) {
        self.state()
            .public_statuses
            .entry(case_id.to_string())
            .or_default()
            .push_back(Err("gateway timeout".to_string()));
    }

    /// Make the next `upload_photo` fail
    pub fn fail_next_upload(&self) {
        self.state().upload_failures += 1;
    }

    /// Store a case visible to reviewer calls
    pub fn insert_case(&self, record: CaseRecord) {
        self.state().cases.insert(record.case_id.clone(), record);
    }

    /// Current stored record of `case_id`
    pub fn case(&self, case_id: &str) -> Option<CaseRecord> {
        self.state().cases.get(case_id).cloned()
    }

    /// Only accept reviewer calls carrying these credentials
    pub fn require_credentials(&self, credentials: ReviewerCredentials) {
        self.state().credentials = Some(credentials);
    }

    /// Make the next reviewer call fail with a connection error
    pub fn fail_next_reviewer_call(&self) {
        self.state().reviewer_failures += 1;
    }

    /// Reply generated by `finalize_case`
    pub fn set_finalize_reply(&self, reply: &str) {
        self.state().finalize_reply = Some(reply.to_string());
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of `start_session` calls
    pub fn start_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::StartSession))
    }

    /// Number of `send_message` calls
    pub fn send_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::SendMessage { .. }))
    }

    /// Number of public status polls
    pub fn poll_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CasePublicStatus { .. }))
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| predicate(c)).count()
    }

    fn check_reviewer(state: &mut FakeState, credentials: &ReviewerCredentials) -> Result<()> {
        if state.reviewer_failures > 0 {
            state.reviewer_failures -= 1;
            return Err(connection_error("connection refused".to_string()));
        }
        match &state.credentials {
            Some(expected) if expected != credentials => Err(EcomdeskError::Api {
                status: 401,
                message: "Unauthorized".to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn missing_case(case_id: &str) -> anyhow::Error {
        EcomdeskError::Api {
            status: 404,
            message: format!("Case not found: {}", case_id),
        }
        .into()
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn start_session(&self) -> Result<ChatStartResponse> {
        let mut state = self.state();
        state.calls.push(Call::StartSession);
        match state.session_ids.pop_front() {
            Some(Ok(session_id)) => Ok(ChatStartResponse { session_id }),
            Some(Err(message)) => Err(connection_error(message)),
            None => {
                state.sessions_started += 1;
                Ok(ChatStartResponse {
                    session_id: format!("session-{}", state.sessions_started),
                })
            }
        }
    }

    async fn send_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatResponse> {
        let mut state = self.state();
        state.calls.push(Call::SendMessage {
            session_id: session_id.to_string(),
            request: request.clone(),
        });
        match state.chat_responses.pop_front() {
            Some(Ok(mut response)) => {
                response.session_id = session_id.to_string();
                Ok(response)
            }
            Some(Err(message)) => Err(connection_error(message)),
            None => Ok(ChatResponse {
                session_id: session_id.to_string(),
                assistant_message: "Thanks, tell me more about your order.".to_string(),
                case_id: None,
                status: None,
            }),
        }
    }

    async fn case_public_status(&self, case_id: &str) -> Result<CasePublicStatus> {
        let mut state = self.state();
        state.calls.push(Call::CasePublicStatus {
            case_id: case_id.to_string(),
        });
        let queue = state.public_statuses.get_mut(case_id);
        // The last scripted status repeats; failures are always one-shot.
        let scripted = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) if matches!(queue.front(), Some(Err(_))) => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match scripted {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(connection_error(message)),
            None => Err(Self::missing_case(case_id)),
        }
    }

    async fn upload_photo(
        &self,
        case_id: &str,
        photo: PhotoUpload,
    ) -> Result<PhotoUploadResponse> {
        let mut state = self.state();
        state.calls.push(Call::UploadPhoto {
            case_id: case_id.to_string(),
            file_name: photo.file_name.clone(),
        });
        if state.upload_failures > 0 {
            state.upload_failures -= 1;
            return Err(connection_error("upload interrupted".to_string()));
        }
        let photo_url = format!("http://fake/uploads/{}/{}", case_id, photo.file_name);
        if let Some(record) = state.cases.get_mut(case_id) {
            record.photo_urls_json.push(photo_url.clone());
            if record.photos_required {
                record.status = CaseStatus::ReadyForHumanReview;
            }
        }
        Ok(PhotoUploadResponse {
            case_id: case_id.to_string(),
            photo_url,
        })
    }

    async fn list_cases(
        &self,
        credentials: &ReviewerCredentials,
        status: Option<CaseStatus>,
    ) -> Result<Vec<CaseRecord>> {
        let mut state = self.state();
        state.calls.push(Call::ListCases { status });
        Self::check_reviewer(&mut state, credentials)?;
        Ok(state
            .cases
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    async fn get_case(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
    ) -> Result<CaseRecord> {
        let mut state = self.state();
        state.calls.push(Call::GetCase {
            case_id: case_id.to_string(),
        });
        Self::check_reviewer(&mut state, credentials)?;
        state
            .cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| Self::missing_case(case_id))
    }

    async fn submit_decision(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
        decision: HumanDecision,
        notes: Option<&str>,
    ) -> Result<DecisionResponse> {
        let mut state = self.state();
        state.calls.push(Call::SubmitDecision {
            case_id: case_id.to_string(),
            decision,
            notes: notes.map(str::to_string),
        });
        Self::check_reviewer(&mut state, credentials)?;
        let record = state
            .cases
            .get_mut(case_id)
            .ok_or_else(|| Self::missing_case(case_id))?;
        record.status = decision.status();
        record.human_decision = Some(decision.as_str().to_string());
        record.human_notes = notes.map(str::to_string);
        Ok(DecisionResponse {
            case_id: case_id.to_string(),
            status: record.status,
        })
    }

    async fn finalize_case(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
    ) -> Result<FinalizeResponse> {
        let mut state = self.state();
        state.calls.push(Call::FinalizeCase {
            case_id: case_id.to_string(),
        });
        Self::check_reviewer(&mut state, credentials)?;
        let reply = state
            .finalize_reply
            .clone()
            .unwrap_or_else(|| "Your request has been resolved.".to_string());
        let record = state
            .cases
            .get_mut(case_id)
            .ok_or_else(|| Self::missing_case(case_id))?;
        if record.human_decision.is_none() {
            return Err(EcomdeskError::Api {
                status: 400,
                message: "Human decision is required before finalizing".to_string(),
            }
            .into());
        }
        let next_actions = vec![NextAction {
            action: "notify_customer".to_string(),
            details: None,
        }];
        record.status = CaseStatus::Closed;
        record.final_customer_reply = Some(reply.clone());
        record.next_actions_json = next_actions.clone();
        Ok(FinalizeResponse {
            case_id: case_id.to_string(),
            status: CaseStatus::Closed,
            customer_reply: reply,
            next_actions,
        })
    }
}
