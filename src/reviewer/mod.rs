//! Human reviewer desk
//!
//! The desk holds reviewer credentials for the lifetime of the process and
//! wraps the authenticated backend calls. Every operation requires a
//! signed-in reviewer. Failures are returned to the caller and also queued
//! as notices for display.

use std::sync::Arc;

use crate::api::{BackendApi, CaseRecord, FinalizeResponse, HumanDecision, ReviewerCredentials};
use crate::chat::notice::{Notice, Notices};
use crate::chat::status::CaseStatus;
use crate::error::{EcomdeskError, Result};

/// Status filter used when listing cases without an explicit filter
pub const DEFAULT_REVIEW_FILTER: CaseStatus = CaseStatus::ReadyForHumanReview;

/// Reviewer session over a backend
pub struct ReviewerDesk<A: ?Sized> {
    api: Arc<A>,
    credentials: Option<ReviewerCredentials>,
    notices: Notices,
}

impl<A: BackendApi + ?Sized> ReviewerDesk<A> {
    /// Create a desk with no reviewer signed in
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            credentials: None,
            notices: Notices::default(),
        }
    }

    /// Store credentials for subsequent calls
    ///
    /// The credentials are not checked against the backend until the first
    /// call.
    pub fn sign_in(&mut self, username: &str, password: &str) -> Result<()> {
        let credentials = ReviewerCredentials::new(username, password)?;
        tracing::info!("Reviewer {} signed in", credentials.username());
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Forget the stored credentials
    pub fn sign_out(&mut self) {
        if let Some(credentials) = self.credentials.take() {
            tracing::info!("Reviewer {} signed out", credentials.username());
        }
    }

    /// `true` when credentials are held
    pub fn is_signed_in(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&ReviewerCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| EcomdeskError::NotSignedIn.into())
    }

    fn failed<T>(&mut self, title: &str, error: anyhow::Error) -> Result<T> {
        tracing::error!("{}: {}", title, error);
        let detail = error.to_string();
        self.notices.push(Notice::error(title, Some(&detail)));
        Err(error)
    }

    /// List cases, filtered by `status` when given
    pub async fn list_cases(&mut self, status: Option<CaseStatus>) -> Result<Vec<CaseRecord>> {
        let credentials = self.credentials()?.clone();
        match self.api.list_cases(&credentials, status).await {
            Ok(cases) => {
                tracing::debug!("Fetched {} cases (filter {:?})", cases.len(), status);
                Ok(cases)
            }
            Err(e) => self.failed("Failed to fetch cases", e),
        }
    }

    /// Full record of one case
    pub async fn get_case(&mut self, case_id: &str) -> Result<CaseRecord> {
        let credentials = self.credentials()?.clone();
        match self.api.get_case(&credentials, case_id).await {
            Ok(case) => Ok(case),
            Err(e) => self.failed("Failed to fetch case", e),
        }
    }

    /// Record a decision and return the case's new status
    pub async fn submit_decision(
        &mut self,
        case_id: &str,
        decision: HumanDecision,
        notes: Option<&str>,
    ) -> Result<CaseStatus> {
        let credentials = self.credentials()?.clone();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        match self
            .api
            .submit_decision(&credentials, case_id, decision, notes)
            .await
        {
            Ok(response) => {
                tracing::info!("Recorded {} on case {}", decision.as_str(), case_id);
                self.notices.push(Notice::info("Decision submitted", None));
                Ok(response.status)
            }
            Err(e) => self.failed("Failed to submit decision", e),
        }
    }

    /// Close a decided case and generate the customer reply
    pub async fn finalize_case(&mut self, case_id: &str) -> Result<FinalizeResponse> {
        let credentials = self.credentials()?.clone();
        match self.api.finalize_case(&credentials, case_id).await {
            Ok(response) => {
                tracing::info!("Finalized case {}", case_id);
                self.notices.push(Notice::info("Case finalized", None));
                Ok(response)
            }
            Err(e) => self.failed("Failed to finalize case", e),
        }
    }

    /// Take pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}
