//! Claims backend API
//!
//! [`BackendApi`] is the seam between the frontend logic and the REST
//! service. [`http::HttpBackend`] talks to a real backend with reqwest;
//! [`fake::FakeBackend`] replays scripted responses in-process for tests.
//!
//! Reviewer endpoints take [`ReviewerCredentials`] explicitly; the
//! customer endpoints are unauthenticated.

use async_trait::async_trait;

use crate::chat::status::CaseStatus;
use crate::error::Result;

pub mod auth;
pub mod fake;
pub mod http;
pub mod types;

pub use auth::ReviewerCredentials;
pub use types::{
    CasePublicStatus, CaseRecord, ChatMessageRequest, ChatResponse, ChatStartResponse,
    DecisionResponse, FinalizeResponse, NextAction, PhotoUpload, PhotoUploadResponse,
};

/// Decision a human reviewer can record on a case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanDecision {
    /// Grant the claim
    Approved,
    /// Reject the claim
    Denied,
    /// Ask the customer for more information
    MoreInfoRequested,
}

impl HumanDecision {
    /// Wire value of the decision
    pub fn as_str(&self) -> &'static str {
        self.status().as_str()
    }

    /// Status the case takes once this decision is recorded
    pub fn status(&self) -> CaseStatus {
        match self {
            HumanDecision::Approved => CaseStatus::Approved,
            HumanDecision::Denied => CaseStatus::Denied,
            HumanDecision::MoreInfoRequested => CaseStatus::MoreInfoRequested,
        }
    }
}

impl std::str::FromStr for HumanDecision {
    type Err = crate::error::EcomdeskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.parse::<CaseStatus>() {
            Ok(CaseStatus::Approved) => Ok(HumanDecision::Approved),
            Ok(CaseStatus::Denied) => Ok(HumanDecision::Denied),
            Ok(CaseStatus::MoreInfoRequested) => Ok(HumanDecision::MoreInfoRequested),
            _ => Err(crate::error::EcomdeskError::Validation(format!(
                "Invalid decision: {}. Must be one of: approved, denied, more_info_requested",
                s
            ))),
        }
    }
}

/// REST surface of the claims backend
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /chat/start`
    async fn start_session(&self) -> Result<ChatStartResponse>;

    /// `POST /chat/{session_id}`
    async fn send_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatResponse>;

    /// `GET /cases/{case_id}/public`
    async fn case_public_status(&self, case_id: &str) -> Result<CasePublicStatus>;

    /// `POST /cases/{case_id}/photos`
    async fn upload_photo(&self, case_id: &str, photo: PhotoUpload)
        -> Result<PhotoUploadResponse>;

    /// `GET /cases?status=`
    async fn list_cases(
        &self,
        credentials: &ReviewerCredentials,
        status: Option<CaseStatus>,
    ) -> Result<Vec<CaseRecord>>;

    /// `GET /cases/{case_id}`
    async fn get_case(&self, credentials: &ReviewerCredentials, case_id: &str)
        -> Result<CaseRecord>;

    /// `POST /cases/{case_id}/decision?decision=&notes=`
    async fn submit_decision(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
        decision: HumanDecision,
        notes: Option<&str>,
    ) -> Result<DecisionResponse>;

    /// `POST /cases/{case_id}/finalize`
    async fn finalize_case(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
    ) -> Result<FinalizeResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse() {
        assert_eq!(
            "approved".parse::<HumanDecision>().unwrap(),
            HumanDecision::Approved
        );
        assert_eq!(
            "more info requested".parse::<HumanDecision>().unwrap(),
            HumanDecision::MoreInfoRequested
        );
        assert!("closed".parse::<HumanDecision>().is_err());
        assert!("maybe".parse::<HumanDecision>().is_err());
    }

    #[test]
    fn test_decision_wire_value() {
        assert_eq!(HumanDecision::Denied.as_str(), "denied");
        assert_eq!(
            HumanDecision::MoreInfoRequested.status(),
            CaseStatus::MoreInfoRequested
        );
    }
}
