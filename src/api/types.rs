//! Wire types for the claims backend REST API

use serde::{Deserialize, Deserializer, Serialize};

use crate::chat::status::CaseStatus;

/// Response to `POST /chat/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStartResponse {
    /// Newly issued session identifier
    pub session_id: String,
}

/// Body of `POST /chat/{session_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    /// Customer message text
    pub message: String,
    /// Normalized order number, when the customer supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Customer prefers store credit over a refund
    #[serde(default)]
    pub wants_store_credit: bool,
}

/// Response to `POST /chat/{session_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Session the reply belongs to
    #[serde(default)]
    pub session_id: String,
    /// Assistant reply to show the customer
    pub assistant_message: String,
    /// Case opened (or continued) by this message
    #[serde(default)]
    pub case_id: Option<String>,
    /// Status of that case
    #[serde(default)]
    pub status: Option<CaseStatus>,
}

/// A follow-up action attached to a finalized case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    /// Short action name
    pub action: String,
    /// Optional detail text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Response to the unauthenticated `GET /cases/{id}/public`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CasePublicStatus {
    /// Case identifier
    #[serde(default)]
    pub case_id: String,
    /// Current status, if the backend reports one
    #[serde(default)]
    pub status: Option<CaseStatus>,
    /// Final reply generated when the reviewer finalized the case
    #[serde(default)]
    pub final_customer_reply: Option<String>,
    /// Follow-up actions for the customer
    #[serde(default, rename = "next_actions_json")]
    pub next_actions: Option<Vec<NextAction>>,
}

/// Policy excerpt cited by the AI recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCitation {
    /// Source document
    pub source: String,
    /// Quoted excerpt
    pub excerpt: String,
    /// Policy identifier
    #[serde(default)]
    pub policy_id: Option<String>,
}

/// Full case record returned to reviewers
///
/// The list endpoint returns only the summary columns, so every detail
/// field defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case identifier
    pub case_id: String,
    /// Order the claim refers to
    #[serde(default)]
    pub order_id: String,
    /// Claim reason
    #[serde(default)]
    pub reason: String,
    /// Current status
    pub status: CaseStatus,
    /// Creation timestamp as reported by the backend
    #[serde(default)]
    pub created_at: String,
    /// Whether photo evidence is required
    #[serde(default, deserialize_with = "bool_or_int")]
    pub photos_required: bool,
    /// AI recommendation payload
    #[serde(default)]
    pub ai_decision_json: serde_json::Value,
    /// Policy citations backing the recommendation
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy_citations_json: Vec<PolicyCitation>,
    /// Order facts used for the decision
    #[serde(default)]
    pub order_facts_json: serde_json::Value,
    /// Uploaded photo URLs
    #[serde(default, deserialize_with = "null_as_default")]
    pub photo_urls_json: Vec<String>,
    /// Recorded human decision
    #[serde(default)]
    pub human_decision: Option<String>,
    /// Reviewer notes
    #[serde(default)]
    pub human_notes: Option<String>,
    /// Final reply sent to the customer
    #[serde(default)]
    pub final_customer_reply: Option<String>,
    /// Follow-up actions
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_actions_json: Vec<NextAction>,
    /// Original customer message
    #[serde(default)]
    pub customer_message: Option<String>,
}

// SQLite-backed rows report flags as 0/1.
fn bool_or_int<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope of `GET /cases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasesListResponse {
    /// Matching cases
    #[serde(default)]
    pub data: Vec<CaseRecord>,
}

/// Response to `POST /cases/{id}/photos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUploadResponse {
    /// Case the photo was attached to
    pub case_id: String,
    /// Public URL of the stored photo
    pub photo_url: String,
}

/// Response to `POST /cases/{id}/decision`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// Case identifier
    pub case_id: String,
    /// Status after the decision
    pub status: CaseStatus,
}

/// Response to `POST /cases/{id}/finalize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    /// Case identifier
    pub case_id: String,
    /// Status after finalizing (normally `closed`)
    pub status: CaseStatus,
    /// Generated customer reply
    pub customer_reply: String,
    /// Follow-up actions
    #[serde(default)]
    pub next_actions: Vec<NextAction>,
}

/// A photo ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// File name sent in the multipart part
    pub file_name: String,
    /// MIME type of the image
    pub mime_type: &'static str,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}
