//! reqwest implementation of [`BackendApi`]
//!
//! Every call is a single JSON request/response exchange. Failures are
//! classified as:
//!
//! - [`EcomdeskError::Connection`] when the backend cannot be reached
//!   (refused, DNS, timeout)
//! - [`EcomdeskError::Api`] when it answers with a non-success status
//! - [`EcomdeskError::Http`] when a success body cannot be decoded
//!
//! No call is retried here; retries are always user initiated.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::types::CasesListResponse;
use super::{
    BackendApi, CasePublicStatus, CaseRecord, ChatMessageRequest, ChatResponse,
    ChatStartResponse, DecisionResponse, FinalizeResponse, HumanDecision, PhotoUpload,
    PhotoUploadResponse, ReviewerCredentials,
};
use crate::chat::status::CaseStatus;
use crate::config::ApiConfig;
use crate::error::{EcomdeskError, Result};

/// HTTP client for the claims backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    ///
    /// Trailing slashes on the base URL are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use ecomdesk::api::http::HttpBackend;
    ///
    /// let backend = HttpBackend::new("http://localhost:8000//", Duration::from_secs(5)).unwrap();
    /// assert_eq!(backend.base_url().as_str(), "http://localhost:8000/");
    /// ```
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| {
            EcomdeskError::Config(format!("Invalid backend URL {}: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ecomdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                EcomdeskError::Connection(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!("Initialized backend client: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// Create a client from configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EcomdeskError::Config(format!("Backend URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Failed to {}: {}", what, e);
            EcomdeskError::Connection(format!("Failed to {}: {}", what, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Backend returned {} while trying to {}: {}", status, what, body);
            return Err(EcomdeskError::Api {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        let parsed = response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response to {}: {}", what, e);
            EcomdeskError::Http(e)
        })?;
        Ok(parsed)
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn start_session(&self) -> Result<ChatStartResponse> {
        let url = self.endpoint(&["chat", "start"])?;
        tracing::debug!("POST {}", url);
        self.execute(self.client.post(url), "start chat session")
            .await
    }

    async fn send_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatResponse> {
        let url = self.endpoint(&["chat", session_id])?;
        tracing::debug!("POST {}", url);
        self.execute(self.client.post(url).json(request), "send message")
            .await
    }

    async fn case_public_status(&self, case_id: &str) -> Result<CasePublicStatus> {
        let url = self.endpoint(&["cases", case_id, "public"])?;
        tracing::debug!("GET {}", url);
        self.execute(self.client.get(url), "fetch case status")
            .await
    }

    async fn upload_photo(
        &self,
        case_id: &str,
        photo: PhotoUpload,
    ) -> Result<PhotoUploadResponse> {
        let url = self.endpoint(&["cases", case_id, "photos"])?;
        tracing::debug!("POST {} ({} bytes)", url, photo.bytes.len());
        let part = reqwest::multipart::Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(photo.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.execute(self.client.post(url).multipart(form), "upload photo")
            .await
    }

    async fn list_cases(
        &self,
        credentials: &ReviewerCredentials,
        status: Option<CaseStatus>,
    ) -> Result<Vec<CaseRecord>> {
        let url = self.endpoint(&["cases"])?;
        tracing::debug!("GET {} status={:?}", url, status);
        let mut request = self
            .client
            .get(url)
            .header("Authorization", credentials.authorization_header());
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let list: CasesListResponse = self.execute(request, "fetch cases").await?;
        Ok(list.data)
    }

    async fn get_case(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
    ) -> Result<CaseRecord> {
        let url = self.endpoint(&["cases", case_id])?;
        tracing::debug!("GET {}", url);
        let request = self
            .client
            .get(url)
            .header("Authorization", credentials.authorization_header());
        self.execute(request, "fetch case").await
    }

    async fn submit_decision(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
        decision: HumanDecision,
        notes: Option<&str>,
    ) -> Result<DecisionResponse> {
        let url = self.endpoint(&["cases", case_id, "decision"])?;
        tracing::debug!("POST {} decision={}", url, decision.as_str());
        let mut query = vec![("decision", decision.as_str())];
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            query.push(("notes", notes));
        }
        let request = self
            .client
            .post(url)
            .query(&query)
            .header("Authorization", credentials.authorization_header());
        self.execute(request, "submit decision").await
    }

    async fn finalize_case(
        &self,
        credentials: &ReviewerCredentials,
        case_id: &str,
    ) -> Result<FinalizeResponse> {
        let url = self.endpoint(&["cases", case_id, "finalize"])?;
        tracing::debug!("POST {}", url);
        let request = self
            .client
            .post(url)
            .header("Authorization", credentials.authorization_header());
        self.execute(request, "finalize case").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let b = backend("http://localhost:8000");
        assert_eq!(
            b.endpoint(&["cases", "c1", "public"]).unwrap().as_str(),
            "http://localhost:8000/cases/c1/public"
        );
    }

    #[test]
    fn test_endpoint_with_prefix_and_trailing_slash() {
        let b = backend("https://api.example.com/v1/");
        assert_eq!(
            b.endpoint(&["chat", "start"]).unwrap().as_str(),
            "https://api.example.com/v1/chat/start"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let b = backend("http://localhost:8000");
        assert_eq!(
            b.endpoint(&["chat", "a b/c"]).unwrap().as_str(),
            "http://localhost:8000/chat/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpBackend::new("not a url", Duration::from_secs(1)).is_err());
    }
}
