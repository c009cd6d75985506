//! Reviewer credentials
//!
//! Credentials are entered by the reviewer and live only in memory for
//! the lifetime of the process. They are never written to disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

use crate::error::{EcomdeskError, Result};

/// Username/password pair sent as HTTP basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct ReviewerCredentials {
    username: String,
    password: String,
}

impl ReviewerCredentials {
    /// Build credentials, rejecting blank fields
    ///
    /// # Examples
    ///
    /// ```
    /// use ecomdesk::api::ReviewerCredentials;
    ///
    /// let creds = ReviewerCredentials::new("reviewer", "secret").unwrap();
    /// assert_eq!(creds.authorization_header(), "Basic cmV2aWV3ZXI6c2VjcmV0");
    /// assert!(ReviewerCredentials::new("", "secret").is_err());
    /// ```
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(EcomdeskError::Validation(
                "Reviewer username and password are required".to_string(),
            )
            .into());
        }
        Ok(Self { username, password })
    }

    /// Reviewer username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value of the `Authorization` header
    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for ReviewerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
