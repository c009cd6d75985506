//! Test utilities for ecomdesk
//!
//! Fixtures shared by the unit tests: temporary directories, case
//! records, public status payloads, and error assertions.

use crate::api::{CasePublicStatus, CaseRecord};
use crate::chat::status::CaseStatus;
use crate::config::Config;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Reviewer-visible case record with plausible defaults
pub fn sample_case(case_id: &str, status: CaseStatus) -> CaseRecord {
    CaseRecord {
        case_id: case_id.to_string(),
        order_id: "ORD-10003".to_string(),
        reason: "damaged".to_string(),
        status,
        created_at: "2026-01-15T10:00:00".to_string(),
        photos_required: status == CaseStatus::NeedsCustomerPhotos,
        ai_decision_json: serde_json::json!({
            "decision": "approve",
            "confidence": 0.82
        }),
        policy_citations_json: Vec::new(),
        order_facts_json: serde_json::Value::Null,
        photo_urls_json: Vec::new(),
        human_decision: None,
        human_notes: None,
        final_customer_reply: None,
        next_actions_json: Vec::new(),
        customer_message: Some("My item arrived broken".to_string()),
    }
}

/// Public status payload for `case_id`
pub fn public_status(
    case_id: &str,
    status: Option<CaseStatus>,
    reply: Option<&str>,
) -> CasePublicStatus {
    CasePublicStatus {
        case_id: case_id.to_string(),
        status,
        final_customer_reply: reply.map(str::to_string),
        next_actions: None,
    }
}

/// Assert that an error's message contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok or the message does not match.
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Configuration YAML with every section set
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://claims.internal:9000
  timeout_seconds: 10
chat:
  poll_interval_ms: 500
storage:
  path: /tmp/ecomdesk-test.db
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcomdeskError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_sample_case_photos_flag() {
        assert!(sample_case("c1", CaseStatus::NeedsCustomerPhotos).photos_required);
        assert!(!sample_case("c1", CaseStatus::ReadyForHumanReview).photos_required);
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(EcomdeskError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: anyhow::Result<()> =
            Err(EcomdeskError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml_parses() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.api.base_url, "http://claims.internal:9000");
        assert_eq!(config.chat.poll_interval_ms, 500);
        assert!(config.validate().is_ok());
    }
}
