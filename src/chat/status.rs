//! Case status values and the per-case lifecycle
//!
//! A case moves from intake through optional photo collection and human
//! review to `closed`. The backend is authoritative about which status a
//! case is in; [`is_expected_transition`] only tells the synchronizer
//! whether an observed change follows the usual lifecycle so unusual
//! jumps can be logged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EcomdeskError;

/// Status of a returns/warranty case as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Customer must upload photo evidence before review
    NeedsCustomerPhotos,
    /// Waiting for a human reviewer
    ReadyForHumanReview,
    /// Reviewer approved the claim
    Approved,
    /// Reviewer denied the claim
    Denied,
    /// Reviewer asked the customer for more information
    MoreInfoRequested,
    /// Final reply generated; nothing further happens on this case
    Closed,
}

impl CaseStatus {
    /// Every status, in lifecycle order
    pub const ALL: [CaseStatus; 6] = [
        CaseStatus::NeedsCustomerPhotos,
        CaseStatus::ReadyForHumanReview,
        CaseStatus::Approved,
        CaseStatus::Denied,
        CaseStatus::MoreInfoRequested,
        CaseStatus::Closed,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::NeedsCustomerPhotos => "needs_customer_photos",
            CaseStatus::ReadyForHumanReview => "ready_for_human_review",
            CaseStatus::Approved => "approved",
            CaseStatus::Denied => "denied",
            CaseStatus::MoreInfoRequested => "more_info_requested",
            CaseStatus::Closed => "closed",
        }
    }

    /// Human readable label, e.g. `ready for human review`
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// `true` once the case can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Closed)
    }

    /// `true` for the statuses a reviewer decision produces
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            CaseStatus::Approved | CaseStatus::Denied | CaseStatus::MoreInfoRequested
        )
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = EcomdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        CaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                EcomdeskError::Validation(format!(
                    "Unknown case status: {}. Must be one of: {}",
                    s,
                    CaseStatus::ALL.map(|st| st.as_str()).join(", ")
                ))
            })
    }
}

/// Whether moving from `from` (`None` = no status yet) to `to` follows the
/// normal case lifecycle.
///
/// Staying in the same status is always expected. Nothing is expected
/// after `closed`.
pub fn is_expected_transition(from: Option<CaseStatus>, to: CaseStatus) -> bool {
    use CaseStatus::*;

    match from {
        None => true,
        Some(from) if from == to => true,
        Some(Closed) => false,
        Some(_) if to == Closed => true,
        Some(NeedsCustomerPhotos) => to == ReadyForHumanReview,
        Some(ReadyForHumanReview) => to.is_decision(),
        // A decision can be revised before the case is finalized.
        Some(Approved | Denied | MoreInfoRequested) => to.is_decision(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&CaseStatus::NeedsCustomerPhotos).unwrap();
        assert_eq!(json, "\"needs_customer_photos\"");
        let parsed: CaseStatus = serde_json::from_str("\"more_info_requested\"").unwrap();
        assert_eq!(parsed, CaseStatus::MoreInfoRequested);
    }

    #[test]
    fn test_unknown_status_rejected_by_serde() {
        assert!(serde_json::from_str::<CaseStatus>("\"escalated\"").is_err());
    }

    #[test]
    fn test_from_str_accepts_labels() {
        assert_eq!(
            "ready for human review".parse::<CaseStatus>().unwrap(),
            CaseStatus::ReadyForHumanReview
        );
        assert_eq!("CLOSED".parse::<CaseStatus>().unwrap(), CaseStatus::Closed);
        assert!("pending".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(CaseStatus::NeedsCustomerPhotos.label(), "needs customer photos");
    }

    #[test]
    fn test_only_closed_is_terminal() {
        for status in CaseStatus::ALL {
            assert_eq!(status.is_terminal(), status == CaseStatus::Closed);
        }
    }

    #[test]
    fn test_lifecycle_with_photos() {
        use CaseStatus::*;
        assert!(is_expected_transition(None, NeedsCustomerPhotos));
        assert!(is_expected_transition(
            Some(NeedsCustomerPhotos),
            ReadyForHumanReview
        ));
        assert!(is_expected_transition(Some(ReadyForHumanReview), Approved));
        assert!(is_expected_transition(Some(Approved), Closed));
    }

    #[test]
    fn test_photo_step_optional() {
        use CaseStatus::*;
        assert!(is_expected_transition(None, ReadyForHumanReview));
        assert!(is_expected_transition(Some(ReadyForHumanReview), Denied));
    }

    #[test]
    fn test_any_open_status_may_close() {
        for status in CaseStatus::ALL {
            assert!(is_expected_transition(Some(status), CaseStatus::Closed));
        }
    }

    #[test]
    fn test_nothing_leaves_closed() {
        for status in CaseStatus::ALL {
            if status != CaseStatus::Closed {
                assert!(!is_expected_transition(Some(CaseStatus::Closed), status));
            }
        }
    }

    #[test]
    fn test_skipping_review_is_unexpected() {
        assert!(!is_expected_transition(
            Some(CaseStatus::NeedsCustomerPhotos),
            CaseStatus::Approved
        ));
    }
}
