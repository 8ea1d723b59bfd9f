//! Disputes raised by employees against published appraisals.
//!
//! Sub-flow: `OPEN → UNDER_REVIEW → {ADJUSTED | REJECTED}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::ResourceId;
use crate::reference::{Label, PersonSummary, Ref, label_or};
use crate::serde_util;
use crate::status::{Badge, dispute_badge};

/// Status of a dispute.
///
/// Unknown strings from the backend are preserved in `Other` so one odd
/// record does not fail a whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisputeStatus {
    Open,
    UnderReview,
    Adjusted,
    Rejected,
    Other(String),
}

impl DisputeStatus {
    pub const ALL: [DisputeStatus; 4] = [
        DisputeStatus::Open,
        DisputeStatus::UnderReview,
        DisputeStatus::Adjusted,
        DisputeStatus::Rejected,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            DisputeStatus::Open => "OPEN",
            DisputeStatus::UnderReview => "UNDER_REVIEW",
            DisputeStatus::Adjusted => "ADJUSTED",
            DisputeStatus::Rejected => "REJECTED",
            DisputeStatus::Other(s) => s,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DisputeStatus::Open => "Open",
            DisputeStatus::UnderReview => "Under Review",
            DisputeStatus::Adjusted => "Adjusted",
            DisputeStatus::Rejected => "Rejected",
            DisputeStatus::Other(s) if s.is_empty() => "Unknown",
            DisputeStatus::Other(s) => s,
        }
    }

    /// Open disputes can still be resolved by HR.
    pub fn is_resolvable(&self) -> bool {
        matches!(self, DisputeStatus::Open | DisputeStatus::UnderReview)
    }

    pub fn badge(&self) -> Badge {
        dispute_badge(self.as_str())
    }
}

impl Default for DisputeStatus {
    fn default() -> Self {
        DisputeStatus::Other(String::new())
    }
}

impl From<&str> for DisputeStatus {
    fn from(s: &str) -> Self {
        DisputeStatus::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .unwrap_or_else(|| DisputeStatus::Other(s.to_string()))
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strict parse for user-supplied filters; only the known statuses match.
impl std::str::FromStr for DisputeStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisputeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| crate::Error::validation(format!("unknown dispute status: {s}")))
    }
}

impl Serialize for DisputeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DisputeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| DisputeStatus::from(s.as_str())).unwrap_or_default())
    }
}

/// The disputed record (or assignment) as populated into a dispute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputedItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub overall_rating_label: Option<String>,
    #[serde(rename = "employeeProfileId", default)]
    pub employee: Option<Ref<PersonSummary>>,
}

impl Label for DisputedItem {
    fn label(&self) -> String {
        label_or(self.employee.as_ref(), "")
    }

    fn summary_id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(rename = "appraisalId", default)]
    pub appraisal: Option<Ref<DisputedItem>>,
    #[serde(rename = "assignmentId", default)]
    pub assignment: Option<Ref<DisputedItem>>,
    #[serde(rename = "raisedByEmployeeId", default)]
    pub raised_by: Option<Ref<PersonSummary>>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: DisputeStatus,
    #[serde(default)]
    pub resolution_summary: Option<String>,
    #[serde(default)]
    pub adjusted_score: Option<f64>,
    #[serde(default)]
    pub adjusted_rating_label: Option<String>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Dispute {
    /// Name of the employee who raised the dispute, looked up through
    /// whichever reference the backend populated.
    pub fn employee_name(&self) -> String {
        self.raised_by
            .as_ref()
            .and_then(Ref::label)
            .or_else(|| self.appraisal.as_ref().and_then(Ref::label))
            .or_else(|| self.assignment.as_ref().and_then(Ref::label))
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn disputed_item(&self) -> Option<&DisputedItem> {
        self.appraisal
            .as_ref()
            .and_then(Ref::populated)
            .or_else(|| self.assignment.as_ref().and_then(Ref::populated))
    }

    /// Reason shortened for list rows.
    pub fn reason_excerpt(&self, max: usize) -> String {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return "No reason provided".to_string();
        }
        if reason.chars().count() <= max {
            reason.to_string()
        } else {
            format!("{}...", reason.chars().take(max).collect::<String>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispute() {
        let json = r#"{
            "_id": "d1",
            "appraisalId": {"_id": "r1", "totalScore": 3.4, "overallRatingLabel": "Meets", "employeeProfileId": {"firstName": "Ada", "lastName": "Lovelace"}},
            "reason": "Rating ignores Q3 delivery",
            "status": "UNDER_REVIEW",
            "createdAt": "2025-11-01T10:00:00Z"
        }"#;

        let dispute: Dispute = serde_json::from_str(json).unwrap();
        assert_eq!(dispute.status, DisputeStatus::UnderReview);
        assert!(dispute.status.is_resolvable());
        assert_eq!(dispute.employee_name(), "Ada Lovelace");
        assert_eq!(dispute.disputed_item().and_then(|i| i.total_score), Some(3.4));
        assert_eq!(dispute.status.badge(), Badge::Warning);
    }

    #[test]
    fn test_employee_name_prefers_raiser() {
        let json = r#"{
            "_id": "d1",
            "raisedByEmployeeId": {"_id": "e9", "firstName": "Grace", "lastName": "Hopper"},
            "assignmentId": "a1",
            "reason": "",
            "status": "OPEN"
        }"#;
        let dispute: Dispute = serde_json::from_str(json).unwrap();
        assert_eq!(dispute.employee_name(), "Grace Hopper");
        assert_eq!(dispute.reason_excerpt(60), "No reason provided");
    }

    #[test]
    fn test_resolved_statuses() {
        assert!(!DisputeStatus::Adjusted.is_resolvable());
        assert_eq!(DisputeStatus::Rejected.badge(), Badge::Error);
        assert_eq!("ADJUSTED".parse::<DisputeStatus>().unwrap(), DisputeStatus::Adjusted);
        assert!("WITHDRAWN".parse::<DisputeStatus>().is_err());
    }

    #[test]
    fn test_unknown_status_keeps_the_list() {
        let json = r#"[
            {"_id": "d1", "reason": "Unfair", "status": "OPEN"},
            {"_id": "d2", "reason": "Late", "status": "WITHDRAWN"},
            {"_id": "d3", "reason": "Missing"},
            {"_id": "d4", "reason": "Null", "status": null}
        ]"#;

        let disputes: Vec<Dispute> = serde_json::from_str(json).unwrap();
        assert_eq!(disputes.len(), 4);
        assert_eq!(disputes[0].status, DisputeStatus::Open);

        let withdrawn = &disputes[1].status;
        assert_eq!(*withdrawn, DisputeStatus::Other("WITHDRAWN".to_string()));
        assert_eq!(withdrawn.title(), "WITHDRAWN");
        assert_eq!(withdrawn.badge(), Badge::Info);
        assert!(!withdrawn.is_resolvable());

        assert_eq!(disputes[2].status.title(), "Unknown");
        assert!(!disputes[2].status.is_resolvable());
        assert_eq!(disputes[3].status, DisputeStatus::default());
    }
}
