//! Appraisal assignments.
//!
//! An assignment pairs one employee with one manager and one template inside
//! a cycle. Its status moves through the appraisal lifecycle:
//!
//! `NOT_STARTED → IN_PROGRESS → SUBMITTED/MANAGER_SUBMITTED → PUBLISHED → ACKNOWLEDGED`
//!
//! Transitions are enforced by the backend; the portal only reads them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::ResourceId;
use crate::reference::{Named, PersonSummary, Ref};
use crate::serde_util;
use crate::status::{Badge, lifecycle_badge};
use crate::template::TemplateSummary;

/// Lifecycle status of an assignment or appraisal record.
///
/// Unknown strings from the backend are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppraisalStatus {
    NotStarted,
    InProgress,
    Submitted,
    ManagerSubmitted,
    Published,
    Acknowledged,
    Other(String),
}

impl AppraisalStatus {
    pub const KNOWN: [AppraisalStatus; 6] = [
        AppraisalStatus::NotStarted,
        AppraisalStatus::InProgress,
        AppraisalStatus::Submitted,
        AppraisalStatus::ManagerSubmitted,
        AppraisalStatus::Published,
        AppraisalStatus::Acknowledged,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AppraisalStatus::NotStarted => "NOT_STARTED",
            AppraisalStatus::InProgress => "IN_PROGRESS",
            AppraisalStatus::Submitted => "SUBMITTED",
            AppraisalStatus::ManagerSubmitted => "MANAGER_SUBMITTED",
            AppraisalStatus::Published => "PUBLISHED",
            AppraisalStatus::Acknowledged => "ACKNOWLEDGED",
            AppraisalStatus::Other(s) => s,
        }
    }

    pub fn badge(&self) -> Badge {
        lifecycle_badge(self.as_str())
    }

    /// Whether the manager has handed the evaluation over to HR.
    pub fn is_submitted(&self) -> bool {
        matches!(
            self,
            AppraisalStatus::Submitted | AppraisalStatus::ManagerSubmitted
        )
    }
}

impl Default for AppraisalStatus {
    fn default() -> Self {
        AppraisalStatus::NotStarted
    }
}

impl From<&str> for AppraisalStatus {
    fn from(s: &str) -> Self {
        AppraisalStatus::KNOWN
            .into_iter()
            .find(|known| known.as_str() == s)
            .unwrap_or_else(|| AppraisalStatus::Other(s.to_string()))
    }
}

impl std::fmt::Display for AppraisalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AppraisalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppraisalStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AppraisalStatus::from(raw.as_str()))
    }
}

/// An appraisal assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(rename = "cycleId", default)]
    pub cycle: Option<Ref<Named>>,
    #[serde(rename = "templateId", default)]
    pub template: Option<Ref<TemplateSummary>>,
    #[serde(rename = "employeeProfileId", default)]
    pub employee: Option<Ref<PersonSummary>>,
    #[serde(rename = "managerProfileId", default)]
    pub manager: Option<Ref<PersonSummary>>,
    /// Older payloads carry `managerId` instead of `managerProfileId`.
    #[serde(rename = "managerId", default, skip_serializing_if = "Option::is_none")]
    pub legacy_manager: Option<Ref<PersonSummary>>,
    #[serde(rename = "departmentId", default)]
    pub department: Option<Ref<Named>>,
    #[serde(default)]
    pub status: AppraisalStatus,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_appraisal_id: Option<ResourceId>,
}

impl Assignment {
    pub fn cycle_id(&self) -> Option<&ResourceId> {
        self.cycle.as_ref().and_then(Ref::id)
    }

    pub fn manager_ref(&self) -> Option<&Ref<PersonSummary>> {
        self.manager.as_ref().or(self.legacy_manager.as_ref())
    }
}

/// Remove repeated ids, keeping the first occurrence and the original order.
pub fn dedupe_by_id(assignments: Vec<Assignment>) -> Vec<Assignment> {
    let mut seen = HashSet::new();
    assignments
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect()
}

/// Per-status counts of a cycle's assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    pub total_assignments: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub submitted: usize,
    pub published: usize,
    pub acknowledged: usize,
    /// Percentage of assignments that are submitted, published or acknowledged.
    pub completion_rate: f64,
}

impl AssignmentStats {
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        let count = |status: AppraisalStatus| assignments.iter().filter(|a| a.status == status).count();

        let total_assignments = assignments.len();
        let submitted = count(AppraisalStatus::Submitted);
        let published = count(AppraisalStatus::Published);
        let acknowledged = count(AppraisalStatus::Acknowledged);
        let completion_rate = if total_assignments > 0 {
            (submitted + published + acknowledged) as f64 / total_assignments as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_assignments,
            not_started: count(AppraisalStatus::NotStarted),
            in_progress: count(AppraisalStatus::InProgress),
            submitted,
            published,
            acknowledged,
            completion_rate,
        }
    }
}
