//! Appraisal records: the filled-in evaluation of one assignment.
//!
//! Records arrive in several historical shapes. Everything is normalized
//! here so pages only ever see one `AppraisalRecord`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::{AppraisalStatus, Assignment};
use crate::id::ResourceId;
use crate::reference::{Label, Named, PersonSummary, Ref, label_or};
use crate::serde_util;
use crate::template::TemplateSummary;

/// How long after publication an employee may still dispute a rating.
pub const DISPUTE_WINDOW_DAYS: i64 = 7;

/// Score and comment for one criterion.
///
/// Accepts `{key, ratingValue, comments}` as well as the older
/// `{criterionKey, score, comment}`; always serializes as the latter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRating")]
pub struct Rating {
    #[serde(rename = "criterionKey")]
    pub key: String,
    pub score: f64,
    pub comment: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRating {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    criterion_key: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    rating_value: Option<f64>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    comments: Option<String>,
}

impl From<RawRating> for Rating {
    fn from(raw: RawRating) -> Self {
        Self {
            key: raw.criterion_key.or(raw.key).unwrap_or_default(),
            score: raw.score.or(raw.rating_value).unwrap_or(0.0),
            comment: raw
                .comment
                .filter(|c| !c.is_empty())
                .or(raw.comments)
                .unwrap_or_default(),
        }
    }
}

/// The assignment as populated into a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(rename = "cycleId", default)]
    pub cycle: Option<Ref<Named>>,
    #[serde(rename = "templateId", default)]
    pub template: Option<Ref<Named>>,
    #[serde(rename = "employeeProfileId", default)]
    pub employee: Option<Ref<PersonSummary>>,
}

impl Label for AssignmentSummary {
    fn label(&self) -> String {
        label_or(self.employee.as_ref(), "")
    }

    fn summary_id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

/// An appraisal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalRecord {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(rename = "assignmentId", default)]
    pub assignment: Option<Ref<AssignmentSummary>>,
    #[serde(default, deserialize_with = "serde_util::null_as_default")]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub manager_summary: Option<String>,
    /// Older records store the summary as `overallComment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_comment: Option<String>,
    #[serde(default, deserialize_with = "serde_util::text_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "serde_util::text_list")]
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub overall_rating_label: Option<String>,
    #[serde(default)]
    pub status: AppraisalStatus,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub manager_submitted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub hr_published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl AppraisalRecord {
    pub fn summary(&self) -> Option<&str> {
        self.manager_summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.overall_comment.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// When HR published the record; falls back to the generic publish timestamp.
    pub fn publication_time(&self) -> Option<DateTime<Utc>> {
        self.hr_published_at.or(self.published_at)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }

    /// Whether the employee may still raise a dispute at `now`.
    ///
    /// Requires a publication time no more than seven days before `now`
    /// (inclusive) and no acknowledgement.
    pub fn can_file_dispute(&self, now: DateTime<Utc>) -> bool {
        let Some(published) = self.publication_time() else {
            return false;
        };
        now - published <= Duration::days(DISPUTE_WINDOW_DAYS) && !self.is_acknowledged()
    }

    fn assignment_summary(&self) -> Option<&AssignmentSummary> {
        self.assignment.as_ref().and_then(Ref::populated)
    }

    pub fn cycle_name(&self) -> String {
        label_or(self.assignment_summary().and_then(|a| a.cycle.as_ref()), "-")
    }

    pub fn template_name(&self) -> String {
        label_or(self.assignment_summary().and_then(|a| a.template.as_ref()), "-")
    }

    pub fn employee_name(&self) -> String {
        label_or(self.assignment_summary().and_then(|a| a.employee.as_ref()), "-")
    }
}

/// Everything the evaluation page needs for one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationFormData {
    pub assignment: Assignment,
    #[serde(default)]
    pub template: Option<TemplateSummary>,
    #[serde(default)]
    pub existing_record: Option<AppraisalRecord>,
}

impl EvaluationFormData {
    /// The template to rate against: the explicit one, else the populated assignment template.
    pub fn template(&self) -> Option<&TemplateSummary> {
        self.template.as_ref().or_else(|| {
            self.assignment
                .template
                .as_ref()
                .and_then(Ref::populated)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(json: serde_json::Value) -> AppraisalRecord {
        serde_json::from_value(json).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_rating_shapes_normalize() {
        let current: Rating =
            serde_json::from_str(r#"{"key": "quality", "ratingValue": 4, "comments": "solid"}"#)
                .unwrap();
        let legacy: Rating = serde_json::from_str(
            r#"{"criterionKey": "quality", "score": 4, "comment": "solid"}"#,
        )
        .unwrap();
        assert_eq!(current, legacy);
        assert_eq!(current.score, 4.0);

        let empty: Rating = serde_json::from_str(r#"{"key": "x"}"#).unwrap();
        assert_eq!(empty.score, 0.0);
        assert_eq!(empty.comment, "");
    }

    #[test]
    fn test_rating_serializes_payload_shape() {
        let rating = Rating {
            key: "quality".to_string(),
            score: 3.0,
            comment: "ok".to_string(),
        };
        let value = serde_json::to_value(&rating).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"criterionKey": "quality", "score": 3.0, "comment": "ok"})
        );
    }

    #[test]
    fn test_strengths_text_and_list() {
        let from_text = record(serde_json::json!({
            "_id": "r1",
            "strengths": "Ownership\n\n  Mentoring  \n",
            "improvementAreas": ["Delegation", " "],
            "overallComment": "Good year"
        }));
        assert_eq!(from_text.strengths, vec!["Ownership", "Mentoring"]);
        assert_eq!(from_text.improvement_areas, vec!["Delegation"]);
        assert_eq!(from_text.summary(), Some("Good year"));
    }

    #[test]
    fn test_dispute_window_inclusive_boundary() {
        let r = record(serde_json::json!({
            "_id": "r1",
            "status": "PUBLISHED",
            "publishedAt": "2025-03-01T12:00:00Z"
        }));

        assert!(r.can_file_dispute(at(2025, 3, 1, 12)));
        assert!(r.can_file_dispute(at(2025, 3, 8, 12)));
        assert!(!r.can_file_dispute(at(2025, 3, 8, 12) + Duration::seconds(1)));
    }

    #[test]
    fn test_dispute_requires_publication_and_no_acknowledgement() {
        let unpublished = record(serde_json::json!({"_id": "r1", "status": "MANAGER_SUBMITTED"}));
        assert!(!unpublished.can_file_dispute(at(2025, 3, 2, 0)));

        let acknowledged = record(serde_json::json!({
            "_id": "r2",
            "publishedAt": "2025-03-01T00:00:00Z",
            "acknowledgedAt": "2025-03-02T00:00:00Z"
        }));
        assert!(!acknowledged.can_file_dispute(at(2025, 3, 3, 0)));
    }

    #[test]
    fn test_hr_publication_takes_precedence() {
        let r = record(serde_json::json!({
            "_id": "r1",
            "publishedAt": "2025-03-01T00:00:00Z",
            "hrPublishedAt": "2025-03-10T00:00:00Z"
        }));
        assert!(r.can_file_dispute(at(2025, 3, 15, 0)));
    }

    #[test]
    fn test_record_names_from_populated_assignment() {
        let r = record(serde_json::json!({
            "_id": "r1",
            "assignmentId": {
                "_id": "a1",
                "cycleId": {"name": "Q4"},
                "templateId": "t1",
                "employeeProfileId": {"firstName": "Grace", "lastName": "Hopper"}
            }
        }));
        assert_eq!(r.cycle_name(), "Q4");
        assert_eq!(r.template_name(), "-");
        assert_eq!(r.employee_name(), "Grace Hopper");
    }
}
