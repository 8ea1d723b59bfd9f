use serde::Serialize;

use super::{Rows, join_lines, optional_number, split_lines};
use crate::assignment::AppraisalStatus;
use crate::id::ResourceId;
use crate::record::{EvaluationFormData, Rating};
use crate::Result;

/// A manager's evaluation of one assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationForm {
    pub ratings: Rows<Rating>,
    pub manager_summary: String,
    /// Newline separated.
    pub strengths: String,
    /// Newline separated.
    pub improvement_areas: String,
    pub existing_record_id: Option<ResourceId>,
    pub existing_status: Option<AppraisalStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub ratings: Vec<Rating>,
    pub manager_summary: String,
    pub strengths: String,
    pub improvement_areas: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppraisalStatus>,
}

/// What "Submit" turns into for this form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    /// A record already exists: submit it by id.
    SubmitExisting(ResourceId),
    /// No record yet: create one already marked as submitted.
    CreateSubmitted(RecordPayload),
}

impl EvaluationForm {
    /// Start from the existing record if there is one, then fill any
    /// template criterion it has no rating for with a zero score.
    pub fn from_form_data(data: &EvaluationFormData) -> Self {
        let mut form = Self::default();

        if let Some(record) = &data.existing_record {
            form.ratings = Rows::new(record.ratings.clone());
            form.manager_summary = record.summary().unwrap_or_default().to_string();
            form.strengths = join_lines(&record.strengths);
            form.improvement_areas = join_lines(&record.improvement_areas);
            form.existing_record_id = Some(record.id.clone());
            form.existing_status = Some(record.status.clone());
        }

        if let Some(template) = data.template() {
            for criterion in &template.criteria {
                if !form.ratings.iter().any(|r| r.key == criterion.key) {
                    form.ratings.push(Rating {
                        key: criterion.key.clone(),
                        score: 0.0,
                        comment: String::new(),
                    });
                }
            }
        }

        form
    }

    /// Submitted (or later) records are shown read-only.
    pub fn is_locked(&self) -> bool {
        self.existing_status.as_ref().is_some_and(|status| {
            status.is_submitted()
                || matches!(
                    status,
                    AppraisalStatus::Published | AppraisalStatus::Acknowledged
                )
        })
    }

    pub fn set_score(&mut self, index: usize, score: f64) -> Result<()> {
        self.ratings.update(index, |rating| rating.score = score)
    }

    /// Score from posted text; blank is zero, anything not a finite number is rejected.
    pub fn set_score_text(&mut self, index: usize, raw: &str) -> Result<()> {
        let key = self.ratings.get(index).map(|r| r.key.clone()).unwrap_or_default();
        let score = optional_number(&format!("Score for {key}"), raw)?.unwrap_or(0.0);
        self.set_score(index, score)
    }

    pub fn set_comment(&mut self, index: usize, comment: impl Into<String>) -> Result<()> {
        let comment = comment.into();
        self.ratings.update(index, |rating| rating.comment = comment)
    }

    pub fn rating_for(&self, key: &str) -> Option<&Rating> {
        self.ratings.iter().find(|r| r.key == key)
    }

    /// Body for "Save Draft".
    pub fn draft_payload(&self) -> RecordPayload {
        RecordPayload {
            ratings: self.ratings.as_slice().to_vec(),
            manager_summary: self.manager_summary.trim().to_string(),
            strengths: join_lines(&split_lines(&self.strengths)),
            improvement_areas: join_lines(&split_lines(&self.improvement_areas)),
            status: None,
        }
    }

    pub fn submit_action(&self) -> SubmitAction {
        match &self.existing_record_id {
            Some(id) => SubmitAction::SubmitExisting(id.clone()),
            None => SubmitAction::CreateSubmitted(RecordPayload {
                status: Some(AppraisalStatus::ManagerSubmitted),
                ..self.draft_payload()
            }),
        }
    }
}
