use serde::Serialize;

use super::{optional_number, required};
use crate::dispute::Dispute;
use crate::{Error, Result};

/// An employee's dispute against a published appraisal record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisputeForm {
    pub record_id: String,
    pub reason: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputePayload {
    pub appraisal_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DisputeForm {
    pub fn for_record(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            ..Default::default()
        }
    }

    pub fn to_payload(&self) -> Result<DisputePayload> {
        let appraisal_id = required(&self.record_id, "No appraisal record specified")?;
        let reason = required(&self.reason, "Reason is required")?;
        let details = self.details.trim();

        Ok(DisputePayload {
            appraisal_id,
            reason,
            details: (!details.is_empty()).then(|| details.to_string()),
        })
    }
}

/// Acknowledgement of a published appraisal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcknowledgeForm {
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcknowledgePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AcknowledgeForm {
    pub fn to_payload(&self) -> AcknowledgePayload {
        let comment = self.comment.trim();
        AcknowledgePayload {
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionAction {
    #[default]
    Approve,
    Reject,
}

impl ResolutionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionAction::Approve => "approve",
            ResolutionAction::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ResolutionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(ResolutionAction::Approve),
            "reject" => Ok(ResolutionAction::Reject),
            other => Err(Error::validation(format!("unknown resolution action: {other}"))),
        }
    }
}

impl Serialize for ResolutionAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// HR's resolution of a dispute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionForm {
    pub action: ResolutionAction,
    pub adjusted_score: String,
    pub adjusted_rating_label: String,
    pub resolution_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDto {
    pub resolution_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_rating_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvePayload {
    pub dto: ResolutionDto,
    pub action: ResolutionAction,
}

impl ResolutionForm {
    /// Prefill the adjusted fields from a previous adjustment.
    pub fn from_dispute(dispute: &Dispute) -> Self {
        let mut form = Self::default();
        if let Some(score) = dispute.adjusted_score {
            form.adjusted_score = score.to_string();
            form.adjusted_rating_label = dispute.adjusted_rating_label.clone().unwrap_or_default();
        }
        form
    }

    pub fn to_payload(&self) -> Result<ResolvePayload> {
        let resolution_summary = required(&self.resolution_summary, "Resolution summary is required")?;

        let (adjusted_score, adjusted_rating_label) = match self.action {
            ResolutionAction::Approve => match optional_number("Adjusted score", &self.adjusted_score)? {
                Some(score) => (Some(score), Some(self.adjusted_rating_label.trim().to_string())),
                None => (None, None),
            },
            ResolutionAction::Reject => (None, None),
        };

        Ok(ResolvePayload {
            dto: ResolutionDto {
                resolution_summary,
                adjusted_score,
                adjusted_rating_label,
            },
            action: self.action,
        })
    }
}
