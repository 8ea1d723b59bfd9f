//! Appraisal templates: rating scale and weighted criteria.

use serde::{Deserialize, Serialize};

use crate::cycle::CycleType;
use crate::id::ResourceId;
use crate::serde_util;

/// Rating scale kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleType {
    ThreePoint,
    FivePoint,
    TenPoint,
}

impl ScaleType {
    pub const ALL: [ScaleType; 3] = [ScaleType::ThreePoint, ScaleType::FivePoint, ScaleType::TenPoint];

    pub fn title(&self) -> &'static str {
        match self {
            ScaleType::ThreePoint => "3-Point Scale",
            ScaleType::FivePoint => "5-Point Scale",
            ScaleType::TenPoint => "10-Point Scale",
        }
    }

    /// Default `(min, max)` bounds for the scale.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            ScaleType::ThreePoint => (1.0, 3.0),
            ScaleType::FivePoint => (1.0, 5.0),
            ScaleType::TenPoint => (1.0, 10.0),
        }
    }
}

impl Default for ScaleType {
    fn default() -> Self {
        ScaleType::FivePoint
    }
}

impl std::fmt::Display for ScaleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleType::ThreePoint => write!(f, "THREE_POINT"),
            ScaleType::FivePoint => write!(f, "FIVE_POINT"),
            ScaleType::TenPoint => write!(f, "TEN_POINT"),
        }
    }
}

impl std::str::FromStr for ScaleType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScaleType::ALL
            .into_iter()
            .find(|t| t.to_string() == s.trim())
            .ok_or_else(|| crate::Error::validation(format!("unknown rating scale: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingScale {
    #[serde(rename = "type", default, deserialize_with = "serde_util::known_or_default")]
    pub scale_type: ScaleType,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, deserialize_with = "serde_util::null_as_default")]
    pub labels: Vec<String>,
}

impl Default for RatingScale {
    fn default() -> Self {
        let scale_type = ScaleType::default();
        let (min, max) = scale_type.bounds();
        Self {
            scale_type,
            min,
            max,
            step: Some(1.0),
            labels: Vec::new(),
        }
    }
}

/// One evaluation criterion of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

/// An appraisal template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "serde_util::known_or_default")]
    pub template_type: CycleType,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub rating_scale: RatingScale,
    #[serde(default, deserialize_with = "serde_util::null_as_default")]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Template {
    /// Sum of criterion weights, treating missing weights as zero.
    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().filter_map(|c| c.weight).sum()
    }
}

/// The template shape embedded in an evaluation form response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "serde_util::null_as_default")]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub rating_scale: Option<RatingScale>,
}

impl crate::reference::Label for TemplateSummary {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn summary_id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let json = r#"{
            "_id": "t1",
            "name": "Engineering Annual",
            "templateType": "ANNUAL",
            "isActive": true,
            "ratingScale": {"type": "FIVE_POINT", "min": 1, "max": 5, "labels": ["Poor", "Fair", "Good", "Very Good", "Excellent"]},
            "criteria": [
                {"key": "quality", "title": "Quality of work", "weight": 60, "maxScore": 5, "required": true},
                {"key": "teamwork", "title": "Teamwork", "weight": 40}
            ]
        }"#;

        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.criteria.len(), 2);
        assert_eq!(template.rating_scale.labels.len(), 5);
        assert!(template.criteria[0].required);
        assert!(!template.criteria[1].required);
        assert_eq!(template.total_weight(), 100.0);
    }

    #[test]
    fn test_template_defaults() {
        let template: Template =
            serde_json::from_str(r#"{"_id": "t2", "name": "Bare", "criteria": null}"#).unwrap();
        assert!(template.is_active);
        assert_eq!(template.template_type, CycleType::Annual);
        assert_eq!(template.rating_scale.scale_type, ScaleType::FivePoint);
        assert!(template.criteria.is_empty());
    }

    #[test]
    fn test_unknown_types_fall_back_to_defaults() {
        let template: Template = serde_json::from_str(
            r#"{"_id": "t3", "name": "Legacy", "templateType": "QUARTERLY", "ratingScale": {"type": null, "min": 0, "max": 4}}"#,
        )
        .unwrap();
        assert_eq!(template.template_type, CycleType::Annual);
        assert_eq!(template.rating_scale.scale_type, ScaleType::FivePoint);
        assert_eq!(template.rating_scale.max, 4.0);
    }
}
