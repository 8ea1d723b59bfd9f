use serde::Serialize;

use super::{Rows, optional_number, required, split_commas};
use crate::cycle::CycleType;
use crate::template::{Criterion, RatingScale, ScaleType, Template};
use crate::{Error, Result};

/// The "new criterion" inputs, kept as text until added.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionDraft {
    pub key: String,
    pub title: String,
    pub details: String,
    pub weight: String,
    pub max_score: String,
    pub required: bool,
}

impl Default for CriterionDraft {
    fn default() -> Self {
        Self {
            key: String::new(),
            title: String::new(),
            details: String::new(),
            weight: "0".to_string(),
            max_score: "5".to_string(),
            required: false,
        }
    }
}

impl CriterionDraft {
    fn into_criterion(self) -> Result<Criterion> {
        let key = self.key.trim();
        let title = self.title.trim();
        if key.is_empty() || title.is_empty() {
            return Err(Error::validation("Key and title are required for criteria"));
        }
        let details = self.details.trim();

        Ok(Criterion {
            key: key.to_string(),
            title: title.to_string(),
            details: (!details.is_empty()).then(|| details.to_string()),
            weight: optional_number("Weight", &self.weight)?,
            max_score: optional_number("Max score", &self.max_score)?,
            required: self.required,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateForm {
    pub name: String,
    pub description: String,
    pub template_type: CycleType,
    pub scale_type: ScaleType,
    pub scale_min: String,
    pub scale_max: String,
    pub scale_step: String,
    /// Comma separated.
    pub scale_labels: String,
    pub instructions: String,
    pub is_active: bool,
    pub criteria: Rows<Criterion>,
}

impl Default for TemplateForm {
    fn default() -> Self {
        let scale = RatingScale::default();
        Self {
            name: String::new(),
            description: String::new(),
            template_type: CycleType::default(),
            scale_type: scale.scale_type,
            scale_min: scale.min.to_string(),
            scale_max: scale.max.to_string(),
            scale_step: scale.step.map(|s| s.to_string()).unwrap_or_default(),
            scale_labels: String::new(),
            instructions: String::new(),
            is_active: true,
            criteria: Rows::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub name: String,
    pub description: String,
    pub template_type: CycleType,
    pub rating_scale: RatingScale,
    pub criteria: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub is_active: bool,
}

impl TemplateForm {
    pub fn from_template(template: &Template) -> Self {
        let scale = &template.rating_scale;
        Self {
            name: template.name.clone(),
            description: template.description.clone().unwrap_or_default(),
            template_type: template.template_type,
            scale_type: scale.scale_type,
            scale_min: scale.min.to_string(),
            scale_max: scale.max.to_string(),
            scale_step: scale.step.map(|s| s.to_string()).unwrap_or_default(),
            scale_labels: scale.labels.join(", "),
            instructions: template.instructions.clone().unwrap_or_default(),
            is_active: template.is_active,
            criteria: Rows::new(template.criteria.clone()),
        }
    }

    /// Switching the scale type resets the bounds to that scale's defaults.
    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        let (min, max) = scale_type.bounds();
        self.scale_type = scale_type;
        self.scale_min = min.to_string();
        self.scale_max = max.to_string();
    }

    pub fn add_criterion(&mut self, draft: CriterionDraft) -> Result<()> {
        let criterion = draft.into_criterion()?;
        if self.criteria.iter().any(|c| c.key == criterion.key) {
            return Err(Error::validation(format!(
                "A criterion with key '{}' already exists",
                criterion.key
            )));
        }
        self.criteria.push(criterion);
        Ok(())
    }

    pub fn remove_criterion(&mut self, index: usize) -> Result<()> {
        self.criteria.remove(index).map(|_| ())
    }

    pub fn to_payload(&self) -> Result<TemplatePayload> {
        let name = required(&self.name, "Template name is required")?;
        let min = optional_number("Min value", &self.scale_min)?
            .ok_or_else(|| Error::validation("Min value is required"))?;
        let max = optional_number("Max value", &self.scale_max)?
            .ok_or_else(|| Error::validation("Max value is required"))?;
        if min >= max {
            return Err(Error::validation("Max value must be greater than min value"));
        }
        let instructions = self.instructions.trim();

        Ok(TemplatePayload {
            name,
            description: self.description.trim().to_string(),
            template_type: self.template_type,
            rating_scale: RatingScale {
                scale_type: self.scale_type,
                min,
                max,
                step: optional_number("Step", &self.scale_step)?,
                labels: split_commas(&self.scale_labels),
            },
            criteria: self.criteria.as_slice().to_vec(),
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(key: &str, title: &str) -> CriterionDraft {
        CriterionDraft {
            key: key.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_criterion_requires_key_and_title() {
        let mut form = TemplateForm::default();
        assert_eq!(
            form.add_criterion(draft("quality", "")).unwrap_err(),
            Error::Validation("Key and title are required for criteria".to_string())
        );
        assert!(form.criteria.is_empty());

        form.add_criterion(draft("quality", "Work quality")).unwrap();
        assert_eq!(form.criteria.len(), 1);
        assert_eq!(form.criteria.get(0).and_then(|c| c.max_score), Some(5.0));
        assert!(form.add_criterion(draft("quality", "Again")).is_err());
    }

    #[test]
    fn test_payload_shape() {
        let mut form = TemplateForm {
            name: "Engineering".to_string(),
            scale_labels: "Poor, Fair, Good, Great, Outstanding".to_string(),
            ..Default::default()
        };
        form.add_criterion(draft("delivery", "Delivery")).unwrap();
        form.add_criterion(draft("teamwork", "Teamwork")).unwrap();
        form.remove_criterion(0).unwrap();

        let json = serde_json::to_value(form.to_payload().unwrap()).unwrap();
        assert_eq!(json["ratingScale"]["type"], "FIVE_POINT");
        assert_eq!(json["ratingScale"]["labels"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["criteria"][0]["key"], "teamwork");
        assert_eq!(json["isActive"], true);
        assert!(json.get("instructions").is_none());
    }

    #[test]
    fn test_scale_bounds_checked() {
        let mut form = TemplateForm {
            name: "Sales".to_string(),
            ..Default::default()
        };
        form.set_scale_type(ScaleType::TenPoint);
        assert_eq!(form.scale_max, "10");
        form.scale_min = "10".to_string();
        assert!(form.to_payload().is_err());
    }
}
