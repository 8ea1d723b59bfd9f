use serde::Serialize;

use crate::id::ResourceId;
use crate::{Error, Result};

/// Bulk assignment creation: one template, many employees, one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentForm {
    pub cycle_id: String,
    pub template_id: String,
    /// Ids ticked in the employee picker, in click order.
    pub employee_ids: Vec<String>,
    /// Raw JSON array of ids; replaces the ticked ids when non-empty.
    pub employee_ids_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub template_id: String,
    pub employee_ids: Vec<String>,
}

impl AssignmentForm {
    pub fn with_cycle(cycle_id: impl Into<String>) -> Self {
        Self {
            cycle_id: cycle_id.into(),
            ..Default::default()
        }
    }

    pub fn is_selected(&self, employee_id: &str) -> bool {
        self.employee_ids.iter().any(|id| id == employee_id)
    }

    /// Validate and build the target cycle id plus request body.
    pub fn to_payload(&self) -> Result<(ResourceId, AssignmentPayload)> {
        let cycle_id = self.cycle_id.trim();
        if cycle_id.is_empty() {
            return Err(Error::validation("Please select a cycle"));
        }
        let template_id = self.template_id.trim();
        if template_id.is_empty() {
            return Err(Error::validation("Please select a template"));
        }

        let employee_ids = if self.employee_ids_json.trim().is_empty() {
            self.employee_ids.clone()
        } else {
            parse_employee_ids(&self.employee_ids_json)?
        };

        if employee_ids.is_empty() {
            return Err(Error::validation(
                "Please select at least one employee or provide employee IDs",
            ));
        }

        Ok((
            ResourceId::from(cycle_id),
            AssignmentPayload {
                template_id: template_id.to_string(),
                employee_ids,
            },
        ))
    }
}

fn parse_employee_ids(json: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| Error::validation("Invalid JSON format for employee IDs"))?;
    let serde_json::Value::Array(items) = value else {
        return Err(Error::validation("Employee IDs must be a JSON array"));
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(id) => Ok(id),
            _ => Err(Error::validation("Employee IDs must be a JSON array of strings")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AssignmentForm {
        AssignmentForm {
            cycle_id: "c1".to_string(),
            template_id: "t1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_employees_is_rejected() {
        assert_eq!(
            form().to_payload().unwrap_err(),
            Error::Validation(
                "Please select at least one employee or provide employee IDs".to_string()
            )
        );

        let mut empty_json = form();
        empty_json.employee_ids_json = "[]".to_string();
        assert!(empty_json.to_payload().is_err());
    }

    #[test]
    fn test_json_replaces_checked_ids() {
        let mut form = form();
        form.employee_ids = vec!["e1".to_string()];
        form.employee_ids_json = r#"["e7", "e8"]"#.to_string();

        let (cycle, payload) = form.to_payload().unwrap();
        assert_eq!(cycle.as_str(), "c1");
        assert_eq!(payload.employee_ids, vec!["e7", "e8"]);
    }

    #[test]
    fn test_json_errors() {
        let mut form = form();
        form.employee_ids_json = r#"{"ids": []}"#.to_string();
        assert_eq!(
            form.to_payload().unwrap_err(),
            Error::Validation("Employee IDs must be a JSON array".to_string())
        );

        form.employee_ids_json = "[e1".to_string();
        assert_eq!(
            form.to_payload().unwrap_err(),
            Error::Validation("Invalid JSON format for employee IDs".to_string())
        );
    }

    #[test]
    fn test_checked_ids_are_sent() {
        let mut form = form();
        form.employee_ids = vec!["e2".to_string()];
        assert!(form.is_selected("e2"));
        assert!(!form.is_selected("e1"));

        let (_, payload) = form.to_payload().unwrap();
        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json, serde_json::json!({"templateId": "t1", "employeeIds": ["e2"]}));
    }
}
