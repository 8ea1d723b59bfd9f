use chrono::NaiveDate;
use serde::Serialize;

use super::{Rows, optional_date, required, required_date};
use crate::cycle::{Cycle, CycleType};
use crate::reference::Ref;
use crate::{Error, Result};

/// One template-assignment row of the cycle form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateAssignmentRow {
    pub template_id: String,
    pub department_ids: Vec<String>,
}

/// Create / edit state of a cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleForm {
    pub name: String,
    pub description: String,
    pub cycle_type: CycleType,
    /// Dates are edited as `YYYY-MM-DD` text.
    pub start_date: String,
    pub end_date: String,
    pub manager_due_date: String,
    pub employee_acknowledgement_due_date: String,
    pub template_assignments: Rows<TemplateAssignmentRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAssignmentPayload {
    pub template_id: String,
    pub department_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePayload {
    pub name: String,
    pub description: String,
    pub cycle_type: CycleType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_acknowledgement_due_date: Option<NaiveDate>,
    /// Absent rather than empty when no templates are attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_assignments: Option<Vec<TemplateAssignmentPayload>>,
}

impl CycleForm {
    pub fn from_cycle(cycle: &Cycle) -> Self {
        let date = |d: &chrono::DateTime<chrono::Utc>| d.format("%Y-%m-%d").to_string();

        Self {
            name: cycle.name.clone(),
            description: cycle.description.clone().unwrap_or_default(),
            cycle_type: cycle.cycle_type.unwrap_or_default(),
            start_date: cycle.start_date.as_ref().map(date).unwrap_or_default(),
            end_date: cycle.end_date.as_ref().map(date).unwrap_or_default(),
            manager_due_date: cycle.manager_due_date.as_ref().map(date).unwrap_or_default(),
            employee_acknowledgement_due_date: cycle
                .employee_acknowledgement_due_date
                .as_ref()
                .map(date)
                .unwrap_or_default(),
            template_assignments: cycle
                .template_assignments
                .iter()
                .map(|ta| TemplateAssignmentRow {
                    template_id: ta.template.id().map(|id| id.to_string()).unwrap_or_default(),
                    department_ids: ta
                        .departments
                        .iter()
                        .filter_map(Ref::id)
                        .map(|id| id.to_string())
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn add_template_assignment(&mut self) {
        self.template_assignments.push(TemplateAssignmentRow::default());
    }

    pub fn remove_template_assignment(&mut self, index: usize) -> Result<()> {
        self.template_assignments.remove(index).map(|_| ())
    }

    pub fn to_payload(&self) -> Result<CyclePayload> {
        let name = required(&self.name, "Cycle name is required")?;
        let start_date = required_date("Start date", &self.start_date)?;
        let end_date = required_date("End date", &self.end_date)?;
        let manager_due_date = optional_date("Manager due date", &self.manager_due_date)?;
        let employee_acknowledgement_due_date = optional_date(
            "Employee acknowledgement due date",
            &self.employee_acknowledgement_due_date,
        )?;

        let mut rows = Vec::with_capacity(self.template_assignments.len());
        for (index, row) in self.template_assignments.iter().enumerate() {
            if row.template_id.trim().is_empty() {
                return Err(Error::validation(format!(
                    "Select a template for template assignment {}",
                    index + 1
                )));
            }
            rows.push(TemplateAssignmentPayload {
                template_id: row.template_id.trim().to_string(),
                department_ids: row.department_ids.clone(),
            });
        }

        Ok(CyclePayload {
            name,
            description: self.description.trim().to_string(),
            cycle_type: self.cycle_type,
            start_date,
            end_date,
            manager_due_date,
            employee_acknowledgement_due_date,
            template_assignments: if rows.is_empty() { None } else { Some(rows) },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CycleForm {
        CycleForm {
            name: "Q4 2025 Annual Review".to_string(),
            start_date: "2025-10-01".to_string(),
            end_date: "2025-12-31".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_omits_empty_template_assignments() {
        let payload = filled().to_payload().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cycleType"], "ANNUAL");
        assert_eq!(json["startDate"], "2025-10-01");
        assert!(json.get("templateAssignments").is_none());
        assert!(json.get("managerDueDate").is_none());
    }

    #[test]
    fn test_required_fields() {
        let mut form = filled();
        form.name = "  ".to_string();
        assert_eq!(
            form.to_payload().unwrap_err(),
            Error::Validation("Cycle name is required".to_string())
        );

        let mut form = filled();
        form.end_date.clear();
        assert_eq!(
            form.to_payload().unwrap_err(),
            Error::Validation("End date is required".to_string())
        );
    }

    #[test]
    fn test_template_rows_add_and_remove() {
        let mut form = filled();
        form.template_assignments.push(TemplateAssignmentRow {
            template_id: "t1".to_string(),
            department_ids: vec!["d1".to_string(), "d2".to_string()],
        });
        form.add_template_assignment();
        assert!(form.to_payload().is_err());

        form.remove_template_assignment(1).unwrap();
        let payload = form.to_payload().unwrap();
        let rows = payload.template_assignments.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].template_id, "t1");
        assert_eq!(rows[0].department_ids, vec!["d1", "d2"]);
    }

    #[test]
    fn test_edit_round_trip_skips_null_template() {
        let cycle: Cycle = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "name": "Probation",
            "description": null,
            "cycleType": "PROBATIONARY",
            "startDate": "2025-01-01T00:00:00.000Z",
            "endDate": "2025-03-31T00:00:00.000Z",
            "managerDueDate": "2025-03-15T00:00:00.000Z",
            "templateAssignments": [
                {"templateId": null, "departmentIds": []},
                {"templateId": {"_id": "t9", "name": "Probation"}, "departmentIds": ["d1"]}
            ]
        }))
        .unwrap();

        let form = CycleForm::from_cycle(&cycle);
        assert_eq!(form.start_date, "2025-01-01");
        assert_eq!(form.manager_due_date, "2025-03-15");
        assert_eq!(form.employee_acknowledgement_due_date, "");
        assert_eq!(form.template_assignments.len(), 1);
        assert_eq!(form.template_assignments.as_slice()[0].template_id, "t9");
        assert!(form.to_payload().is_ok());
    }
}
