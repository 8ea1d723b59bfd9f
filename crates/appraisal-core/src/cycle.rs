//! Appraisal cycles.
//!
//! A cycle is a time-boxed appraisal period. Templates can be attached to a
//! cycle per department.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::id::ResourceId;
use crate::reference::{Named, Ref};
use crate::serde_util;

/// Kind of appraisal cycle. Templates use the same set of types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleType {
    Annual,
    SemiAnnual,
    Probationary,
    Project,
    AdHoc,
}

impl CycleType {
    pub const ALL: [CycleType; 5] = [
        CycleType::Annual,
        CycleType::SemiAnnual,
        CycleType::Probationary,
        CycleType::Project,
        CycleType::AdHoc,
    ];

    /// Human readable name for select options.
    pub fn title(&self) -> &'static str {
        match self {
            CycleType::Annual => "Annual",
            CycleType::SemiAnnual => "Semi-Annual",
            CycleType::Probationary => "Probationary",
            CycleType::Project => "Project",
            CycleType::AdHoc => "Ad Hoc",
        }
    }
}

impl Default for CycleType {
    fn default() -> Self {
        CycleType::Annual
    }
}

impl std::fmt::Display for CycleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleType::Annual => write!(f, "ANNUAL"),
            CycleType::SemiAnnual => write!(f, "SEMI_ANNUAL"),
            CycleType::Probationary => write!(f, "PROBATIONARY"),
            CycleType::Project => write!(f, "PROJECT"),
            CycleType::AdHoc => write!(f, "AD_HOC"),
        }
    }
}

impl std::str::FromStr for CycleType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CycleType::ALL
            .into_iter()
            .find(|t| t.to_string() == s.trim())
            .ok_or_else(|| crate::Error::validation(format!("unknown cycle type: {s}")))
    }
}

/// A template attached to a cycle for a set of departments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAssignment {
    #[serde(rename = "templateId")]
    pub template: Ref<Named>,
    #[serde(rename = "departmentIds", default)]
    pub departments: Vec<Ref<Named>>,
}

/// An appraisal cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` when the backend sent no type or one this portal does not know.
    #[serde(default, deserialize_with = "serde_util::known")]
    pub cycle_type: Option<CycleType>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub manager_due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_util::optional_timestamp")]
    pub employee_acknowledgement_due_date: Option<DateTime<Utc>>,
    /// Entries that are null or carry a null template are dropped while parsing.
    #[serde(default, deserialize_with = "template_assignments")]
    pub template_assignments: Vec<TemplateAssignment>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Cycle {
    pub fn type_title(&self) -> &'static str {
        self.cycle_type.as_ref().map(CycleType::title).unwrap_or("-")
    }

    /// First `max` characters of the description, for list rows.
    pub fn description_excerpt(&self, max: usize) -> Option<String> {
        let description = self.description.as_deref()?.trim();
        if description.is_empty() {
            return None;
        }
        if description.chars().count() <= max {
            Some(description.to_string())
        } else {
            Some(format!("{}...", description.chars().take(max).collect::<String>()))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemplateAssignment {
    #[serde(default)]
    template_id: Option<Ref<Named>>,
    #[serde(default, deserialize_with = "serde_util::null_as_default")]
    department_ids: Vec<Ref<Named>>,
}

fn template_assignments<'de, D>(deserializer: D) -> Result<Vec<TemplateAssignment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<RawTemplateAssignment>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            entry.template_id.map(|template| TemplateAssignment {
                template,
                departments: entry.department_ids,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cycle() {
        let json = r#"{
            "_id": "c1",
            "name": "Q4 2025 Annual Review",
            "cycleType": "ANNUAL",
            "startDate": "2025-10-01T00:00:00.000Z",
            "endDate": "2025-12-31",
            "managerDueDate": null
        }"#;

        let cycle: Cycle = serde_json::from_str(json).unwrap();
        assert_eq!(cycle.id.as_str(), "c1");
        assert_eq!(cycle.cycle_type, Some(CycleType::Annual));
        assert_eq!(
            cycle.end_date.map(|d| d.format("%Y-%m-%d").to_string()).as_deref(),
            Some("2025-12-31")
        );
        assert!(cycle.manager_due_date.is_none());
        assert!(cycle.template_assignments.is_empty());
    }

    #[test]
    fn test_null_template_assignments_are_dropped() {
        let json = r#"{
            "_id": "c1",
            "name": "Mid-year",
            "cycleType": "SEMI_ANNUAL",
            "startDate": "2025-01-01T00:00:00Z",
            "endDate": "2025-06-30T00:00:00Z",
            "templateAssignments": [
                {"templateId": null, "departmentIds": ["d1"]},
                null,
                {"templateId": {"_id": "t1", "name": "Engineering"}, "departmentIds": null},
                {"templateId": "t2", "departmentIds": [{"_id": "d2", "name": "Sales"}]}
            ]
        }"#;

        let cycle: Cycle = serde_json::from_str(json).unwrap();
        assert_eq!(cycle.template_assignments.len(), 2);
        assert_eq!(
            cycle.template_assignments[0].template.id(),
            Some(&ResourceId::new("t1"))
        );
        assert!(cycle.template_assignments[0].departments.is_empty());
        assert_eq!(
            cycle.template_assignments[1].departments[0].id(),
            Some(&ResourceId::new("d2"))
        );
    }

    #[test]
    fn test_incomplete_cycle_keeps_the_list() {
        let json = r#"[
            {"_id": "c1", "name": "Annual", "cycleType": "ANNUAL", "startDate": "2025-01-01", "endDate": "2025-12-31"},
            {"_id": "c2", "name": "Draft cycle"},
            {"_id": "c3", "name": "Legacy", "cycleType": "QUARTERLY", "startDate": null}
        ]"#;

        let cycles: Vec<Cycle> = serde_json::from_str(json).unwrap();
        assert_eq!(cycles.len(), 3);
        assert_eq!(cycles[0].type_title(), "Annual");
        assert!(cycles[1].cycle_type.is_none());
        assert!(cycles[1].start_date.is_none());
        assert_eq!(cycles[2].type_title(), "-");
    }

    #[test]
    fn test_cycle_type_round_trip_names() {
        for t in CycleType::ALL {
            assert_eq!(t.to_string().parse::<CycleType>().unwrap(), t);
        }
        assert!("YEARLY".parse::<CycleType>().is_err());
    }

    #[test]
    fn test_description_excerpt() {
        let json = r#"{"_id":"c","name":"n","cycleType":"AD_HOC","startDate":"2025-01-01","endDate":"2025-01-02","description":"abcdefghij"}"#;
        let cycle: Cycle = serde_json::from_str(json).unwrap();
        assert_eq!(cycle.description_excerpt(4).as_deref(), Some("abcd..."));
        assert_eq!(cycle.description_excerpt(20).as_deref(), Some("abcdefghij"));
    }
}
