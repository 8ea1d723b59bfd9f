//! References between backend records.
//!
//! The backend sometimes populates a reference with the referenced document
//! and sometimes sends only its id. `Ref<T>` accepts both.

use serde::{Deserialize, Serialize};

use crate::id::ResourceId;

/// A reference that is either a bare id or a populated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Populated(T),
    Id(ResourceId),
}

/// Summaries that can be shown in a table cell.
pub trait Label {
    fn label(&self) -> String;
    fn summary_id(&self) -> Option<&ResourceId>;
}

impl<T: Label> Ref<T> {
    /// Id of the referenced record, if known.
    pub fn id(&self) -> Option<&ResourceId> {
        match self {
            Ref::Populated(summary) => summary.summary_id(),
            Ref::Id(id) => Some(id),
        }
    }

    /// Display label of a populated reference; `None` for bare ids.
    pub fn label(&self) -> Option<String> {
        match self {
            Ref::Populated(summary) => Some(summary.label()).filter(|l| !l.trim().is_empty()),
            Ref::Id(_) => None,
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Populated(summary) => Some(summary),
            Ref::Id(_) => None,
        }
    }
}

/// Label of an optional reference, or `fallback` when absent or unpopulated.
pub fn label_or<T: Label>(reference: Option<&Ref<T>>, fallback: &str) -> String {
    reference
        .and_then(Ref::label)
        .unwrap_or_else(|| fallback.to_string())
}

/// A named record (cycle, template, department) as populated into another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Named {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
}

impl Label for Named {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn summary_id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

/// An employee or manager profile as populated into another record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
}

impl PersonSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Label for PersonSummary {
    fn label(&self) -> String {
        self.full_name()
    }

    fn summary_id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_reference() {
        let r: Ref<Named> = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(r.id(), Some(&ResourceId::new("abc123")));
        assert_eq!(r.label(), None);
    }

    #[test]
    fn test_populated_reference() {
        let r: Ref<Named> = serde_json::from_str(r#"{"_id": "c1", "name": "Q4 Review"}"#).unwrap();
        assert_eq!(r.id(), Some(&ResourceId::new("c1")));
        assert_eq!(r.label().as_deref(), Some("Q4 Review"));
    }

    #[test]
    fn test_populated_reference_without_id() {
        let r: Ref<PersonSummary> =
            serde_json::from_str(r#"{"firstName": "Ada", "lastName": "Lovelace"}"#).unwrap();
        assert_eq!(r.id(), None);
        assert_eq!(r.label().as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_label_or_fallback() {
        let missing: Option<Ref<PersonSummary>> = None;
        assert_eq!(label_or(missing.as_ref(), "No manager"), "No manager");
    }
}
