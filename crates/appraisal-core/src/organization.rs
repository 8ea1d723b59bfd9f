//! Organization structure records used by the performance pages.

use serde::{Deserialize, Serialize};

use crate::id::ResourceId;

/// A department, used to scope template assignments within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// An employee profile offered in the assignment picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub employee_number: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
