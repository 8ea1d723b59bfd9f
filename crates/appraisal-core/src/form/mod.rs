//! Form state holders.
//!
//! Each form mirrors the editable fields of one page. It is initialized from
//! defaults (create) or from a loaded record (edit), supports index-addressed
//! editing of nested rows, and on submit validates and converts the UI text
//! into the payload the backend expects. Validation failures are
//! [`Error::Validation`] with the message shown to the user.

mod assignment;
mod cycle;
mod dispute;
mod evaluation;
mod template;

pub use assignment::{AssignmentForm, AssignmentPayload};
pub use cycle::{CycleForm, CyclePayload, TemplateAssignmentPayload, TemplateAssignmentRow};
pub use dispute::{
    AcknowledgeForm, AcknowledgePayload, DisputeForm, DisputePayload, ResolutionAction,
    ResolutionDto, ResolutionForm, ResolvePayload,
};
pub use evaluation::{EvaluationForm, RecordPayload, SubmitAction};
pub use template::{CriterionDraft, TemplateForm, TemplatePayload};

use chrono::NaiveDate;

use crate::{Error, Result};

/// Rows of a nested list, edited by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows<T>(Vec<T>);

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Rows<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self(rows)
    }

    pub fn push(&mut self, row: T) {
        self.0.push(row);
    }

    /// Edit the row at `index` in place.
    pub fn update(&mut self, index: usize, edit: impl FnOnce(&mut T)) -> Result<()> {
        let slot = self.0.get_mut(index).ok_or_else(|| out_of_range(index))?;
        edit(slot);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.0.len() {
            return Err(out_of_range(index));
        }
        Ok(self.0.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> FromIterator<T> for Rows<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn out_of_range(index: usize) -> Error {
    Error::validation(format!("row {} does not exist", index + 1))
}

/// Split newline-delimited text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_lines(items: &[String]) -> String {
    items.join("\n")
}

/// Split comma separated text into trimmed, non-empty items.
pub fn split_commas(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn required(value: &str, message: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(message));
    }
    Ok(value.to_string())
}

/// Parse an optional `YYYY-MM-DD` input. Blank input is `None`.
pub(crate) fn optional_date(field: &str, value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::validation(format!("{field} must be a date (YYYY-MM-DD)")))
}

pub(crate) fn required_date(field: &str, value: &str) -> Result<NaiveDate> {
    optional_date(field, value)?.ok_or_else(|| Error::validation(format!("{field} is required")))
}

/// Parse an optional numeric input. Blank input is `None`.
pub(crate) fn optional_number(field: &str, value: &str) -> Result<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| Error::validation(format!("{field} must be a number")))
}
