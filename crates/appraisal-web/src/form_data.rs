//! Access to posted HTML form fields.
//!
//! Forms are posted as `axum::Form<Vec<(String, String)>>` so repeated keys
//! (checkbox groups, multi-selects) survive.

/// Upper bound on indexed rows read from one post.
pub const MAX_ROWS: usize = 100;

/// Posted form fields in document order.
#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

/// What the submit button asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// Final submit.
    Save,
    /// Secondary submit, e.g. "Submit evaluation" next to "Save draft".
    Submit,
    AddRow,
    RemoveRow(usize),
}

impl FormFields {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self(fields)
    }

    /// First value posted for `name`, or `""`.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn string(&self, name: &str) -> String {
        self.get(name).to_string()
    }

    /// Every non-empty value posted for `name`.
    pub fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Checkboxes are only posted when ticked.
    pub fn checked(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).trim().parse().ok()
    }

    /// Number of indexed rows, from the `rows` hidden field, capped at [`MAX_ROWS`].
    pub fn row_count(&self) -> usize {
        self.parse::<usize>("rows").unwrap_or(0).min(MAX_ROWS)
    }

    pub fn action(&self) -> FormAction {
        match self.get("action") {
            "submit" => FormAction::Submit,
            "add_row" => FormAction::AddRow,
            other => other
                .strip_prefix("remove_row:")
                .and_then(|index| index.parse().ok())
                .map(FormAction::RemoveRow)
                .unwrap_or(FormAction::Save),
        }
    }
}

impl From<Vec<(String, String)>> for FormFields {
    fn from(fields: Vec<(String, String)>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_repeated_keys() {
        let form = fields(&[("employee", "e1"), ("name", "Q4"), ("employee", "e2"), ("employee", "")]);
        assert_eq!(form.get("name"), "Q4");
        assert_eq!(form.get("missing"), "");
        assert_eq!(form.all("employee"), vec!["e1", "e2"]);
        assert!(form.checked("employee"));
        assert!(!form.checked("is_active"));
    }

    #[test]
    fn test_row_count_is_capped() {
        assert_eq!(fields(&[]).row_count(), 0);
        assert_eq!(fields(&[("rows", "3")]).row_count(), 3);
        assert_eq!(fields(&[("rows", "-1")]).row_count(), 0);
        assert_eq!(fields(&[("rows", "2000000")]).row_count(), MAX_ROWS);
        assert_eq!(fields(&[("rows", "18446744073709551615")]).row_count(), MAX_ROWS);
    }

    #[test]
    fn test_actions() {
        assert_eq!(fields(&[]).action(), FormAction::Save);
        assert_eq!(fields(&[("action", "add_row")]).action(), FormAction::AddRow);
        assert_eq!(fields(&[("action", "remove_row:2")]).action(), FormAction::RemoveRow(2));
        assert_eq!(fields(&[("action", "remove_row:x")]).action(), FormAction::Save);
        assert_eq!(fields(&[("action", "submit")]).action(), FormAction::Submit);
    }
}
