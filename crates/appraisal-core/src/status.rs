//! Status presenter: maps lifecycle status strings to badge styles.
//!
//! Statuses are owned by the backend. The portal only reads them to pick a
//! badge and to decide which actions to show.

use serde::Serialize;

/// Visual badge class for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Success,
    Warning,
    Error,
    Info,
}

impl Badge {
    /// CSS class rendered by the pages.
    pub fn class(&self) -> &'static str {
        match self {
            Badge::Success => "badge-success",
            Badge::Warning => "badge-warning",
            Badge::Error => "badge-error",
            Badge::Info => "badge-info",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// Badge for an assignment or appraisal record status.
pub fn lifecycle_badge(status: &str) -> Badge {
    match status {
        "SUBMITTED" => Badge::Success,
        "IN_PROGRESS" => Badge::Warning,
        _ => Badge::Info,
    }
}

/// Badge for a dispute status.
pub fn dispute_badge(status: &str) -> Badge {
    match status {
        "ADJUSTED" => Badge::Success,
        "REJECTED" => Badge::Error,
        "OPEN" | "UNDER_REVIEW" => Badge::Warning,
        _ => Badge::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_badges() {
        assert_eq!(lifecycle_badge("SUBMITTED"), Badge::Success);
        assert_eq!(lifecycle_badge("IN_PROGRESS"), Badge::Warning);
        assert_eq!(lifecycle_badge("PUBLISHED").class(), "badge-info");
        assert_eq!(lifecycle_badge("NOT_STARTED"), Badge::Info);
        assert_eq!(lifecycle_badge("MANAGER_SUBMITTED"), Badge::Info);
        assert_eq!(lifecycle_badge(""), Badge::Info);
    }

    #[test]
    fn test_dispute_badges() {
        assert_eq!(dispute_badge("OPEN"), Badge::Warning);
        assert_eq!(dispute_badge("UNDER_REVIEW"), Badge::Warning);
        assert_eq!(dispute_badge("ADJUSTED"), Badge::Success);
        assert_eq!(dispute_badge("REJECTED").class(), "badge-error");
        assert_eq!(dispute_badge("WITHDRAWN"), Badge::Info);
    }
}
