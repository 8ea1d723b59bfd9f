//! View models shared by every page.
//!
//! Most pages are one or more tables. They all render through [`ListPage`]
//! and [`ResourceList`]: title, columns, rows with per-row actions, an
//! empty-state message and an optional error banner.

use appraisal_client::UserContext;
use appraisal_core::Badge;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::flash::Flash;

/// Page frame: title, current user, flash and error banners.
pub struct Chrome {
    pub title: String,
    pub user: String,
    pub has_user: bool,
    pub flash: Option<Flash>,
    pub error: Option<String>,
}

impl Chrome {
    pub fn new(title: impl Into<String>, user: &UserContext) -> Self {
        let user_id = user.user_id().map(|id| id.to_string());
        Self {
            title: title.into(),
            has_user: user_id.is_some(),
            user: user_id.unwrap_or_default(),
            flash: None,
            error: None,
        }
    }

    pub fn with_flash(mut self, flash: Option<Flash>) -> Self {
        self.flash = flash;
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// A GET filter above a list (cycle picker, status picker).
pub struct Filter {
    pub name: String,
    pub label: String,
    pub action: String,
    pub options: Vec<SelectOption>,
}

pub struct Cell {
    pub text: String,
    pub href: Option<String>,
    /// CSS class of a status badge.
    pub badge: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
            badge: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
            badge: None,
        }
    }

    pub fn badge(text: impl Into<String>, badge: Badge) -> Self {
        Self {
            text: text.into(),
            href: None,
            badge: Some(badge.class().to_string()),
        }
    }
}

pub struct RowAction {
    pub label: String,
    pub href: String,
    /// Rendered as a POST button instead of a link.
    pub post: bool,
    pub confirm: Option<String>,
}

impl RowAction {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            post: false,
            confirm: None,
        }
    }

    pub fn post(label: impl Into<String>, href: impl Into<String>, confirm: &str) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            post: true,
            confirm: Some(confirm.to_string()),
        }
    }
}

pub struct ListRow {
    pub cells: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

impl ListRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: RowAction) -> Self {
        self.actions.push(action);
        self
    }
}

pub struct ResourceList {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<ListRow>,
    pub has_actions: bool,
    pub empty_message: String,
    pub error: Option<String>,
}

impl ResourceList {
    pub fn new(title: impl Into<String>, columns: &[&str], empty_message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            has_actions: false,
            empty_message: empty_message.into(),
            error: None,
        }
    }

    pub fn with_rows(mut self, rows: Vec<ListRow>) -> Self {
        self.has_actions = rows.iter().any(|r| !r.actions.is_empty());
        self.rows = rows;
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Heading, toolbar links, an optional filter, then one or more lists.
#[derive(Template)]
#[template(path = "pages/list.html")]
pub struct ListPage {
    pub chrome: Chrome,
    pub heading: String,
    pub subheading: String,
    pub toolbar: Vec<Link>,
    pub filter: Option<Filter>,
    pub lists: Vec<ResourceList>,
}

impl ListPage {
    pub fn new(chrome: Chrome, heading: impl Into<String>, subheading: impl Into<String>) -> Self {
        Self {
            chrome,
            heading: heading.into(),
            subheading: subheading.into(),
            toolbar: Vec::new(),
            filter: None,
            lists: Vec::new(),
        }
    }

    pub fn link(mut self, label: &str, href: impl Into<String>) -> Self {
        self.toolbar.push(Link::new(label, href));
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn list(mut self, list: ResourceList) -> Self {
        self.lists.push(list);
        self
    }
}

/// Shell shown when a page's primary record could not be loaded.
#[derive(Template)]
#[template(path = "pages/notice.html")]
pub struct NoticePage {
    pub chrome: Chrome,
    pub heading: String,
    pub back: Link,
}

impl NoticePage {
    /// Render with a status matching the failure; the page shell still renders.
    pub fn respond(
        user: &UserContext,
        heading: &str,
        message: String,
        back: Link,
        status: StatusCode,
    ) -> Result<Response, ApiError> {
        let page = NoticePage {
            chrome: Chrome::new(heading, user).with_error(Some(message)),
            heading: heading.to_string(),
            back,
        };
        Ok((status, render(&page)?).into_response())
    }
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, ApiError> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("template render error: {}", e);
            Err(e.into())
        }
    }
}

// ============================================================================
// Formatting helpers
// ============================================================================

pub fn format_date(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{s:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_time_ago(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(time);

    if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds().max(0))
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        format!("{}d ago", duration.num_days())
    }
}
