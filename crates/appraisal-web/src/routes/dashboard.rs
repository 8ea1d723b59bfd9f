//! Per-cycle status statistics.

use appraisal_client::fetch::load_dashboard;
use askama::Template;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::selected;
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::session::CurrentUser;
use crate::views::{Chrome, Filter, SelectOption, render};

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
struct DashboardTemplate {
    chrome: Chrome,
    filter: Filter,
    has_cycle: bool,
    stats: Vec<StatView>,
    completion_rate: String,
}

struct StatView {
    label: &'static str,
    value: usize,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub cycle: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_page))
}

async fn dashboard_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let requested = selected(query.cycle);
    let dashboard = load_dashboard(state.api.as_ref(), requested.as_ref()).await;

    let options = dashboard
        .cycles
        .iter()
        .map(|c| SelectOption::new(c.id.as_str(), c.name.clone(), dashboard.selected.as_ref() == Some(&c.id)))
        .collect();

    let stats = &dashboard.stats;
    let template = DashboardTemplate {
        chrome: Chrome::new("Dashboard", &user)
            .with_flash(flash)
            .with_error(dashboard.error.clone()),
        filter: Filter {
            name: "cycle".to_string(),
            label: "Cycle".to_string(),
            action: "/dashboard".to_string(),
            options,
        },
        has_cycle: dashboard.selected.is_some(),
        stats: vec![
            StatView { label: "Total assignments", value: stats.total_assignments },
            StatView { label: "Not started", value: stats.not_started },
            StatView { label: "In progress", value: stats.in_progress },
            StatView { label: "Submitted", value: stats.submitted },
            StatView { label: "Published", value: stats.published },
            StatView { label: "Acknowledged", value: stats.acknowledged },
        ],
        completion_rate: format!("{:.1}", stats.completion_rate),
    };

    Ok((jar, render(&template)?).into_response())
}
