//! Overview page and current-user switching.

use appraisal_client::fetch::load_home;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;

use super::{href, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::FormFields;
use crate::session::{CurrentUser, user_cookie};
use crate::views::{Cell, Chrome, ListPage, ListRow, ResourceList, format_date, render};

const RECENT_CYCLES: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/session", post(switch_user))
}

async fn home_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let overview = load_home(state.api.as_ref()).await;

    let cycles = overview
        .cycles
        .iter()
        .take(RECENT_CYCLES)
        .map(|c| {
            ListRow::new(vec![
                Cell::link(c.name.clone(), href("/cycles", &c.id)),
                Cell::text(c.type_title()),
                Cell::text(format_date(c.start_date)),
                Cell::text(format_date(c.end_date)),
            ])
        })
        .collect();

    let templates = overview
        .templates
        .iter()
        .map(|t| {
            ListRow::new(vec![
                Cell::link(t.name.clone(), href("/templates", &t.id)),
                Cell::text(t.template_type.title()),
                Cell::text(t.criteria.len().to_string()),
            ])
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("Performance Management", &user).with_flash(flash),
        "Performance Management",
        "Appraisal cycles, templates, evaluations and disputes.",
    )
    .link("Dashboard", "/dashboard")
    .link("New cycle", "/cycles/new")
    .link("New template", "/templates/new")
    .list(
        ResourceList::new("Recent cycles", &["Name", "Type", "Start", "End"], "No cycles yet.")
            .with_rows(cycles),
    )
    .list(
        ResourceList::new(
            "Active templates",
            &["Name", "Type", "Criteria"],
            "No active templates.",
        )
        .with_rows(templates),
    );

    Ok((jar, render(&page)?).into_response())
}

/// Remember the user id picked in the header, or forget it when blank.
async fn switch_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let fields = FormFields::from(fields);
    let user_id = fields.get("user_id").trim();
    let cookie_name = state.session.user_cookie.clone();

    if user_id.is_empty() {
        let jar = jar.remove(Cookie::build(cookie_name).path("/"));
        return redirect_with_flash(jar, "Cleared the current user", "/");
    }

    tracing::info!(user = user_id, "switching portal user");
    let jar = jar.add(user_cookie(&cookie_name, user_id));
    redirect_with_flash(jar, &format!("Now acting as {user_id}"), "/")
}
