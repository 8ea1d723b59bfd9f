//! Portal routes.

pub mod assignments;
pub mod cycles;
pub mod dashboard;
pub mod disputes;
pub mod evaluations;
pub mod health;
pub mod home;
pub mod my_appraisals;
pub mod publish;
pub mod templates;

use appraisal_client::{ClientError, UserContext};
use appraisal_core::ResourceId;
use axum::Router;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::ApiError;
use crate::flash::{Flash, set_flash};
use crate::views::{Link, NoticePage};

/// Build the portal router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(home::router())
        .merge(dashboard::router())
        .nest("/cycles", cycles::router())
        .nest("/templates", templates::router())
        .nest("/assignments", assignments::router())
        .nest("/evaluations", evaluations::router())
        .nest("/publish", publish::router())
        .nest("/my-appraisals", my_appraisals::router())
        .nest("/disputes", disputes::router())
        .merge(health::router())
        .with_state(state)
}

/// 303 to `to` with a success message for the next page.
pub(crate) fn redirect_with_flash(jar: CookieJar, message: &str, to: &str) -> Response {
    (set_flash(jar, &Flash::success(message)), Redirect::to(to)).into_response()
}

/// 303 to `to` with an error banner for the next page.
pub(crate) fn redirect_with_error(jar: CookieJar, message: &str, to: &str) -> Response {
    (set_flash(jar, &Flash::error(message)), Redirect::to(to)).into_response()
}

/// Page shell for a primary record that could not be loaded.
pub(crate) fn load_failure(
    user: &UserContext,
    heading: &str,
    err: ClientError,
    back: Link,
) -> Result<Response, ApiError> {
    let message = err.to_string();
    let status = ApiError::from(err).status();
    NoticePage::respond(user, heading, message, back, status)
}

/// Query parameters arrive as `?cycle=` when a filter is cleared.
pub(crate) fn selected(value: Option<String>) -> Option<ResourceId> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(ResourceId::from)
}

/// Link to a record's page when its id is known.
pub(crate) fn href_for(prefix: &str, id: Option<&ResourceId>) -> Option<String> {
    id.map(|id| format!("{prefix}/{}", urlencoding::encode(id.as_str())))
}

pub(crate) fn href(prefix: &str, id: &ResourceId) -> String {
    format!("{prefix}/{}", urlencoding::encode(id.as_str()))
}
