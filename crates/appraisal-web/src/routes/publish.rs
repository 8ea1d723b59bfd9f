//! HR publish queue.

use appraisal_client::fetch::load_publish_queue;
use appraisal_core::ResourceId;
use axum::Router;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use super::{href, redirect_with_error, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, ListPage, ListRow, ResourceList, RowAction, format_date, format_score, render,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(publish_page))
        .route("/{id}", post(publish_record))
}

async fn publish_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let queue = load_publish_queue(state.api.as_ref()).await;

    let rows = queue
        .data
        .iter()
        .map(|r| {
            ListRow::new(vec![
                Cell::text(r.employee_name()),
                Cell::text(r.cycle_name()),
                Cell::text(r.template_name()),
                Cell::text(format_score(r.total_score)),
                Cell::text(r.overall_rating_label.clone().unwrap_or_else(|| "-".to_string())),
                Cell::text(format_date(r.manager_submitted_at)),
            ])
            .action(RowAction::post(
                "Publish",
                href("/publish", &r.id),
                "Publish this appraisal to the employee?",
            ))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("Publish appraisals", &user).with_flash(flash),
        "Publish appraisals",
        "Manager-submitted appraisals waiting to be published to employees.",
    )
    .list(
        ResourceList::new(
            "Ready to publish",
            &["Employee", "Cycle", "Template", "Score", "Rating", "Submitted"],
            "No appraisals are waiting to be published.",
        )
        .with_rows(rows)
        .with_error(queue.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn publish_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let id = ResourceId::from(id);
    match state.api.publish_record(&id).await {
        Ok(()) => {
            info!(record = %id, "appraisal published");
            redirect_with_flash(jar, "Appraisal published successfully", "/publish")
        }
        Err(e) => {
            warn!(record = %id, error = %e, "publish failed");
            redirect_with_error(jar, &format!("Failed to publish appraisal: {e}"), "/publish")
        }
    }
}
