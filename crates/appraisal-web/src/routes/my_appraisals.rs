//! The employee's own published appraisals.

use appraisal_client::fetch::load_my_appraisals;
use appraisal_core::ResourceId;
use appraisal_core::form::AcknowledgeForm;
use appraisal_core::record::{AppraisalRecord, Rating};
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::{info, warn};

use super::{href, load_failure, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::FormFields;
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Link, ListPage, ListRow, ResourceList, RowAction, format_date, format_score,
    render,
};

#[derive(Template)]
#[template(path = "pages/my_appraisals/detail.html")]
struct AppraisalDetailTemplate {
    chrome: Chrome,
    href: String,
    cycle: String,
    template_name: String,
    status: String,
    status_class: String,
    total_score: String,
    rating_label: String,
    published: String,
    ratings: Vec<Rating>,
    summary: String,
    strengths: Vec<String>,
    improvement_areas: Vec<String>,
    acknowledged: bool,
    acknowledged_at: String,
    can_dispute: bool,
    dispute_href: String,
}

#[derive(Template)]
#[template(path = "pages/my_appraisals/acknowledge.html")]
struct AcknowledgeTemplate {
    chrome: Chrome,
    action: String,
    cancel: String,
    comment: String,
    form_error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_appraisals_page))
        .route("/{id}", get(appraisal_detail_page))
        .route(
            "/{id}/acknowledge",
            get(acknowledge_page).post(acknowledge_appraisal),
        )
}

async fn my_appraisals_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let loaded = load_my_appraisals(state.api.as_ref(), &user).await;

    let rows = loaded
        .data
        .iter()
        .map(|r| {
            ListRow::new(vec![
                Cell::text(r.cycle_name()),
                Cell::text(r.template_name()),
                Cell::text(format_score(r.total_score)),
                Cell::text(r.overall_rating_label.clone().unwrap_or_else(|| "-".to_string())),
                Cell::text(format_date(r.publication_time())),
                Cell::badge(r.status.as_str(), r.status.badge()),
            ])
            .action(RowAction::link("View", href("/my-appraisals", &r.id)))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("My appraisals", &user).with_flash(flash),
        "My appraisals",
        "Your published performance appraisals.",
    )
    .list(
        ResourceList::new(
            "Appraisals",
            &["Cycle", "Template", "Score", "Rating", "Published", "Status"],
            "No published appraisals yet.",
        )
        .with_rows(rows)
        .with_error(loaded.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn appraisal_detail_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let record = match state.api.view_record(&ResourceId::from(id)).await {
        Ok(record) => record,
        Err(e) => return load_failure(&user, "Appraisal", e, back()),
    };

    let page = detail_template(&record, Chrome::new("Appraisal", &user).with_flash(flash));
    Ok((jar, render(&page)?).into_response())
}

fn detail_template(record: &AppraisalRecord, chrome: Chrome) -> AppraisalDetailTemplate {
    AppraisalDetailTemplate {
        chrome,
        href: href("/my-appraisals", &record.id),
        cycle: record.cycle_name(),
        template_name: record.template_name(),
        status: record.status.to_string(),
        status_class: record.status.badge().class().to_string(),
        total_score: format_score(record.total_score),
        rating_label: record.overall_rating_label.clone().unwrap_or_default(),
        published: format_date(record.publication_time()),
        ratings: record.ratings.clone(),
        summary: record.summary().unwrap_or_default().to_string(),
        strengths: record.strengths.clone(),
        improvement_areas: record.improvement_areas.clone(),
        acknowledged: record.is_acknowledged(),
        acknowledged_at: format_date(record.acknowledged_at),
        can_dispute: record.can_file_dispute(Utc::now()),
        dispute_href: format!(
            "/disputes/new?recordId={}",
            urlencoding::encode(record.id.as_str())
        ),
    }
}

async fn acknowledge_page(
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    acknowledge_response(&user, &ResourceId::from(id), String::new(), None, StatusCode::OK)
}

async fn acknowledge_appraisal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let id = ResourceId::from(id);
    let form = AcknowledgeForm {
        comment: FormFields::from(fields).string("comment"),
    };

    match state.api.acknowledge_record(&id, &form.to_payload()).await {
        Ok(()) => {
            info!(record = %id, "appraisal acknowledged");
            Ok(redirect_with_flash(
                jar,
                "Appraisal acknowledged",
                &href("/my-appraisals", &id),
            ))
        }
        Err(e) => {
            warn!(record = %id, error = %e, "acknowledge failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            acknowledge_response(&user, &id, form.comment, Some(message), status)
        }
    }
}

fn acknowledge_response(
    user: &appraisal_client::UserContext,
    id: &ResourceId,
    comment: String,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let detail = href("/my-appraisals", id);
    let page = AcknowledgeTemplate {
        chrome: Chrome::new("Acknowledge appraisal", user),
        action: format!("{detail}/acknowledge"),
        cancel: detail,
        comment,
        form_error,
    };
    Ok((status, render(&page)?).into_response())
}

fn back() -> Link {
    Link::new("Back to my appraisals", "/my-appraisals")
}
