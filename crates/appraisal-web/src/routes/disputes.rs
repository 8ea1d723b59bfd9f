//! Disputes: the HR list, filing a dispute, and resolving one.

use appraisal_client::UserContext;
use appraisal_client::fetch::load_disputes;
use appraisal_core::ResourceId;
use appraisal_core::dispute::{Dispute, DisputeStatus};
use appraisal_core::form::{DisputeForm, ResolutionAction, ResolutionForm};
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::{href, load_failure, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::FormFields;
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Filter, Link, ListPage, ListRow, ResourceList, RowAction, SelectOption,
    format_date, format_score, format_time_ago, render,
};

// ============================================================================
// Template structs
// ============================================================================

#[derive(Template)]
#[template(path = "pages/disputes/new.html")]
struct NewDisputeTemplate {
    chrome: Chrome,
    form: DisputeForm,
    form_error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/disputes/detail.html")]
struct DisputeDetailTemplate {
    chrome: Chrome,
    action: String,
    employee: String,
    reason: String,
    details: String,
    status: String,
    status_class: String,
    filed: String,
    current_score: String,
    current_label: String,
    resolvable: bool,
    resolution_summary: String,
    adjusted_score: String,
    adjusted_label: String,
    form: ResolutionForm,
    approve_selected: bool,
    form_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewDisputeQuery {
    #[serde(rename = "recordId")]
    pub record_id: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(disputes_page))
        .route("/new", get(new_dispute_page).post(create_dispute))
        .route("/{id}", get(dispute_detail_page).post(resolve_dispute))
}

async fn disputes_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<StatusQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<DisputeStatus>().ok());
    let loaded = load_disputes(state.api.as_ref(), status.clone()).await;

    let mut options = vec![SelectOption::new("", "All statuses", status.is_none())];
    options.extend(
        DisputeStatus::ALL
            .iter()
            .map(|s| SelectOption::new(s.to_string(), s.title(), status.as_ref() == Some(s))),
    );

    let now = Utc::now();
    let rows = loaded
        .data
        .iter()
        .map(|d| {
            ListRow::new(vec![
                Cell::text(d.employee_name()),
                Cell::text(d.reason_excerpt(60)),
                Cell::badge(d.status.title(), d.status.badge()),
                Cell::text(
                    d.created_at
                        .or(d.submitted_at)
                        .map(|t| format_time_ago(t, now))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
            .action(RowAction::link(
                if d.status.is_resolvable() { "Review" } else { "View" },
                href("/disputes", &d.id),
            ))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("Disputes", &user).with_flash(flash),
        "Disputes",
        "Employee challenges to published appraisals.",
    )
    .filter(Filter {
        name: "status".to_string(),
        label: "Status".to_string(),
        action: "/disputes".to_string(),
        options,
    })
    .list(
        ResourceList::new(
            "Disputes",
            &["Employee", "Reason", "Status", "Filed"],
            "No disputes found.",
        )
        .with_rows(rows)
        .with_error(loaded.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn new_dispute_page(
    CurrentUser(user): CurrentUser,
    Query(query): Query<NewDisputeQuery>,
) -> Result<Response, ApiError> {
    let form = DisputeForm::for_record(query.record_id.unwrap_or_default());
    let error = form
        .record_id
        .trim()
        .is_empty()
        .then(|| "No appraisal record specified".to_string());
    new_dispute_response(&user, form, error, StatusCode::OK)
}

async fn create_dispute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let fields = FormFields::from(fields);
    let form = DisputeForm {
        record_id: fields.string("record_id"),
        reason: fields.string("reason"),
        details: fields.string("details"),
    };

    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            return new_dispute_response(&user, form, Some(e.to_string()), StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.api.create_dispute(&payload).await {
        Ok(()) => {
            info!(record = %payload.appraisal_id, "dispute filed");
            Ok(redirect_with_flash(jar, "Dispute submitted successfully", "/my-appraisals"))
        }
        Err(e) => {
            warn!(record = %payload.appraisal_id, error = %e, "dispute filing failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            new_dispute_response(&user, form, Some(message), status)
        }
    }
}

fn new_dispute_response(
    user: &UserContext,
    form: DisputeForm,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let page = NewDisputeTemplate {
        chrome: Chrome::new("File a dispute", user),
        form,
        form_error,
    };
    Ok((status, render(&page)?).into_response())
}

async fn dispute_detail_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let dispute = match state.api.get_dispute(&ResourceId::from(id)).await {
        Ok(dispute) => dispute,
        Err(e) => return load_failure(&user, "Dispute", e, back()),
    };

    let form = ResolutionForm::from_dispute(&dispute);
    let mut page = detail_template(&user, &dispute, form, None);
    page.chrome = page.chrome.with_flash(flash);
    Ok((jar, render(&page)?).into_response())
}

async fn resolve_dispute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let id = ResourceId::from(id);
    let fields = FormFields::from(fields);
    let dispute = match state.api.get_dispute(&id).await {
        Ok(dispute) => dispute,
        Err(e) => return load_failure(&user, "Dispute", e, back()),
    };

    let form = ResolutionForm {
        action: fields.parse::<ResolutionAction>("resolution").unwrap_or_default(),
        adjusted_score: fields.string("adjusted_score"),
        adjusted_rating_label: fields.string("adjusted_rating_label"),
        resolution_summary: fields.string("resolution_summary"),
    };

    if !dispute.status.is_resolvable() {
        let message = format!("This dispute is already {}.", dispute.status.title().to_lowercase());
        let page = detail_template(&user, &dispute, form, Some(message));
        return Ok((StatusCode::CONFLICT, render(&page)?).into_response());
    }

    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            let page = detail_template(&user, &dispute, form, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response());
        }
    };

    match state.api.resolve_dispute(&id, &payload).await {
        Ok(()) => {
            info!(dispute = %id, action = payload.action.as_str(), "dispute resolved");
            Ok(redirect_with_flash(jar, "Dispute resolved successfully", "/disputes"))
        }
        Err(e) => {
            warn!(dispute = %id, error = %e, "dispute resolution failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            let page = detail_template(&user, &dispute, form, Some(message));
            Ok((status, render(&page)?).into_response())
        }
    }
}

fn detail_template(
    user: &UserContext,
    dispute: &Dispute,
    form: ResolutionForm,
    form_error: Option<String>,
) -> DisputeDetailTemplate {
    let item = dispute.disputed_item();
    DisputeDetailTemplate {
        chrome: Chrome::new("Dispute", user),
        action: href("/disputes", &dispute.id),
        employee: dispute.employee_name(),
        reason: dispute.reason.clone(),
        details: dispute.details.clone().unwrap_or_default(),
        status: dispute.status.title().to_string(),
        status_class: dispute.status.badge().class().to_string(),
        filed: format_date(dispute.created_at.or(dispute.submitted_at)),
        current_score: format_score(item.and_then(|i| i.total_score)),
        current_label: item
            .and_then(|i| i.overall_rating_label.clone())
            .unwrap_or_else(|| "-".to_string()),
        resolvable: dispute.status.is_resolvable(),
        resolution_summary: dispute.resolution_summary.clone().unwrap_or_default(),
        adjusted_score: dispute.adjusted_score.map(|s| s.to_string()).unwrap_or_default(),
        adjusted_label: dispute.adjusted_rating_label.clone().unwrap_or_default(),
        approve_selected: form.action == ResolutionAction::Approve,
        form,
        form_error,
    }
}

fn back() -> Link {
    Link::new("Back to disputes", "/disputes")
}
