//! Manager evaluations: the queue and the per-assignment form.

use appraisal_client::UserContext;
use appraisal_client::fetch::load_evaluations;
use appraisal_core::ResourceId;
use appraisal_core::form::{EvaluationForm, SubmitAction};
use appraisal_core::record::EvaluationFormData;
use appraisal_core::reference::label_or;
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use super::{href, load_failure, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::{Flash, take_flash};
use crate::form_data::{FormAction, FormFields};
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Link, ListPage, ListRow, ResourceList, RowAction, format_date, render,
};

#[derive(Template)]
#[template(path = "pages/evaluations/form.html")]
struct EvaluationTemplate {
    chrome: Chrome,
    action: String,
    employee: String,
    cycle: String,
    template_name: String,
    status: String,
    status_class: String,
    scale: String,
    locked: bool,
    form_error: Option<String>,
    ratings: Vec<RatingView>,
    manager_summary: String,
    strengths: String,
    improvement_areas: String,
}

struct RatingView {
    index: usize,
    key: String,
    title: String,
    details: String,
    max_score: String,
    required: bool,
    score: String,
    comment: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(evaluations_page))
        .route("/{id}", get(evaluation_page).post(save_evaluation))
}

async fn evaluations_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let loaded = load_evaluations(state.api.as_ref(), &user).await;

    let rows = loaded
        .data
        .iter()
        .map(|a| {
            let label = if a.status.is_submitted() { "View" } else { "Evaluate" };
            ListRow::new(vec![
                Cell::text(label_or(a.employee.as_ref(), "Unknown employee")),
                Cell::text(label_or(a.cycle.as_ref(), "-")),
                Cell::text(label_or(a.template.as_ref(), "-")),
                Cell::badge(a.status.as_str(), a.status.badge()),
                Cell::text(format_date(a.due_date)),
            ])
            .action(RowAction::link(label, href("/evaluations", &a.id)))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("My evaluations", &user).with_flash(flash),
        "My evaluations",
        "Appraisals you are assigned to complete as a manager.",
    )
    .list(
        ResourceList::new(
            "Evaluations",
            &["Employee", "Cycle", "Template", "Status", "Due"],
            "No evaluations assigned to you.",
        )
        .with_rows(rows)
        .with_error(loaded.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn evaluation_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let id = ResourceId::from(id);
    let data = match state.api.evaluation_form(&id).await {
        Ok(data) => data,
        Err(e) => return load_failure(&user, "Evaluation", e, back()),
    };

    let form = EvaluationForm::from_form_data(&data);
    let page = evaluation_template(&user, &id, &data, &form, None).with_flash(flash);
    Ok((jar, render(&page)?).into_response())
}

async fn save_evaluation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let id = ResourceId::from(id);
    let fields = FormFields::from(fields);
    let data = match state.api.evaluation_form(&id).await {
        Ok(data) => data,
        Err(e) => return load_failure(&user, "Evaluation", e, back()),
    };

    let mut form = EvaluationForm::from_form_data(&data);
    if form.is_locked() {
        let message = "This evaluation has already been submitted and can no longer be edited.";
        return form_response(&user, &id, &data, &form, Some(message.to_string()), StatusCode::CONFLICT);
    }
    if let Err(message) = apply_fields(&mut form, &fields) {
        return form_response(&user, &id, &data, &form, Some(message), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (result, success, target) = match fields.action() {
        FormAction::Submit => {
            let result = match form.submit_action() {
                SubmitAction::SubmitExisting(record_id) => state.api.submit_record(&record_id).await,
                SubmitAction::CreateSubmitted(payload) => state.api.save_record(&id, &payload).await,
            };
            (result, "Evaluation submitted successfully", "/evaluations".to_string())
        }
        _ => {
            let result = state.api.save_record(&id, &form.draft_payload()).await;
            (result, "Draft saved successfully", href("/evaluations", &id))
        }
    };

    match result {
        Ok(()) => {
            info!(assignment = %id, "{success}");
            Ok(redirect_with_flash(jar, success, &target))
        }
        Err(e) => {
            warn!(assignment = %id, error = %e, "evaluation save failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            form_response(&user, &id, &data, &form, Some(message), status)
        }
    }
}

fn back() -> Link {
    Link::new("Back to evaluations", "/evaluations")
}

/// Copy posted scores and text into the form. Ratings are posted by index.
fn apply_fields(form: &mut EvaluationForm, fields: &FormFields) -> Result<(), String> {
    for index in 0..form.ratings.len() {
        form.set_score_text(index, fields.get(&format!("r{index}_score")))
            .map_err(|e| e.to_string())?;
        form.set_comment(index, fields.string(&format!("r{index}_comment")))
            .map_err(|e| e.to_string())?;
    }

    form.manager_summary = fields.string("manager_summary");
    form.strengths = fields.string("strengths");
    form.improvement_areas = fields.string("improvement_areas");
    Ok(())
}

fn form_response(
    user: &UserContext,
    assignment_id: &ResourceId,
    data: &EvaluationFormData,
    form: &EvaluationForm,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let page = evaluation_template(user, assignment_id, data, form, form_error);
    Ok((status, render(&page)?).into_response())
}

fn evaluation_template(
    user: &UserContext,
    assignment_id: &ResourceId,
    data: &EvaluationFormData,
    form: &EvaluationForm,
    form_error: Option<String>,
) -> EvaluationTemplate {
    let assignment = &data.assignment;
    let template = data.template();
    let criterion = |key: &str| template.and_then(|t| t.criteria.iter().find(|c| c.key == key));

    let ratings = form
        .ratings
        .iter()
        .enumerate()
        .map(|(index, rating)| {
            let c = criterion(&rating.key);
            RatingView {
                index,
                key: rating.key.clone(),
                title: c.map(|c| c.title.clone()).unwrap_or_else(|| rating.key.clone()),
                details: c.and_then(|c| c.details.clone()).unwrap_or_default(),
                max_score: c
                    .and_then(|c| c.max_score)
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
                required: c.is_some_and(|c| c.required),
                score: rating.score.to_string(),
                comment: rating.comment.clone(),
            }
        })
        .collect();

    let scale = template
        .and_then(|t| t.rating_scale.as_ref())
        .map(|s| format!("{} to {}", s.min, s.max))
        .unwrap_or_default();

    let status_value = form
        .existing_status
        .clone()
        .unwrap_or_else(|| assignment.status.clone());

    EvaluationTemplate {
        chrome: Chrome::new("Evaluation", user),
        action: href("/evaluations", assignment_id),
        employee: label_or(assignment.employee.as_ref(), "Unknown employee"),
        cycle: label_or(assignment.cycle.as_ref(), "-"),
        template_name: template.map(|t| t.name.clone()).unwrap_or_else(|| "-".to_string()),
        status: status_value.to_string(),
        status_class: status_value.badge().class().to_string(),
        scale,
        locked: form.is_locked(),
        form_error,
        ratings,
        manager_summary: form.manager_summary.clone(),
        strengths: form.strengths.clone(),
        improvement_areas: form.improvement_areas.clone(),
    }
}

impl EvaluationTemplate {
    fn with_flash(mut self, flash: Option<Flash>) -> Self {
        self.chrome = self.chrome.with_flash(flash);
        self
    }
}
