//! Appraisal template pages.

use appraisal_client::UserContext;
use appraisal_client::fetch::load_templates;
use appraisal_core::form::{CriterionDraft, TemplateForm};
use appraisal_core::template::{Criterion, ScaleType, Template as AppraisalTemplate};
use appraisal_core::{Badge, ResourceId};
use appraisal_core::cycle::CycleType;
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use super::{href, load_failure, redirect_with_error, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::{FormAction, FormFields};
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Link, ListPage, ListRow, ResourceList, RowAction, SelectOption, render,
};

// ============================================================================
// Template structs
// ============================================================================

#[derive(Template)]
#[template(path = "pages/templates/form.html")]
struct TemplateFormTemplate {
    chrome: Chrome,
    heading: &'static str,
    action: String,
    cancel: String,
    form: TemplateForm,
    form_error: Option<String>,
    template_types: Vec<SelectOption>,
    scale_types: Vec<SelectOption>,
    criteria: Vec<CriterionView>,
    draft: CriterionDraft,
}

#[derive(Template)]
#[template(path = "pages/templates/detail.html")]
struct TemplateDetailTemplate {
    chrome: Chrome,
    href: String,
    template: AppraisalTemplate,
    template_type: &'static str,
    scale: String,
    labels: String,
    criteria: Vec<CriterionView>,
    total_weight: String,
}

struct CriterionView {
    index: usize,
    key: String,
    title: String,
    details: String,
    weight: String,
    max_score: String,
    required: bool,
}

impl CriterionView {
    fn new(index: usize, criterion: &Criterion) -> Self {
        let number = |n: Option<f64>| n.map(|n| n.to_string()).unwrap_or_default();
        Self {
            index,
            key: criterion.key.clone(),
            title: criterion.title.clone(),
            details: criterion.details.clone().unwrap_or_default(),
            weight: number(criterion.weight),
            max_score: number(criterion.max_score),
            required: criterion.required,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates_page))
        .route("/new", get(new_template_page).post(create_template))
        .route("/{id}", get(template_detail_page))
        .route("/{id}/edit", get(edit_template_page).post(update_template))
        .route("/{id}/delete", post(delete_template))
}

enum Mode {
    Create,
    Edit(ResourceId),
}

impl Mode {
    fn heading(&self) -> &'static str {
        match self {
            Mode::Create => "New template",
            Mode::Edit(_) => "Edit template",
        }
    }

    fn action(&self) -> String {
        match self {
            Mode::Create => "/templates/new".to_string(),
            Mode::Edit(id) => format!("{}/edit", href("/templates", id)),
        }
    }

    fn cancel(&self) -> String {
        match self {
            Mode::Create => "/templates".to_string(),
            Mode::Edit(id) => href("/templates", id),
        }
    }
}

// ============================================================================
// Page handlers
// ============================================================================

async fn templates_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let loaded = load_templates(state.api.as_ref()).await;

    let rows = loaded
        .data
        .iter()
        .map(|t| {
            let detail = href("/templates", &t.id);
            let active = if t.is_active {
                Cell::badge("Active", Badge::Success)
            } else {
                Cell::badge("Inactive", Badge::Info)
            };
            ListRow::new(vec![
                Cell::link(t.name.clone(), detail.clone()),
                Cell::text(t.template_type.title()),
                Cell::text(t.rating_scale.scale_type.title()),
                Cell::text(t.criteria.len().to_string()),
                active,
            ])
            .action(RowAction::link("Edit", format!("{detail}/edit")))
            .action(RowAction::post(
                "Delete",
                format!("{detail}/delete"),
                "Delete this template?",
            ))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("Appraisal templates", &user).with_flash(flash),
        "Appraisal templates",
        "Rating scales and criteria used by assignments.",
    )
    .link("New template", "/templates/new")
    .list(
        ResourceList::new(
            "Templates",
            &["Name", "Type", "Scale", "Criteria", "Status"],
            "No templates yet.",
        )
        .with_rows(rows)
        .with_error(loaded.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn template_detail_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let template = match state.api.get_template(&ResourceId::from(id)).await {
        Ok(template) => template,
        Err(e) => {
            return load_failure(&user, "Template", e, Link::new("Back to templates", "/templates"));
        }
    };

    let scale = &template.rating_scale;
    let page = TemplateDetailTemplate {
        chrome: Chrome::new(template.name.clone(), &user).with_flash(flash),
        href: href("/templates", &template.id),
        template_type: template.template_type.title(),
        scale: format!("{} ({} to {})", scale.scale_type.title(), scale.min, scale.max),
        labels: scale.labels.join(", "),
        criteria: template
            .criteria
            .iter()
            .enumerate()
            .map(|(i, c)| CriterionView::new(i, c))
            .collect(),
        total_weight: template.total_weight().to_string(),
        template,
    };

    Ok((jar, render(&page)?).into_response())
}

async fn new_template_page(CurrentUser(user): CurrentUser) -> Result<Response, ApiError> {
    form_response(
        &user,
        TemplateForm::default(),
        CriterionDraft::default(),
        &Mode::Create,
        None,
        StatusCode::OK,
    )
}

async fn edit_template_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = ResourceId::from(id);
    match state.api.get_template(&id).await {
        Ok(template) => form_response(
            &user,
            TemplateForm::from_template(&template),
            CriterionDraft::default(),
            &Mode::Edit(id),
            None,
            StatusCode::OK,
        ),
        Err(e) => load_failure(&user, "Edit template", e, Link::new("Back to templates", "/templates")),
    }
}

async fn create_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    submit_form(&state, &user, jar, FormFields::from(fields), Mode::Create).await
}

async fn update_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let mode = Mode::Edit(ResourceId::from(id));
    submit_form(&state, &user, jar, FormFields::from(fields), mode).await
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let id = ResourceId::from(id);
    match state.api.delete_template(&id).await {
        Ok(()) => {
            info!(template = %id, "template deleted");
            redirect_with_flash(jar, "Template deleted successfully", "/templates")
        }
        Err(e) => redirect_with_error(jar, &format!("Failed to delete template: {e}"), "/templates"),
    }
}

// ============================================================================
// Form handling
// ============================================================================

fn read_draft(fields: &FormFields, prefix: &str) -> CriterionDraft {
    CriterionDraft {
        key: fields.string(&format!("{prefix}key")),
        title: fields.string(&format!("{prefix}title")),
        details: fields.string(&format!("{prefix}details")),
        weight: fields.string(&format!("{prefix}weight")),
        max_score: fields.string(&format!("{prefix}max_score")),
        required: fields.checked(&format!("{prefix}required")),
    }
}

/// Rebuild the form from a post. Criteria travel as hidden rows.
fn read_form(fields: &FormFields) -> (TemplateForm, Option<String>) {
    let mut form = TemplateForm {
        name: fields.string("name"),
        description: fields.string("description"),
        template_type: fields.parse::<CycleType>("template_type").unwrap_or_default(),
        scale_type: fields.parse::<ScaleType>("previous_scale_type").unwrap_or_default(),
        scale_min: fields.string("scale_min"),
        scale_max: fields.string("scale_max"),
        scale_step: fields.string("scale_step"),
        scale_labels: fields.string("scale_labels"),
        instructions: fields.string("instructions"),
        is_active: fields.checked("is_active"),
        ..TemplateForm::default()
    };

    let scale_type = fields.parse::<ScaleType>("scale_type").unwrap_or_default();
    if scale_type != form.scale_type {
        form.set_scale_type(scale_type);
    }

    let mut error = None;
    for i in 0..fields.row_count() {
        if let Err(e) = form.add_criterion(read_draft(fields, &format!("c{i}_"))) {
            error.get_or_insert(e.to_string());
        }
    }
    (form, error)
}

async fn submit_form(
    state: &AppState,
    user: &UserContext,
    jar: CookieJar,
    fields: FormFields,
    mode: Mode,
) -> Result<Response, ApiError> {
    let (mut form, row_error) = read_form(&fields);
    let draft = read_draft(&fields, "new_");

    match fields.action() {
        FormAction::AddRow => {
            return match form.add_criterion(draft.clone()) {
                Ok(()) => form_response(user, form, CriterionDraft::default(), &mode, row_error, StatusCode::OK),
                Err(e) => form_response(user, form, draft, &mode, Some(e.to_string()), StatusCode::OK),
            };
        }
        FormAction::RemoveRow(index) => {
            let error = form.remove_criterion(index).err().map(|e| e.to_string()).or(row_error);
            return form_response(user, form, draft, &mode, error, StatusCode::OK);
        }
        FormAction::Save | FormAction::Submit => {}
    }

    if let Some(error) = row_error {
        return form_response(user, form, draft, &mode, Some(error), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            return form_response(user, form, draft, &mode, Some(e.to_string()), StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    let result = match &mode {
        Mode::Create => state.api.create_template(&payload).await,
        Mode::Edit(id) => state.api.update_template(id, &payload).await,
    };

    match (result, &mode) {
        (Ok(()), Mode::Create) => {
            info!(name = %payload.name, criteria = payload.criteria.len(), "template created");
            Ok(redirect_with_flash(jar, "Template created successfully", "/templates"))
        }
        (Ok(()), Mode::Edit(id)) => {
            info!(template = %id, "template updated");
            Ok(redirect_with_flash(jar, "Template updated successfully", &href("/templates", id)))
        }
        (Err(e), _) => {
            warn!(error = %e, "template save failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            form_response(user, form, draft, &mode, Some(message), status)
        }
    }
}

fn form_response(
    user: &UserContext,
    form: TemplateForm,
    draft: CriterionDraft,
    mode: &Mode,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let template_types = CycleType::ALL
        .iter()
        .map(|t| SelectOption::new(t.to_string(), t.title(), *t == form.template_type))
        .collect();
    let scale_types = ScaleType::ALL
        .iter()
        .map(|t| SelectOption::new(t.to_string(), t.title(), *t == form.scale_type))
        .collect();
    let criteria = form
        .criteria
        .iter()
        .enumerate()
        .map(|(i, c)| CriterionView::new(i, c))
        .collect();

    let template = TemplateFormTemplate {
        chrome: Chrome::new(mode.heading(), user),
        heading: mode.heading(),
        action: mode.action(),
        cancel: mode.cancel(),
        form,
        form_error,
        template_types,
        scale_types,
        criteria,
        draft,
    };

    Ok((status, render(&template)?).into_response())
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
    fn test_read_form_restores_criteria() {
        let (form, error) = read_form(&fields(&[
            ("name", "Engineering"),
            ("scale_type", "FIVE_POINT"),
            ("previous_scale_type", "FIVE_POINT"),
            ("scale_min", "1"),
            ("scale_max", "5"),
            ("rows", "2"),
            ("c0_key", "quality"),
            ("c0_title", "Quality"),
            ("c0_weight", "60"),
            ("c0_required", "on"),
            ("c1_key", "teamwork"),
            ("c1_title", "Teamwork"),
        ]));
        assert_eq!(error, None);
        assert!(!form.is_active);
        assert_eq!(form.criteria.len(), 2);
        assert_eq!(form.criteria.get(0).map(|c| c.required), Some(true));
        assert_eq!(form.criteria.get(0).and_then(|c| c.weight), Some(60.0));
    }

    #[test]
    fn test_scale_change_resets_bounds() {
        let (form, _) = read_form(&fields(&[
            ("scale_type", "TEN_POINT"),
            ("previous_scale_type", "FIVE_POINT"),
            ("scale_min", "1"),
            ("scale_max", "5"),
        ]));
        assert_eq!(form.scale_type, ScaleType::TenPoint);
        assert_eq!(form.scale_max, "10");
    }
}
