//! Appraisal cycle pages.

use appraisal_client::UserContext;
use appraisal_client::fetch::{CycleFormOptions, load_assignments, load_cycle_editor, load_cycle_form_options, load_cycles};
use appraisal_core::ResourceId;
use appraisal_core::cycle::{Cycle, CycleType};
use appraisal_core::form::{CycleForm, TemplateAssignmentRow};
use appraisal_core::reference::Ref;
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use super::assignments::assignment_list;
use super::{href, load_failure, redirect_with_error, redirect_with_flash};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::{FormAction, FormFields};
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Link, ListPage, ListRow, ResourceList, RowAction, SelectOption, format_date,
    render,
};

// ============================================================================
// Template structs
// ============================================================================

#[derive(Template)]
#[template(path = "pages/cycles/form.html")]
struct CycleFormTemplate {
    chrome: Chrome,
    heading: &'static str,
    action: String,
    cancel: String,
    form: CycleForm,
    form_error: Option<String>,
    cycle_types: Vec<SelectOption>,
    rows: Vec<TemplateAssignmentRowView>,
}

#[derive(Template)]
#[template(path = "pages/cycles/detail.html")]
struct CycleDetailTemplate {
    chrome: Chrome,
    cycle: CycleView,
    template_assignments: Vec<TemplateAssignmentView>,
}

// ============================================================================
// View models
// ============================================================================

struct TemplateAssignmentRowView {
    index: usize,
    templates: Vec<SelectOption>,
    departments: Vec<SelectOption>,
}

struct CycleView {
    href: String,
    stats_href: String,
    name: String,
    description: String,
    cycle_type: &'static str,
    start_date: String,
    end_date: String,
    manager_due_date: String,
    acknowledgement_due_date: String,
    status: String,
}

struct TemplateAssignmentView {
    template: String,
    template_href: Option<String>,
    departments: String,
}

impl CycleView {
    fn from_cycle(cycle: &Cycle) -> Self {
        Self {
            href: href("/cycles", &cycle.id),
            stats_href: format!("/dashboard?cycle={}", urlencoding::encode(cycle.id.as_str())),
            name: cycle.name.clone(),
            description: cycle.description.clone().unwrap_or_default(),
            cycle_type: cycle.type_title(),
            start_date: format_date(cycle.start_date),
            end_date: format_date(cycle.end_date),
            manager_due_date: format_date(cycle.manager_due_date),
            acknowledgement_due_date: format_date(cycle.employee_acknowledgement_due_date),
            status: cycle.status.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Label of a reference, falling back to its id.
fn ref_label<T: appraisal_core::Label>(reference: &Ref<T>) -> String {
    reference
        .label()
        .or_else(|| reference.id().map(|id| id.to_string()))
        .unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Routes
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cycles_page))
        .route("/new", get(new_cycle_page).post(create_cycle))
        .route("/{id}", get(cycle_detail_page))
        .route("/{id}/edit", get(edit_cycle_page).post(update_cycle))
        .route("/{id}/assignments", get(cycle_assignments_page))
        .route("/{id}/delete", post(delete_cycle))
}

enum Mode {
    Create,
    Edit(ResourceId),
}

impl Mode {
    fn heading(&self) -> &'static str {
        match self {
            Mode::Create => "New cycle",
            Mode::Edit(_) => "Edit cycle",
        }
    }

    fn action(&self) -> String {
        match self {
            Mode::Create => "/cycles/new".to_string(),
            Mode::Edit(id) => format!("{}/edit", href("/cycles", id)),
        }
    }

    fn cancel(&self) -> String {
        match self {
            Mode::Create => "/cycles".to_string(),
            Mode::Edit(id) => href("/cycles", id),
        }
    }
}

// ============================================================================
// Page handlers
// ============================================================================

async fn cycles_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let loaded = load_cycles(state.api.as_ref()).await;

    let rows = loaded
        .data
        .iter()
        .map(|c| {
            let detail = href("/cycles", &c.id);
            ListRow::new(vec![
                Cell::link(c.name.clone(), detail.clone()),
                Cell::text(c.description_excerpt(60).unwrap_or_default()),
                Cell::text(c.type_title()),
                Cell::text(format_date(c.start_date)),
                Cell::text(format_date(c.end_date)),
                Cell::text(format_date(c.manager_due_date)),
            ])
            .action(RowAction::link("Edit", format!("{detail}/edit")))
            .action(RowAction::link("Assignments", format!("{detail}/assignments")))
            .action(RowAction::post(
                "Delete",
                format!("{detail}/delete"),
                "Delete this cycle?",
            ))
        })
        .collect();

    let page = ListPage::new(
        Chrome::new("Appraisal cycles", &user).with_flash(flash),
        "Appraisal cycles",
        "Time-boxed appraisal periods.",
    )
    .link("New cycle", "/cycles/new")
    .list(
        ResourceList::new(
            "Cycles",
            &["Name", "Description", "Type", "Start", "End", "Manager due"],
            "No cycles yet. Create one to get started.",
        )
        .with_rows(rows)
        .with_error(loaded.error),
    );

    Ok((jar, render(&page)?).into_response())
}

async fn cycle_detail_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let cycle = match state.api.get_cycle(&ResourceId::from(id)).await {
        Ok(cycle) => cycle,
        Err(e) => return load_failure(&user, "Cycle", e, Link::new("Back to cycles", "/cycles")),
    };

    let template_assignments = cycle
        .template_assignments
        .iter()
        .map(|ta| TemplateAssignmentView {
            template: ref_label(&ta.template),
            template_href: ta.template.id().map(|id| href("/templates", id)),
            departments: if ta.departments.is_empty() {
                "All departments".to_string()
            } else {
                ta.departments.iter().map(ref_label).collect::<Vec<_>>().join(", ")
            },
        })
        .collect();

    let template = CycleDetailTemplate {
        chrome: Chrome::new(cycle.name.clone(), &user).with_flash(flash),
        cycle: CycleView::from_cycle(&cycle),
        template_assignments,
    };

    Ok((jar, render(&template)?).into_response())
}

async fn new_cycle_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    render_form(&state, &user, CycleForm::default(), &Mode::Create, None, StatusCode::OK).await
}

async fn edit_cycle_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = ResourceId::from(id);
    match load_cycle_editor(state.api.as_ref(), &id).await {
        Ok((cycle, options)) => form_response(
            &user,
            CycleForm::from_cycle(&cycle),
            &Mode::Edit(id),
            options,
            None,
            StatusCode::OK,
        ),
        Err(e) => load_failure(&user, "Edit cycle", e, Link::new("Back to cycles", "/cycles")),
    }
}

async fn create_cycle(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    submit_form(&state, &user, jar, FormFields::from(fields), Mode::Create).await
}

async fn update_cycle(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let mode = Mode::Edit(ResourceId::from(id));
    submit_form(&state, &user, jar, FormFields::from(fields), mode).await
}

async fn cycle_assignments_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let id = ResourceId::from(id);
    let api = state.api.as_ref();
    let (cycle, loaded) = futures::join!(api.get_cycle(&id), load_assignments(api, &user, Some(&id)));

    let heading = match cycle {
        Ok(cycle) => format!("Assignments: {}", cycle.name),
        Err(e) => {
            warn!(cycle = %id, error = %e, "cycle name unavailable");
            format!("Assignments for cycle {id}")
        }
    };
    let detail = href("/cycles", &id);

    let page = ListPage::new(Chrome::new(heading.clone(), &user).with_flash(flash), heading, "")
        .link(
            "Add assignments",
            format!("/assignments/new?cycle={}", urlencoding::encode(id.as_str())),
        )
        .link("Back to cycle", detail)
        .list(assignment_list(&loaded.data, loaded.error));

    Ok((jar, render(&page)?).into_response())
}

async fn delete_cycle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let id = ResourceId::from(id);
    match state.api.delete_cycle(&id).await {
        Ok(()) => {
            info!(cycle = %id, "cycle deleted");
            redirect_with_flash(jar, "Cycle deleted successfully", "/cycles")
        }
        Err(e) => redirect_with_error(jar, &format!("Failed to delete cycle: {e}"), "/cycles"),
    }
}

// ============================================================================
// Form handling
// ============================================================================

fn read_form(fields: &FormFields) -> CycleForm {
    CycleForm {
        name: fields.string("name"),
        description: fields.string("description"),
        cycle_type: fields.parse::<CycleType>("cycle_type").unwrap_or_default(),
        start_date: fields.string("start_date"),
        end_date: fields.string("end_date"),
        manager_due_date: fields.string("manager_due_date"),
        employee_acknowledgement_due_date: fields.string("employee_acknowledgement_due_date"),
        template_assignments: (0..fields.row_count())
            .map(|i| TemplateAssignmentRow {
                template_id: fields.string(&format!("ta{i}_template")),
                department_ids: fields.all(&format!("ta{i}_departments")),
            })
            .collect(),
    }
}

async fn submit_form(
    state: &AppState,
    user: &UserContext,
    jar: CookieJar,
    fields: FormFields,
    mode: Mode,
) -> Result<Response, ApiError> {
    let mut form = read_form(&fields);

    match fields.action() {
        FormAction::AddRow => {
            form.add_template_assignment();
            return render_form(state, user, form, &mode, None, StatusCode::OK).await;
        }
        FormAction::RemoveRow(index) => {
            let error = form.remove_template_assignment(index).err().map(|e| e.to_string());
            return render_form(state, user, form, &mode, error, StatusCode::OK).await;
        }
        FormAction::Save | FormAction::Submit => {}
    }

    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            return render_form(state, user, form, &mode, Some(e.to_string()), StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    let result = match &mode {
        Mode::Create => state.api.create_cycle(&payload).await,
        Mode::Edit(id) => state.api.update_cycle(id, &payload).await,
    };

    match (result, &mode) {
        (Ok(()), Mode::Create) => {
            info!(name = %payload.name, "cycle created");
            Ok(redirect_with_flash(jar, "Cycle created successfully", "/cycles"))
        }
        (Ok(()), Mode::Edit(id)) => {
            info!(cycle = %id, "cycle updated");
            Ok(redirect_with_flash(jar, "Cycle updated successfully", &href("/cycles", id)))
        }
        (Err(e), _) => {
            warn!(error = %e, "cycle save failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            render_form(state, user, form, &mode, Some(message), status).await
        }
    }
}

async fn render_form(
    state: &AppState,
    user: &UserContext,
    form: CycleForm,
    mode: &Mode,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let options = load_cycle_form_options(state.api.as_ref()).await;
    form_response(user, form, mode, options, form_error, status)
}

fn form_response(
    user: &UserContext,
    form: CycleForm,
    mode: &Mode,
    options: CycleFormOptions,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let rows = form
        .template_assignments
        .iter()
        .enumerate()
        .map(|(index, row)| TemplateAssignmentRowView {
            index,
            templates: with_current(
                options
                    .templates
                    .iter()
                    .map(|t| (t.id.to_string(), t.name.clone())),
                std::slice::from_ref(&row.template_id),
            ),
            departments: with_current(
                options
                    .departments
                    .iter()
                    .map(|d| (d.id.to_string(), d.name.clone())),
                &row.department_ids,
            ),
        })
        .collect();

    let cycle_types = CycleType::ALL
        .iter()
        .map(|t| SelectOption::new(t.to_string(), t.title(), *t == form.cycle_type))
        .collect();

    let template = CycleFormTemplate {
        chrome: Chrome::new(mode.heading(), user).with_error(options.error),
        heading: mode.heading(),
        action: mode.action(),
        cancel: mode.cancel(),
        form,
        form_error,
        cycle_types,
        rows,
    };

    Ok((status, render(&template)?).into_response())
}

/// Select options with `chosen` marked; chosen ids missing from `choices`
/// (inactive templates, departments that failed to load) are kept by id.
fn with_current(
    choices: impl Iterator<Item = (String, String)>,
    chosen: &[String],
) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> = choices
        .map(|(id, name)| {
            let selected = chosen.contains(&id);
            SelectOption::new(id, name, selected)
        })
        .collect();

    for id in chosen.iter().filter(|id| !id.is_empty()) {
        if !options.iter().any(|o| &o.value == id) {
            options.push(SelectOption::new(id.clone(), id.clone(), true));
        }
    }
    options
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
    fn test_read_form_rows() {
        let form = read_form(&fields(&[
            ("name", "Q4"),
            ("cycle_type", "SEMI_ANNUAL"),
            ("rows", "2"),
            ("ta0_template", "t1"),
            ("ta0_departments", "d1"),
            ("ta0_departments", "d2"),
            ("ta1_template", ""),
        ]));
        assert_eq!(form.cycle_type, CycleType::SemiAnnual);
        assert_eq!(form.template_assignments.len(), 2);
        assert_eq!(
            form.template_assignments.get(0).map(|r| r.department_ids.clone()),
            Some(vec!["d1".to_string(), "d2".to_string()])
        );
    }

    #[test]
    fn test_with_current_keeps_unknown_choice() {
        let options = with_current(
            vec![("t1".to_string(), "Engineering".to_string())].into_iter(),
            &["t9".to_string()],
        );
        assert_eq!(options.len(), 2);
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "t9");
    }
}
