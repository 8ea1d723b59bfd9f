//! Assignment pages: the merged list and bulk creation.

use appraisal_client::UserContext;
use appraisal_client::fetch::{load_assignment_options, load_assignments};
use appraisal_core::ResourceId;
use appraisal_core::assignment::Assignment;
use appraisal_core::form::AssignmentForm;
use appraisal_core::reference::label_or;
use askama::Template;
use axum::Router;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use super::{href, href_for, redirect_with_error, redirect_with_flash, selected};
use crate::AppState;
use crate::error::ApiError;
use crate::flash::take_flash;
use crate::form_data::FormFields;
use crate::session::CurrentUser;
use crate::views::{
    Cell, Chrome, Filter, ListPage, ListRow, ResourceList, RowAction, SelectOption, format_date,
    render,
};

#[derive(Template)]
#[template(path = "pages/assignments/form.html")]
struct AssignmentFormTemplate {
    chrome: Chrome,
    form_error: Option<String>,
    cycles: Vec<SelectOption>,
    templates: Vec<SelectOption>,
    employees: Vec<EmployeeOption>,
    employee_ids_json: String,
}

struct EmployeeOption {
    id: String,
    name: String,
    number: String,
    selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct CycleQuery {
    pub cycle: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assignments_page))
        .route("/new", get(new_assignments_page).post(create_assignments))
        .route("/{id}/delete", post(delete_assignment))
}

/// Table of assignments shared by the assignments and cycle pages.
pub(crate) fn assignment_list(assignments: &[Assignment], error: Option<String>) -> ResourceList {
    let rows = assignments
        .iter()
        .map(|a| {
            ListRow::new(vec![
                Cell::text(label_or(a.employee.as_ref(), "Unknown employee")),
                match href_for("/cycles", a.cycle_id()) {
                    Some(link) => Cell::link(label_or(a.cycle.as_ref(), "-"), link),
                    None => Cell::text("-"),
                },
                Cell::text(label_or(a.template.as_ref(), "-")),
                Cell::text(label_or(a.manager_ref(), "-")),
                Cell::badge(a.status.as_str(), a.status.badge()),
                Cell::text(format_date(a.due_date)),
            ])
            .action(RowAction::link("Evaluate", href("/evaluations", &a.id)))
            .action(RowAction::post(
                "Delete",
                format!("{}/delete", href("/assignments", &a.id)),
                "Delete this assignment?",
            ))
        })
        .collect();

    ResourceList::new(
        "Assignments",
        &["Employee", "Cycle", "Template", "Manager", "Status", "Due"],
        "No assignments found.",
    )
    .with_rows(rows)
    .with_error(error)
}

async fn assignments_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CycleQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, flash) = take_flash(jar);
    let cycle = selected(query.cycle);
    let api = state.api.as_ref();

    let (loaded, cycles) = futures::join!(
        load_assignments(api, &user, cycle.as_ref()),
        api.list_cycles()
    );
    let cycles = cycles.unwrap_or_else(|e| {
        warn!(error = %e, "cycle filter unavailable");
        Vec::new()
    });

    let mut options = vec![SelectOption::new("", "My assignments", cycle.is_none())];
    options.extend(
        cycles
            .iter()
            .map(|c| SelectOption::new(c.id.as_str(), c.name.clone(), cycle.as_ref() == Some(&c.id))),
    );

    let new_href = match &cycle {
        Some(id) => format!("/assignments/new?cycle={}", urlencoding::encode(id.as_str())),
        None => "/assignments/new".to_string(),
    };

    let page = ListPage::new(
        Chrome::new("Assignments", &user).with_flash(flash),
        "Assignments",
        "Who evaluates whom, with which template, in which cycle.",
    )
    .link("New assignments", new_href)
    .filter(Filter {
        name: "cycle".to_string(),
        label: "Cycle".to_string(),
        action: "/assignments".to_string(),
        options,
    })
    .list(assignment_list(&loaded.data, loaded.error));

    Ok((jar, render(&page)?).into_response())
}

async fn new_assignments_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CycleQuery>,
) -> Result<Response, ApiError> {
    let form = AssignmentForm::with_cycle(query.cycle.unwrap_or_default());
    render_form(&state, &user, form, None, StatusCode::OK).await
}

async fn create_assignments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let fields = FormFields::from(fields);
    let form = AssignmentForm {
        cycle_id: fields.string("cycle_id"),
        template_id: fields.string("template_id"),
        employee_ids: fields.all("employee_ids"),
        employee_ids_json: fields.string("employee_ids_json"),
    };

    let (cycle_id, payload) = match form.to_payload() {
        Ok(valid) => valid,
        Err(e) => {
            return render_form(&state, &user, form, Some(e.to_string()), StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    match state.api.create_assignments(&cycle_id, &payload).await {
        Ok(()) => {
            let count = payload.employee_ids.len();
            info!(cycle = %cycle_id, count, "assignments created");
            Ok(redirect_with_flash(
                jar,
                &format!("Created {count} assignment(s)"),
                &format!("/assignments?cycle={}", urlencoding::encode(cycle_id.as_str())),
            ))
        }
        Err(e) => {
            warn!(cycle = %cycle_id, error = %e, "assignment creation failed");
            let message = e.to_string();
            let status = ApiError::from(e).status();
            render_form(&state, &user, form, Some(message), status).await
        }
    }
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let id = ResourceId::from(id);
    match state.api.delete_assignment(&id).await {
        Ok(()) => {
            info!(assignment = %id, "assignment deleted");
            redirect_with_flash(jar, "Assignment deleted successfully", "/assignments")
        }
        Err(e) => redirect_with_error(jar, &format!("Failed to delete assignment: {e}"), "/assignments"),
    }
}

async fn render_form(
    state: &AppState,
    user: &UserContext,
    form: AssignmentForm,
    form_error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let options = load_assignment_options(state.api.as_ref()).await;

    let mut cycles = vec![SelectOption::new("", "Select a cycle", form.cycle_id.is_empty())];
    cycles.extend(
        options
            .cycles
            .iter()
            .map(|c| SelectOption::new(c.id.as_str(), c.name.clone(), c.id.as_str() == form.cycle_id)),
    );

    let mut templates = vec![SelectOption::new("", "Select a template", form.template_id.is_empty())];
    templates.extend(
        options
            .templates
            .iter()
            .map(|t| SelectOption::new(t.id.as_str(), t.name.clone(), t.id.as_str() == form.template_id)),
    );

    let employees = options
        .employees
        .iter()
        .map(|e| EmployeeOption {
            id: e.id.to_string(),
            name: e.full_name(),
            number: e.employee_number.clone().unwrap_or_default(),
            selected: form.is_selected(e.id.as_str()),
        })
        .collect();

    let template = AssignmentFormTemplate {
        chrome: Chrome::new("New assignments", user),
        form_error,
        cycles,
        templates,
        employees,
        employee_ids_json: form.employee_ids_json,
    };

    Ok((status, render(&template)?).into_response())
}
