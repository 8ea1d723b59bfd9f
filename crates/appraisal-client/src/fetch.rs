//! Page data loading.
//!
//! Each page issues one or more GETs. Independent calls run concurrently and
//! each failure is caught on its own, so one failing endpoint never hides
//! the data another returned. What could not be loaded becomes a banner
//! message in [`Loaded::error`] instead of an error return.

use appraisal_core::ResourceId;
use appraisal_core::assignment::{AppraisalStatus, Assignment, AssignmentStats, dedupe_by_id};
use appraisal_core::cycle::Cycle;
use appraisal_core::dispute::{Dispute, DisputeStatus};
use appraisal_core::organization::{Department, Employee};
use appraisal_core::record::{AppraisalRecord, AssignmentSummary};
use appraisal_core::reference::{Named, Ref};
use appraisal_core::template::{Template, TemplateSummary};
use futures::future::join_all;
use tracing::warn;

use crate::{ClientError, ClientResult, PerformanceApi};

pub const NOT_AUTHENTICATED: &str = "User not authenticated";

/// The user a page is rendered for. Supplied from outside the portal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContext {
    user_id: Option<ResourceId>,
}

impl UserContext {
    pub fn new(user_id: Option<ResourceId>) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<&ResourceId> {
        self.user_id.as_ref()
    }

    /// The user id, or the banner shown when there is none.
    pub fn require(&self) -> Result<&ResourceId, String> {
        self.user_id
            .as_ref()
            .ok_or_else(|| NOT_AUTHENTICATED.to_string())
    }
}

/// Data for a page plus the banner to show above it, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub error: Option<String>,
}

impl<T> Loaded<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }
}

impl<T: Default> Loaded<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            error: Some(message.into()),
        }
    }
}

impl<T: Default> From<ClientResult<T>> for Loaded<T> {
    fn from(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => Loaded::ok(data),
            Err(e) => Loaded::failed(e.to_string()),
        }
    }
}

/// Degrade a failed read to the empty value, logging what was lost.
fn or_empty<T: Default>(result: ClientResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load {what}");
        T::default()
    })
}

pub async fn load_cycles(api: &dyn PerformanceApi) -> Loaded<Vec<Cycle>> {
    api.list_cycles().await.into()
}

pub async fn load_templates(api: &dyn PerformanceApi) -> Loaded<Vec<Template>> {
    api.list_templates(false).await.into()
}

/// Assignments, optionally scoped to one cycle.
///
/// Without a cycle, the user's manager and employee assignments are loaded
/// together and merged (manager first, duplicates dropped). If only one of
/// them fails the other is shown as is.
pub async fn load_assignments(
    api: &dyn PerformanceApi,
    user: &UserContext,
    cycle: Option<&ResourceId>,
) -> Loaded<Vec<Assignment>> {
    if let Some(cycle_id) = cycle {
        return api.cycle_assignments(cycle_id).await.into();
    }

    let user_id = match user.require() {
        Ok(id) => id,
        Err(message) => return Loaded::failed(message),
    };

    let (as_manager, as_employee) = futures::join!(
        api.manager_assignments(user_id),
        api.employee_assignments(user_id)
    );

    match (as_manager, as_employee) {
        (Ok(managed), Ok(own)) => Loaded::ok(dedupe_by_id(managed.into_iter().chain(own).collect())),
        (Ok(managed), Err(e)) => {
            warn!(error = %e, "employee assignments unavailable");
            Loaded::ok(managed)
        }
        (Err(e), Ok(own)) => {
            warn!(error = %e, "manager assignments unavailable");
            Loaded::ok(own)
        }
        (Err(manager_err), Err(employee_err)) => {
            Loaded::failed(assignments_failure(&manager_err, &employee_err))
        }
    }
}

fn assignments_failure(manager_err: &ClientError, employee_err: &ClientError) -> String {
    if manager_err.is_forbidden() || employee_err.is_forbidden() {
        "You are not authorized to view assignments.".to_string()
    } else if manager_err.is_not_found() && employee_err.is_not_found() {
        "No assignments found for your account yet.".to_string()
    } else {
        format!("Failed to load assignments: {manager_err}")
    }
}

/// The manager's evaluation queue.
pub async fn load_evaluations(
    api: &dyn PerformanceApi,
    user: &UserContext,
) -> Loaded<Vec<Assignment>> {
    let user_id = match user.require() {
        Ok(id) => id,
        Err(message) => return Loaded::failed(message),
    };

    match api.manager_assignments(user_id).await {
        Ok(assignments) => Loaded::ok(assignments),
        Err(e) if e.is_forbidden() => Loaded::failed(
            "You are not authorized to perform evaluations. HR can assign you as a manager.",
        ),
        Err(e) if e.is_not_found() => {
            Loaded::failed("No evaluation assignments found for your account yet.")
        }
        Err(e) => Loaded::failed(e.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeOverview {
    pub cycles: Vec<Cycle>,
    pub templates: Vec<Template>,
}

pub async fn load_home(api: &dyn PerformanceApi) -> HomeOverview {
    let (cycles, templates) = futures::join!(api.list_cycles(), api.list_templates(true));

    HomeOverview {
        cycles: or_empty(cycles, "cycles"),
        templates: or_empty(templates, "active templates"),
    }
}

/// Choices offered by the cycle form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleFormOptions {
    pub templates: Vec<Template>,
    pub departments: Vec<Department>,
    pub error: Option<String>,
}

pub async fn load_cycle_form_options(api: &dyn PerformanceApi) -> CycleFormOptions {
    let (templates, departments) = futures::join!(api.list_templates(true), api.list_departments());

    let mut error = None;
    let departments = departments.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load departments");
        error = Some(format!(
            "Failed to load departments: {e}. Please ensure the backend is running and you have the required permissions."
        ));
        Vec::new()
    });

    CycleFormOptions {
        templates: or_empty(templates, "active templates"),
        departments,
        error,
    }
}

/// The cycle being edited plus the form's choices. Only the cycle itself is required.
pub async fn load_cycle_editor(
    api: &dyn PerformanceApi,
    id: &ResourceId,
) -> ClientResult<(Cycle, CycleFormOptions)> {
    let (cycle, options) = futures::join!(api.get_cycle(id), load_cycle_form_options(api));
    Ok((cycle?, options))
}

/// Choices offered by the create-assignments form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentOptions {
    pub cycles: Vec<Cycle>,
    pub templates: Vec<Template>,
    pub employees: Vec<Employee>,
}

pub async fn load_assignment_options(api: &dyn PerformanceApi) -> AssignmentOptions {
    let (cycles, templates, employees) = futures::join!(
        api.list_cycles(),
        api.list_templates(true),
        api.list_employees()
    );

    AssignmentOptions {
        cycles: or_empty(cycles, "cycles"),
        templates: or_empty(templates, "active templates"),
        employees: or_empty(employees, "employee profiles"),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub cycles: Vec<Cycle>,
    pub selected: Option<ResourceId>,
    pub stats: AssignmentStats,
    pub error: Option<String>,
}

/// Status counts for one cycle; the first cycle when none is selected.
pub async fn load_dashboard(api: &dyn PerformanceApi, selected: Option<&ResourceId>) -> Dashboard {
    let cycles = match api.list_cycles().await {
        Ok(cycles) => cycles,
        Err(e) => {
            return Dashboard {
                error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    let selected = selected
        .cloned()
        .or_else(|| cycles.first().map(|c| c.id.clone()));

    let stats = match &selected {
        Some(cycle_id) => {
            let assignments = or_empty(api.cycle_assignments(cycle_id).await, "cycle assignments");
            AssignmentStats::from_assignments(&assignments)
        }
        None => AssignmentStats::default(),
    };

    Dashboard {
        cycles,
        selected,
        stats,
        error: None,
    }
}

/// Records waiting for HR to publish.
///
/// Walks every cycle's SUBMITTED assignments to their latest record and keeps
/// the MANAGER_SUBMITTED ones. A failure anywhere below the cycle list only
/// drops that cycle or assignment.
pub async fn load_publish_queue(api: &dyn PerformanceApi) -> Loaded<Vec<AppraisalRecord>> {
    let cycles = match api.list_cycles().await {
        Ok(cycles) => cycles,
        Err(e) => return Loaded::failed(format!("Failed to load appraisals: {e}")),
    };

    let per_cycle = join_all(cycles.iter().map(|cycle| queued_in_cycle(api, cycle))).await;
    Loaded::ok(per_cycle.into_iter().flatten().collect())
}

async fn queued_in_cycle(api: &dyn PerformanceApi, cycle: &Cycle) -> Vec<AppraisalRecord> {
    let assignments = match api.cycle_assignments(&cycle.id).await {
        Ok(assignments) => assignments,
        Err(e) => {
            warn!(cycle = %cycle.id, error = %e, "skipping cycle in publish queue");
            return Vec::new();
        }
    };

    let submitted = assignments
        .into_iter()
        .filter(|a| a.status == AppraisalStatus::Submitted);
    join_all(submitted.map(|a| queued_record(api, cycle, a)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

async fn queued_record(
    api: &dyn PerformanceApi,
    cycle: &Cycle,
    assignment: Assignment,
) -> Option<AppraisalRecord> {
    let record_id = match &assignment.latest_appraisal_id {
        Some(id) => id.clone(),
        None => api
            .get_assignment(&assignment.id)
            .await
            .map_err(|e| warn!(assignment = %assignment.id, error = %e, "skipping assignment"))
            .ok()?
            .latest_appraisal_id?,
    };

    let mut record = api
        .get_record(&record_id)
        .await
        .map_err(|e| warn!(record = %record_id, error = %e, "skipping record"))
        .ok()?;
    if record.status != AppraisalStatus::ManagerSubmitted {
        return None;
    }

    let cycle_ref = match assignment.cycle {
        Some(populated @ Ref::Populated(_)) => populated,
        _ => Ref::Populated(Named {
            id: Some(cycle.id.clone()),
            name: cycle.name.clone(),
        }),
    };

    record.assignment = Some(Ref::Populated(AssignmentSummary {
        id: Some(assignment.id),
        cycle: Some(cycle_ref),
        template: assignment.template.map(template_name_ref),
        employee: assignment.employee,
    }));
    Some(record)
}

fn template_name_ref(template: Ref<TemplateSummary>) -> Ref<Named> {
    match template {
        Ref::Populated(t) => Ref::Populated(Named {
            id: t.id,
            name: t.name,
        }),
        Ref::Id(id) => Ref::Id(id),
    }
}

/// The employee's published (and already acknowledged) appraisals.
pub async fn load_my_appraisals(
    api: &dyn PerformanceApi,
    user: &UserContext,
) -> Loaded<Vec<AppraisalRecord>> {
    let user_id = match user.require() {
        Ok(id) => id,
        Err(message) => return Loaded::failed(message),
    };

    match api.employee_records(user_id, false).await {
        Ok(records) => Loaded::ok(
            records
                .into_iter()
                .filter(|r| {
                    matches!(
                        r.status,
                        AppraisalStatus::Published | AppraisalStatus::Acknowledged
                    )
                })
                .collect(),
        ),
        Err(e) => Loaded::failed(e.to_string()),
    }
}

pub async fn load_disputes(
    api: &dyn PerformanceApi,
    status: Option<DisputeStatus>,
) -> Loaded<Vec<Dispute>> {
    let mut loaded: Loaded<Vec<Dispute>> = api.list_disputes().await.into();
    if let Some(status) = status {
        loaded.data.retain(|d| d.status == status);
    }
    loaded
}
