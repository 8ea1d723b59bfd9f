//! Mock API for unit and route tests.
//!
//! Serves pre-configured records, records every call, and can be told to
//! fail individual endpoints.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use appraisal_core::ResourceId;
use appraisal_core::assignment::{AppraisalStatus, Assignment};
use appraisal_core::cycle::{Cycle, CycleType};
use appraisal_core::dispute::Dispute;
use appraisal_core::form::{
    AcknowledgePayload, AssignmentPayload, CyclePayload, DisputePayload, RecordPayload,
    ResolvePayload, TemplatePayload,
};
use appraisal_core::organization::{Department, Employee};
use appraisal_core::record::{AppraisalRecord, EvaluationFormData};
use appraisal_core::template::Template;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::{ClientError, ClientResult, PerformanceApi};

/// A recorded call to the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Trait method name, e.g. `"create_cycle"`.
    pub method: &'static str,
    /// Path id the call addressed, if any.
    pub target: Option<String>,
    /// Request body, for writes.
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct Store {
    cycles: Vec<Cycle>,
    templates: Vec<Template>,
    manager_assignments: Vec<Assignment>,
    employee_assignments: Vec<Assignment>,
    cycle_assignments: HashMap<String, Vec<Assignment>>,
    records: Vec<AppraisalRecord>,
    forms: HashMap<String, EvaluationFormData>,
    disputes: Vec<Dispute>,
    departments: Vec<Department>,
    employees: Vec<Employee>,
}

/// Mock implementation of `PerformanceApi` for testing.
#[derive(Default)]
pub struct MockPerformanceApi {
    store: Mutex<Store>,
    calls: Mutex<Vec<MockCall>>,
    errors: Mutex<HashMap<&'static str, ClientError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn not_found(what: &str, id: &ResourceId) -> ClientError {
    ClientError::Status {
        status: 404,
        message: format!("{what} {id} not found"),
    }
}

impl MockPerformanceApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store(self, edit: impl FnOnce(&mut Store)) -> Self {
        edit(&mut lock(&self.store));
        self
    }

    pub fn with_cycle(self, cycle: Cycle) -> Self {
        self.with_store(|s| s.cycles.push(cycle))
    }

    pub fn with_template(self, template: Template) -> Self {
        self.with_store(|s| s.templates.push(template))
    }

    pub fn with_manager_assignments(self, assignments: Vec<Assignment>) -> Self {
        self.with_store(|s| s.manager_assignments = assignments)
    }

    pub fn with_employee_assignments(self, assignments: Vec<Assignment>) -> Self {
        self.with_store(|s| s.employee_assignments = assignments)
    }

    pub fn with_cycle_assignments(self, cycle_id: &str, assignments: Vec<Assignment>) -> Self {
        self.with_store(|s| {
            s.cycle_assignments.insert(cycle_id.to_string(), assignments);
        })
    }

    pub fn with_record(self, record: AppraisalRecord) -> Self {
        self.with_store(|s| s.records.push(record))
    }

    pub fn with_form(self, assignment_id: &str, form: EvaluationFormData) -> Self {
        self.with_store(|s| {
            s.forms.insert(assignment_id.to_string(), form);
        })
    }

    pub fn with_dispute(self, dispute: Dispute) -> Self {
        self.with_store(|s| s.disputes.push(dispute))
    }

    pub fn with_departments(self, departments: Vec<Department>) -> Self {
        self.with_store(|s| s.departments = departments)
    }

    pub fn with_employees(self, employees: Vec<Employee>) -> Self {
        self.with_store(|s| s.employees = employees)
    }

    /// Make every call to `method` fail with `err`.
    pub fn with_error(self, method: &'static str, err: ClientError) -> Self {
        lock(&self.errors).insert(method, err);
        self
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Return the number of recorded calls.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Recorded calls to one method.
    pub fn calls_to(&self, method: &str) -> Vec<MockCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Record a call and return the configured error for it, if any.
    fn enter(
        &self,
        method: &'static str,
        target: Option<&ResourceId>,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> ClientResult<()> {
        lock(&self.calls).push(MockCall {
            method,
            target: target.map(ToString::to_string),
            body: body.and_then(|b| serde_json::to_value(b).ok()),
        });
        match lock(&self.errors).get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn read(&self, method: &'static str, target: Option<&ResourceId>) -> ClientResult<()> {
        self.enter(method, target, None::<&()>)
    }

    fn find_assignment(&self, id: &ResourceId) -> Option<Assignment> {
        let store = lock(&self.store);
        store
            .manager_assignments
            .iter()
            .chain(&store.employee_assignments)
            .chain(store.cycle_assignments.values().flatten())
            .find(|a| &a.id == id)
            .cloned()
    }

    fn find_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord> {
        lock(&self.store)
            .records
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| not_found("Appraisal record", id))
    }
}

#[async_trait]
impl PerformanceApi for MockPerformanceApi {
    async fn list_cycles(&self) -> ClientResult<Vec<Cycle>> {
        self.read("list_cycles", None)?;
        Ok(lock(&self.store).cycles.clone())
    }

    async fn get_cycle(&self, id: &ResourceId) -> ClientResult<Cycle> {
        self.read("get_cycle", Some(id))?;
        lock(&self.store)
            .cycles
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Cycle", id))
    }

    async fn create_cycle(&self, payload: &CyclePayload) -> ClientResult<()> {
        self.enter("create_cycle", None, Some(payload))
    }

    async fn update_cycle(&self, id: &ResourceId, payload: &CyclePayload) -> ClientResult<()> {
        self.enter("update_cycle", Some(id), Some(payload))
    }

    async fn delete_cycle(&self, id: &ResourceId) -> ClientResult<()> {
        self.read("delete_cycle", Some(id))?;
        lock(&self.store).cycles.retain(|c| &c.id != id);
        Ok(())
    }

    async fn cycle_assignments(&self, cycle_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.read("cycle_assignments", Some(cycle_id))?;
        Ok(lock(&self.store)
            .cycle_assignments
            .get(cycle_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_assignments(
        &self,
        cycle_id: &ResourceId,
        payload: &AssignmentPayload,
    ) -> ClientResult<()> {
        self.enter("create_assignments", Some(cycle_id), Some(payload))
    }

    async fn list_templates(&self, active_only: bool) -> ClientResult<Vec<Template>> {
        self.read("list_templates", None)?;
        Ok(lock(&self.store)
            .templates
            .iter()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect())
    }

    async fn get_template(&self, id: &ResourceId) -> ClientResult<Template> {
        self.read("get_template", Some(id))?;
        lock(&self.store)
            .templates
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Template", id))
    }

    async fn create_template(&self, payload: &TemplatePayload) -> ClientResult<()> {
        self.enter("create_template", None, Some(payload))
    }

    async fn update_template(&self, id: &ResourceId, payload: &TemplatePayload) -> ClientResult<()> {
        self.enter("update_template", Some(id), Some(payload))
    }

    async fn delete_template(&self, id: &ResourceId) -> ClientResult<()> {
        self.read("delete_template", Some(id))?;
        lock(&self.store).templates.retain(|t| &t.id != id);
        Ok(())
    }

    async fn manager_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.read("manager_assignments", Some(user_id))?;
        Ok(lock(&self.store).manager_assignments.clone())
    }

    async fn employee_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.read("employee_assignments", Some(user_id))?;
        Ok(lock(&self.store).employee_assignments.clone())
    }

    async fn get_assignment(&self, id: &ResourceId) -> ClientResult<Assignment> {
        self.read("get_assignment", Some(id))?;
        self.find_assignment(id)
            .ok_or_else(|| not_found("Assignment", id))
    }

    async fn delete_assignment(&self, id: &ResourceId) -> ClientResult<()> {
        self.read("delete_assignment", Some(id))
    }

    async fn evaluation_form(&self, assignment_id: &ResourceId) -> ClientResult<EvaluationFormData> {
        self.read("evaluation_form", Some(assignment_id))?;
        lock(&self.store)
            .forms
            .get(assignment_id.as_str())
            .cloned()
            .ok_or_else(|| not_found("Assignment", assignment_id))
    }

    async fn save_record(
        &self,
        assignment_id: &ResourceId,
        payload: &RecordPayload,
    ) -> ClientResult<()> {
        self.enter("save_record", Some(assignment_id), Some(payload))
    }

    async fn get_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord> {
        self.read("get_record", Some(id))?;
        self.find_record(id)
    }

    async fn view_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord> {
        self.read("view_record", Some(id))?;
        self.find_record(id)
    }

    async fn employee_records(
        &self,
        user_id: &ResourceId,
        published_only: bool,
    ) -> ClientResult<Vec<AppraisalRecord>> {
        self.read("employee_records", Some(user_id))?;
        Ok(lock(&self.store)
            .records
            .iter()
            .filter(|r| !published_only || r.status == AppraisalStatus::Published)
            .cloned()
            .collect())
    }

    async fn submit_record(&self, id: &ResourceId) -> ClientResult<()> {
        self.read("submit_record", Some(id))
    }

    async fn publish_record(&self, id: &ResourceId) -> ClientResult<()> {
        self.read("publish_record", Some(id))
    }

    async fn acknowledge_record(
        &self,
        id: &ResourceId,
        payload: &AcknowledgePayload,
    ) -> ClientResult<()> {
        self.enter("acknowledge_record", Some(id), Some(payload))
    }

    async fn list_disputes(&self) -> ClientResult<Vec<Dispute>> {
        self.read("list_disputes", None)?;
        Ok(lock(&self.store).disputes.clone())
    }

    async fn get_dispute(&self, id: &ResourceId) -> ClientResult<Dispute> {
        self.read("get_dispute", Some(id))?;
        lock(&self.store)
            .disputes
            .iter()
            .find(|d| &d.id == id)
            .cloned()
            .ok_or_else(|| not_found("Dispute", id))
    }

    async fn create_dispute(&self, payload: &DisputePayload) -> ClientResult<()> {
        self.enter("create_dispute", None, Some(payload))
    }

    async fn resolve_dispute(&self, id: &ResourceId, payload: &ResolvePayload) -> ClientResult<()> {
        self.enter("resolve_dispute", Some(id), Some(payload))
    }

    async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        self.read("list_departments", None)?;
        Ok(lock(&self.store).departments.clone())
    }

    async fn list_employees(&self) -> ClientResult<Vec<Employee>> {
        self.read("list_employees", None)?;
        Ok(lock(&self.store).employees.clone())
    }
}

/// Helper to create a test cycle running through 2025.
pub fn test_cycle(id: &str, name: &str) -> Cycle {
    Cycle {
        id: ResourceId::from(id),
        name: name.to_string(),
        description: None,
        cycle_type: Some(CycleType::Annual),
        start_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single(),
        end_date: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).single(),
        manager_due_date: None,
        employee_acknowledgement_due_date: None,
        template_assignments: Vec::new(),
        status: None,
    }
}

/// Helper to create a bare test assignment.
pub fn test_assignment(id: &str, status: &str) -> Assignment {
    Assignment {
        id: ResourceId::from(id),
        cycle: None,
        template: None,
        employee: None,
        manager: None,
        legacy_manager: None,
        department: None,
        status: AppraisalStatus::from(status),
        due_date: None,
        created_at: None,
        latest_appraisal_id: None,
    }
}

/// Helper to create a test record with no ratings or timestamps.
pub fn test_record(id: &str, status: &str) -> AppraisalRecord {
    AppraisalRecord {
        id: ResourceId::from(id),
        assignment: None,
        ratings: Vec::new(),
        manager_summary: None,
        overall_comment: None,
        strengths: Vec::new(),
        improvement_areas: Vec::new(),
        total_score: None,
        overall_rating_label: None,
        status: AppraisalStatus::from(status),
        manager_submitted_at: None,
        published_at: None,
        hr_published_at: None,
        acknowledged_at: None,
    }
}
