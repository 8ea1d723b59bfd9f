//! The remote performance management API.

use appraisal_core::ResourceId;
use appraisal_core::assignment::Assignment;
use appraisal_core::cycle::Cycle;
use appraisal_core::dispute::Dispute;
use appraisal_core::form::{
    AcknowledgePayload, AssignmentPayload, CyclePayload, DisputePayload, RecordPayload,
    ResolvePayload, TemplatePayload,
};
use appraisal_core::organization::{Department, Employee};
use appraisal_core::record::{AppraisalRecord, EvaluationFormData};
use appraisal_core::template::Template;
use async_trait::async_trait;

use crate::ClientResult;

/// One method per backend endpoint.
///
/// Reads return typed records; writes whose response the portal never
/// inspects return `()`.
#[async_trait]
pub trait PerformanceApi: Send + Sync {
    // Cycles
    async fn list_cycles(&self) -> ClientResult<Vec<Cycle>>;
    async fn get_cycle(&self, id: &ResourceId) -> ClientResult<Cycle>;
    async fn create_cycle(&self, payload: &CyclePayload) -> ClientResult<()>;
    async fn update_cycle(&self, id: &ResourceId, payload: &CyclePayload) -> ClientResult<()>;
    async fn delete_cycle(&self, id: &ResourceId) -> ClientResult<()>;
    async fn cycle_assignments(&self, cycle_id: &ResourceId) -> ClientResult<Vec<Assignment>>;
    async fn create_assignments(
        &self,
        cycle_id: &ResourceId,
        payload: &AssignmentPayload,
    ) -> ClientResult<()>;

    // Templates
    async fn list_templates(&self, active_only: bool) -> ClientResult<Vec<Template>>;
    async fn get_template(&self, id: &ResourceId) -> ClientResult<Template>;
    async fn create_template(&self, payload: &TemplatePayload) -> ClientResult<()>;
    async fn update_template(&self, id: &ResourceId, payload: &TemplatePayload) -> ClientResult<()>;
    async fn delete_template(&self, id: &ResourceId) -> ClientResult<()>;

    // Assignments
    async fn manager_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>>;
    async fn employee_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>>;
    async fn get_assignment(&self, id: &ResourceId) -> ClientResult<Assignment>;
    async fn delete_assignment(&self, id: &ResourceId) -> ClientResult<()>;
    async fn evaluation_form(&self, assignment_id: &ResourceId) -> ClientResult<EvaluationFormData>;
    async fn save_record(&self, assignment_id: &ResourceId, payload: &RecordPayload)
    -> ClientResult<()>;

    // Appraisal records
    async fn get_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord>;
    async fn view_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord>;
    async fn employee_records(
        &self,
        user_id: &ResourceId,
        published_only: bool,
    ) -> ClientResult<Vec<AppraisalRecord>>;
    async fn submit_record(&self, id: &ResourceId) -> ClientResult<()>;
    async fn publish_record(&self, id: &ResourceId) -> ClientResult<()>;
    async fn acknowledge_record(
        &self,
        id: &ResourceId,
        payload: &AcknowledgePayload,
    ) -> ClientResult<()>;

    // Disputes
    async fn list_disputes(&self) -> ClientResult<Vec<Dispute>>;
    async fn get_dispute(&self, id: &ResourceId) -> ClientResult<Dispute>;
    async fn create_dispute(&self, payload: &DisputePayload) -> ClientResult<()>;
    async fn resolve_dispute(&self, id: &ResourceId, payload: &ResolvePayload) -> ClientResult<()>;

    // Organization
    async fn list_departments(&self) -> ClientResult<Vec<Department>>;
    async fn list_employees(&self) -> ClientResult<Vec<Employee>>;
}
