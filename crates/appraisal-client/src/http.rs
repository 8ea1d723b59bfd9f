//! reqwest implementation of [`PerformanceApi`].

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
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ClientError, ClientResult, PerformanceApi};

/// HTTP client for the performance management backend.
#[derive(Clone)]
pub struct HttpPerformanceApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPerformanceApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(ClientError::from_response(status.as_u16(), &text))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let text = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    /// GET a list; a `null` body is an empty list.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        self.get::<Option<Vec<T>>>(path)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        tracing::debug!(method = method.as_str(), path, "write");
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn post_empty(&self, path: &str) -> ClientResult<()> {
        self.send::<()>(Method::POST, path, None).await
    }

    async fn put<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send::<()>(Method::DELETE, path, None).await
    }
}

/// Percent-encode an id for use as one path segment.
fn seg(id: &ResourceId) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

#[async_trait]
impl PerformanceApi for HttpPerformanceApi {
    async fn list_cycles(&self) -> ClientResult<Vec<Cycle>> {
        self.get_list("/performance/cycles").await
    }

    async fn get_cycle(&self, id: &ResourceId) -> ClientResult<Cycle> {
        self.get(&format!("/performance/cycles/{}", seg(id))).await
    }

    async fn create_cycle(&self, payload: &CyclePayload) -> ClientResult<()> {
        self.post("/performance/cycles", payload).await
    }

    async fn update_cycle(&self, id: &ResourceId, payload: &CyclePayload) -> ClientResult<()> {
        self.put(&format!("/performance/cycles/{}", seg(id)), payload)
            .await
    }

    async fn delete_cycle(&self, id: &ResourceId) -> ClientResult<()> {
        self.delete(&format!("/performance/cycles/{}", seg(id))).await
    }

    async fn cycle_assignments(&self, cycle_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.get_list(&format!("/performance/cycles/{}/assignments", seg(cycle_id)))
            .await
    }

    async fn create_assignments(
        &self,
        cycle_id: &ResourceId,
        payload: &AssignmentPayload,
    ) -> ClientResult<()> {
        self.post(
            &format!("/performance/cycles/{}/assignments", seg(cycle_id)),
            payload,
        )
        .await
    }

    async fn list_templates(&self, active_only: bool) -> ClientResult<Vec<Template>> {
        if active_only {
            self.get_list("/performance/templates?activeOnly=true").await
        } else {
            self.get_list("/performance/templates").await
        }
    }

    async fn get_template(&self, id: &ResourceId) -> ClientResult<Template> {
        self.get(&format!("/performance/templates/{}", seg(id))).await
    }

    async fn create_template(&self, payload: &TemplatePayload) -> ClientResult<()> {
        self.post("/performance/templates", payload).await
    }

    async fn update_template(&self, id: &ResourceId, payload: &TemplatePayload) -> ClientResult<()> {
        self.put(&format!("/performance/templates/{}", seg(id)), payload)
            .await
    }

    async fn delete_template(&self, id: &ResourceId) -> ClientResult<()> {
        self.delete(&format!("/performance/templates/{}", seg(id)))
            .await
    }

    async fn manager_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.get_list(&format!("/performance/assignments/manager/{}", seg(user_id)))
            .await
    }

    async fn employee_assignments(&self, user_id: &ResourceId) -> ClientResult<Vec<Assignment>> {
        self.get_list(&format!("/performance/assignments/employee/{}", seg(user_id)))
            .await
    }

    async fn get_assignment(&self, id: &ResourceId) -> ClientResult<Assignment> {
        self.get(&format!("/performance/assignments/{}", seg(id))).await
    }

    async fn delete_assignment(&self, id: &ResourceId) -> ClientResult<()> {
        self.delete(&format!("/performance/assignments/{}", seg(id)))
            .await
    }

    async fn evaluation_form(&self, assignment_id: &ResourceId) -> ClientResult<EvaluationFormData> {
        self.get(&format!("/performance/assignments/{}/form", seg(assignment_id)))
            .await
    }

    async fn save_record(
        &self,
        assignment_id: &ResourceId,
        payload: &RecordPayload,
    ) -> ClientResult<()> {
        self.post(
            &format!("/performance/assignments/{}/records", seg(assignment_id)),
            payload,
        )
        .await
    }

    async fn get_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord> {
        self.get(&format!("/performance/records/{}", seg(id))).await
    }

    async fn view_record(&self, id: &ResourceId) -> ClientResult<AppraisalRecord> {
        self.get(&format!("/performance/records/{}/view", seg(id))).await
    }

    async fn employee_records(
        &self,
        user_id: &ResourceId,
        published_only: bool,
    ) -> ClientResult<Vec<AppraisalRecord>> {
        let suffix = if published_only { "/published" } else { "" };
        self.get_list(&format!(
            "/performance/records/employee/{}{}",
            seg(user_id),
            suffix
        ))
        .await
    }

    async fn submit_record(&self, id: &ResourceId) -> ClientResult<()> {
        self.post_empty(&format!("/performance/records/{}/submit", seg(id)))
            .await
    }

    async fn publish_record(&self, id: &ResourceId) -> ClientResult<()> {
        self.post_empty(&format!("/performance/records/{}/publish", seg(id)))
            .await
    }

    async fn acknowledge_record(
        &self,
        id: &ResourceId,
        payload: &AcknowledgePayload,
    ) -> ClientResult<()> {
        self.post(
            &format!("/performance/records/{}/acknowledge", seg(id)),
            payload,
        )
        .await
    }

    async fn list_disputes(&self) -> ClientResult<Vec<Dispute>> {
        self.get_list("/performance/disputes").await
    }

    async fn get_dispute(&self, id: &ResourceId) -> ClientResult<Dispute> {
        self.get(&format!("/performance/disputes/{}", seg(id))).await
    }

    async fn create_dispute(&self, payload: &DisputePayload) -> ClientResult<()> {
        self.post("/performance/disputes", payload).await
    }

    async fn resolve_dispute(&self, id: &ResourceId, payload: &ResolvePayload) -> ClientResult<()> {
        self.post(&format!("/performance/disputes/{}/resolve", seg(id)), payload)
            .await
    }

    async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        self.get_list("/organization-structure/departments").await
    }

    async fn list_employees(&self) -> ClientResult<Vec<Employee>> {
        self.get_list("/employee-profile").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpPerformanceApi::new("http://localhost:5000/");
        assert_eq!(api.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_path_segments_encoded() {
        assert_eq!(seg(&ResourceId::from("a/b c")), "a%2Fb%20c");
        assert_eq!(seg(&ResourceId::from("665f0c2a")), "665f0c2a");
    }
}
