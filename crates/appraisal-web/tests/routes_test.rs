//! Route tests against the mock API.

use std::sync::Arc;

use appraisal_client::ClientError;
use appraisal_client::mock::{MockPerformanceApi, test_cycle};
use appraisal_config::SessionConfig;
use appraisal_core::cycle::Cycle;
use appraisal_core::dispute::Dispute;
use appraisal_core::record::EvaluationFormData;
use appraisal_web::{AppState, routes};
use axum::Router;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

fn app(api: &Arc<MockPerformanceApi>) -> Router {
    routes::router(AppState::new(api.clone(), SessionConfig::default()))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: Router, uri: &str, form: &str) -> Response {
    app.oneshot(
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    app.oneshot(
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// The `flash=...` pair from a redirect, ready to send back.
fn flash_cookie(response: &Response) -> String {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("flash="))
        .and_then(|c| c.split(';').next().map(str::to_string))
        .unwrap()
}

fn status_error(code: u16, message: &str) -> ClientError {
    ClientError::Status {
        status: code,
        message: message.to_string(),
    }
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = get(app(&api), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("ok"));
}

#[tokio::test]
async fn test_ready_reports_unreachable_backend() {
    let api = Arc::new(
        MockPerformanceApi::new()
            .with_error("list_cycles", ClientError::Transport("connection refused".to_string())),
    );
    let response = get(app(&api), "/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(text(response).await.contains("unavailable"));
}

// ── Pages ──

#[tokio::test]
async fn test_home_lists_recent_cycles() {
    let api = Arc::new(MockPerformanceApi::new().with_cycle(test_cycle("c1", "FY2025 Annual")));
    let response = get(app(&api), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("FY2025 Annual"));
}

#[tokio::test]
async fn test_list_page_shows_backend_error_inline() {
    let api = Arc::new(
        MockPerformanceApi::new().with_error("list_cycles", status_error(500, "database offline")),
    );
    let response = get(app(&api), "/cycles").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("database offline"));
}

#[tokio::test]
async fn test_missing_cycle_renders_not_found() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = get(app(&api), "/cycles/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text(response).await.contains("Back to cycles"));
}

#[tokio::test]
async fn test_evaluations_need_a_user() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = get(app(&api), "/evaluations").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("User not authenticated"));
    assert!(api.calls_to("manager_assignments").is_empty());
}

#[tokio::test]
async fn test_user_header_selects_the_manager() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = app(&api)
        .oneshot(
            Request::get("/evaluations")
                .header("x-user-id", "mgr-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = api.calls_to("manager_assignments");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("mgr-7"));
}

#[tokio::test]
async fn test_user_cookie_is_used_without_header() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = app(&api)
        .oneshot(
            Request::get("/my-appraisals")
                .header(header::COOKIE, "perf_user_id=emp-3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = api.calls_to("employee_records");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("emp-3"));
}

// ── Writes ──

#[tokio::test]
async fn test_session_switch_sets_cookie() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(app(&api), "/session", "user_id=emp-9").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("perf_user_id=emp-9")));
}

#[tokio::test]
async fn test_create_assignments_requires_employees() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/assignments/new",
        "cycle_id=c1&template_id=t1&employee_ids_json=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Please select at least one employee"));
    assert!(api.calls_to("create_assignments").is_empty());
}

#[tokio::test]
async fn test_create_assignments_redirects_with_flash() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/assignments/new",
        "cycle_id=c1&template_id=t1&employee_ids=e1&employee_ids=e2&employee_ids_json=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/assignments?cycle=c1");
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("flash=")));

    let calls = api.calls_to("create_assignments");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("c1"));
    assert_eq!(
        calls[0].body,
        Some(serde_json::json!({"templateId": "t1", "employeeIds": ["e1", "e2"]}))
    );
}

#[tokio::test]
async fn test_publish_failure_is_flashed() {
    let api = Arc::new(
        MockPerformanceApi::new().with_error("publish_record", status_error(400, "Not submitted")),
    );
    let response = post_form(app(&api), "/publish/r1", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/publish");
    assert_eq!(api.calls_to("publish_record").len(), 1);

    let cookie = flash_cookie(&response);
    let body = text(get_with_cookie(app(&api), "/publish", &cookie).await).await;
    assert!(body.contains("banner banner-error"));
    assert!(body.contains("Failed to publish appraisal"));
    assert!(!body.contains("banner banner-flash"));
}

#[tokio::test]
async fn test_success_flash_uses_the_success_banner() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(app(&api), "/publish/r1", "").await;
    let cookie = flash_cookie(&response);

    let body = text(get_with_cookie(app(&api), "/publish", &cookie).await).await;
    assert!(body.contains("banner banner-flash"));
    assert!(!body.contains("banner banner-error"));
}

#[tokio::test]
async fn test_closed_dispute_cannot_be_resolved() {
    let dispute: Dispute = serde_json::from_value(serde_json::json!({
        "_id": "d1", "reason": "Unfair", "status": "REJECTED"
    }))
    .unwrap();
    let api = Arc::new(MockPerformanceApi::new().with_dispute(dispute));

    let response = post_form(
        app(&api),
        "/disputes/d1",
        "resolution=approve&resolution_summary=Reviewed",
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(api.calls_to("resolve_dispute").is_empty());
}

#[tokio::test]
async fn test_resolution_requires_summary() {
    let dispute: Dispute = serde_json::from_value(serde_json::json!({
        "_id": "d2", "reason": "Unfair", "status": "OPEN"
    }))
    .unwrap();
    let api = Arc::new(MockPerformanceApi::new().with_dispute(dispute));

    let response = post_form(app(&api), "/disputes/d2", "resolution=reject&resolution_summary=").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Resolution summary is required"));
    assert!(api.calls_to("resolve_dispute").is_empty());
}

#[tokio::test]
async fn test_dispute_list_keeps_unknown_statuses() {
    let disputes: Vec<Dispute> = serde_json::from_value(serde_json::json!([
        {"_id": "d1", "reason": "Scores were too low", "status": "OPEN"},
        {"_id": "d2", "reason": "Changed my mind", "status": "WITHDRAWN"}
    ]))
    .unwrap();
    let api = disputes
        .into_iter()
        .fold(MockPerformanceApi::new(), MockPerformanceApi::with_dispute);
    let api = Arc::new(api);

    let response = get(app(&api), "/disputes").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("Scores were too low"));
    assert!(body.contains("Changed my mind"));
    assert!(body.contains("WITHDRAWN"));
}

// ── Cycle form ──

#[tokio::test]
async fn test_cycle_add_row_rerenders_without_saving() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(app(&api), "/cycles/new", "name=Q4&rows=0&action=add_row").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="rows" value="1""#));
    assert!(body.contains(r#"name="ta0_template""#));
    assert!(body.contains(r#"value="Q4""#));
    assert!(api.calls_to("create_cycle").is_empty());
}

#[tokio::test]
async fn test_cycle_remove_row_drops_that_row() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/cycles/new",
        "name=Q4&rows=2&ta0_template=t1&ta1_template=t2&action=remove_row%3A0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="rows" value="1""#));
    assert!(body.contains(r#"value="t2" selected"#));
    assert!(!body.contains(r#"value="t1""#));
    assert!(api.calls_to("create_cycle").is_empty());
}

#[tokio::test]
async fn test_cycle_create_sends_template_assignments() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/cycles/new",
        "name=Q4+Review&cycle_type=ANNUAL&start_date=2025-10-01&end_date=2025-12-31\
         &rows=1&ta0_template=t1&ta0_departments=d1&ta0_departments=d2&action=save",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cycles");

    let calls = api.calls_to("create_cycle");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        Some(serde_json::json!({
            "name": "Q4 Review",
            "description": "",
            "cycleType": "ANNUAL",
            "startDate": "2025-10-01",
            "endDate": "2025-12-31",
            "templateAssignments": [{"templateId": "t1", "departmentIds": ["d1", "d2"]}]
        }))
    );
}

#[tokio::test]
async fn test_cycle_edit_updates_and_returns_to_detail() {
    let api = Arc::new(MockPerformanceApi::new().with_cycle(test_cycle("c1", "Q4 Review")));
    let response = post_form(
        app(&api),
        "/cycles/c1/edit",
        "name=Q4+Review&start_date=2025-10-01&end_date=2025-12-31&rows=1&ta0_template=t2&action=save",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cycles/c1");
    assert!(api.calls_to("create_cycle").is_empty());

    let calls = api.calls_to("update_cycle");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("c1"));
    let body = calls[0].body.clone().unwrap();
    assert_eq!(body["templateAssignments"][0]["templateId"], "t2");
}

#[tokio::test]
async fn test_cycle_row_count_is_capped() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/cycles/new",
        "name=Q4&start_date=2025-10-01&end_date=2025-12-31&rows=18446744073709551615&action=save",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = text(response).await;
    assert!(body.contains("Select a template for template assignment 1"));
    assert!(body.contains(&format!(r#"name="rows" value="{}""#, appraisal_web::form_data::MAX_ROWS)));
    assert!(api.calls_to("create_cycle").is_empty());
}

#[tokio::test]
async fn test_cycle_edit_page_skips_null_templates() {
    let cycle: Cycle = serde_json::from_value(serde_json::json!({
        "_id": "c1",
        "name": "Mid-year",
        "templateAssignments": [
            {"templateId": null, "departmentIds": ["d1"]},
            {"templateId": "t9", "departmentIds": []}
        ]
    }))
    .unwrap();
    let api = Arc::new(MockPerformanceApi::new().with_cycle(cycle));

    let response = get(app(&api), "/cycles/c1/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="rows" value="1""#));
    assert!(body.contains(r#"value="t9" selected"#));
    assert!(body.contains(r#"value="Mid-year""#));
}

// ── Template form ──

#[tokio::test]
async fn test_template_add_criterion_moves_draft_into_rows() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/templates/new",
        "name=Core&scale_min=1&scale_max=5&rows=0&new_key=quality&new_title=Quality&action=add_row",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="rows" value="1""#));
    assert!(body.contains(r#"name="c0_key" value="quality""#));
    assert!(body.contains(r#"name="new_key" value="""#));
    assert!(api.calls_to("create_template").is_empty());
}

#[tokio::test]
async fn test_template_remove_criterion_reindexes_rows() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/templates/new",
        "name=Core&scale_min=1&scale_max=5&rows=2&c0_key=quality&c0_title=Quality\
         &c1_key=delivery&c1_title=Delivery&action=remove_row%3A0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains(r#"name="rows" value="1""#));
    assert!(body.contains(r#"name="c0_key" value="delivery""#));
    assert!(!body.contains(r#"value="quality""#));
}

#[tokio::test]
async fn test_template_save_sends_criteria() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/templates/new",
        "name=Core&scale_min=1&scale_max=5&rows=2&c0_key=quality&c0_title=Quality\
         &c1_key=delivery&c1_title=Delivery&c1_required=on&action=save",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/templates");

    let calls = api.calls_to("create_template");
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.clone().unwrap();
    assert_eq!(body["criteria"][0]["key"], "quality");
    assert_eq!(body["criteria"][1]["key"], "delivery");
    assert_eq!(body["criteria"][1]["required"], true);
}

#[tokio::test]
async fn test_template_duplicate_criteria_are_rejected() {
    let api = Arc::new(MockPerformanceApi::new());
    let response = post_form(
        app(&api),
        "/templates/new",
        "name=Core&scale_min=1&scale_max=5&rows=2&c0_key=quality&c0_title=Quality\
         &c1_key=quality&c1_title=Again&action=save",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("already exists"));
    assert!(api.calls_to("create_template").is_empty());
}

// ── Evaluation form ──

fn evaluation(existing_record: Option<serde_json::Value>) -> EvaluationFormData {
    let mut json = serde_json::json!({
        "assignment": {"_id": "a1", "status": "IN_PROGRESS"},
        "template": {
            "_id": "t1",
            "name": "Engineering",
            "criteria": [{"key": "delivery", "title": "Delivery"}]
        }
    });
    if let Some(record) = existing_record {
        json["existingRecord"] = record;
    }
    serde_json::from_value(json).unwrap()
}

#[tokio::test]
async fn test_submit_existing_record_by_id() {
    let data = evaluation(Some(serde_json::json!({
        "_id": "r1",
        "status": "DRAFT",
        "ratings": [{"key": "delivery", "ratingValue": 3}]
    })));
    let api = Arc::new(MockPerformanceApi::new().with_form("a1", data));

    let response = post_form(
        app(&api),
        "/evaluations/a1",
        "r0_score=4&r0_comment=Solid&manager_summary=Good+year&action=submit",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/evaluations");
    let calls = api.calls_to("submit_record");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("r1"));
    assert!(api.calls_to("save_record").is_empty());
}

#[tokio::test]
async fn test_submit_without_record_creates_it_submitted() {
    let api = Arc::new(MockPerformanceApi::new().with_form("a1", evaluation(None)));

    let response = post_form(
        app(&api),
        "/evaluations/a1",
        "r0_score=4&r0_comment=Solid&manager_summary=Good+year&action=submit",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/evaluations");
    assert!(api.calls_to("submit_record").is_empty());

    let calls = api.calls_to("save_record");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.as_deref(), Some("a1"));
    let body = calls[0].body.clone().unwrap();
    assert_eq!(body["status"], "MANAGER_SUBMITTED");
    assert_eq!(body["ratings"][0]["criterionKey"], "delivery");
    assert_eq!(body["ratings"][0]["score"].as_f64(), Some(4.0));
    assert_eq!(body["managerSummary"], "Good year");
}

#[tokio::test]
async fn test_save_draft_stays_on_the_form() {
    let api = Arc::new(MockPerformanceApi::new().with_form("a1", evaluation(None)));

    let response = post_form(app(&api), "/evaluations/a1", "r0_score=2&action=save").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/evaluations/a1");
    let calls = api.calls_to("save_record");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].body.as_ref().unwrap().get("status").is_none());
}

#[tokio::test]
async fn test_non_finite_score_is_rejected() {
    let api = Arc::new(MockPerformanceApi::new().with_form("a1", evaluation(None)));

    for score in ["NaN", "inf", "-infinity"] {
        let response = post_form(
            app(&api),
            "/evaluations/a1",
            &format!("r0_score={score}&action=submit"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(text(response).await.contains("Score for delivery must be a number"));
    }
    assert!(api.calls_to("save_record").is_empty());
    assert!(api.calls_to("submit_record").is_empty());
}
