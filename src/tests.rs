//! Integration tests for the BuildHub backend.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::Sha256;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::models::CreateUserRequest;
use crate::search::SearchIndex;
use crate::{create_router, AppState};

const TEST_WEBHOOK_SECRET: &str = "whsec_dGVzdC1zZWNyZXQta2V5";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    repo: Arc<Repository>,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Initialize search index
        let search = Arc::new(SearchIndex::open(&index_path).expect("Failed to init search"));

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo: repo.clone(),
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            repo,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Seed a user directly; users are normally provisioned via webhook.
    async fn seed_user(&self, clerk_id: &str, name: &str, permissions: &[&str]) {
        self.repo
            .create_user(&CreateUserRequest {
                clerk_id: clerk_id.to_string(),
                display_name: name.to_string(),
                team_id: None,
                employee_id: None,
                permissions: permissions.iter().map(|s| s.to_string()).collect(),
            })
            .await
            .expect("Failed to seed user");
    }

    async fn create_project(&self, name: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/projects"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn webhook_signature(msg_id: &str, timestamp: &str, body: &str) -> String {
    let key = BASE64
        .decode(TEST_WEBHOOK_SECRET.strip_prefix("whsec_").unwrap())
        .unwrap();
    let mut mac = Hmac::<Sha256>::new_from_slice(&key).unwrap();
    mac.update(format!("{}.{}.{}", msg_id, timestamp, body).as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Plain client without the default x-api-key header
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::new().await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/projects"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_project_crud() {
    let fixture = TestFixture::new().await;

    // Create
    let create_resp = fixture
        .client
        .post(fixture.url("/api/projects"))
        .json(&json!({
            "name": "Riverside Apartments",
            "description": "12-unit residential build",
            "location": "Portland"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 201);
    let create_body: Value = create_resp.json().await.unwrap();
    assert_eq!(create_body["success"], true);
    let project_id = create_body["data"]["id"].as_str().unwrap();
    assert_eq!(create_body["data"]["name"], "Riverside Apartments");
    assert_eq!(create_body["data"]["status"], "PLANNING");

    // Get
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);
    let get_body: Value = get_resp.json().await.unwrap();
    assert_eq!(get_body["data"]["location"], "Portland");

    // Update
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/projects/{}", project_id)))
        .json(&json!({ "status": "IN_PROGRESS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["status"], "IN_PROGRESS");
    // Untouched fields survive the partial update
    assert_eq!(update_body["data"]["name"], "Riverside Apartments");

    // List
    let list_resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    // Second delete is a 404, not a silent success
    let second_delete = fixture
        .client
        .delete(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(second_delete.status(), 404);
}

#[tokio::test]
async fn test_validation_error_writes_nothing() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/projects"))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let list_resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    assert!(list_body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_nonexistent_returns_404() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/projects/no-such-id"))
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let list_resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    assert!(list_body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_project_members_and_attachments() {
    let fixture = TestFixture::new().await;
    let project_id = fixture.create_project("Warehouse Extension").await;

    // Add member twice; membership is a set
    for _ in 0..2 {
        let resp = fixture
            .client
            .post(fixture.url(&format!("/api/projects/{}/members", project_id)))
            .json(&json!({ "userId": "user-1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    let body: Value = get_resp.json().await.unwrap();
    assert_eq!(body["data"]["memberIds"], json!(["user-1"]));

    // Attachment round trip
    let add_resp = fixture
        .client
        .post(fixture.url(&format!("/api/projects/{}/attachments", project_id)))
        .json(&json!({
            "fileName": "site-plan.pdf",
            "fileUrl": "https://files.example/site-plan.pdf",
            "uploadedBy": "user-1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(add_resp.status(), 200);
    let add_body: Value = add_resp.json().await.unwrap();
    assert_eq!(add_body["data"]["attachments"][0]["fileName"], "site-plan.pdf");

    let remove_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/projects/{}/attachments", project_id)))
        .json(&json!({ "fileUrl": "https://files.example/site-plan.pdf" }))
        .send()
        .await
        .unwrap();
    assert_eq!(remove_resp.status(), 200);
    let remove_body: Value = remove_resp.json().await.unwrap();
    assert!(remove_body["data"]["attachments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_task_crud_and_status() {
    let fixture = TestFixture::new().await;
    let project_id = fixture.create_project("Office Fit-out").await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/tasks"))
        .json(&json!({
            "title": "Install drywall",
            "description": "Level 2, east wing",
            "projectId": project_id,
            "authorId": "user-1",
            "priority": "HIGH",
            "tags": ["interior"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 201);
    let create_body: Value = create_resp.json().await.unwrap();
    let task_id = create_body["data"]["id"].as_str().unwrap();
    assert_eq!(create_body["data"]["status"], "TODO");
    assert_eq!(create_body["data"]["priority"], "HIGH");

    // Status move
    let status_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/tasks/{}/status", task_id)))
        .json(&json!({ "status": "IN_PROGRESS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(status_resp.status(), 200);
    let status_body: Value = status_resp.json().await.unwrap();
    assert_eq!(status_body["data"]["status"], "IN_PROGRESS");

    // Filtered list
    let list_resp = fixture
        .client
        .get(fixture.url(&format!("/api/tasks?projectId={}", project_id)))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    let other_list: Value = fixture
        .client
        .get(fixture.url("/api/tasks?projectId=other"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(other_list["data"].as_array().unwrap().is_empty());

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/tasks/{}", task_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);
}

#[tokio::test]
async fn test_task_comments() {
    let fixture = TestFixture::new().await;
    let project_id = fixture.create_project("Comment Host").await;

    let task_resp: Value = fixture
        .client
        .post(fixture.url("/api/tasks"))
        .json(&json!({
            "title": "Pour slab",
            "projectId": project_id,
            "authorId": "user-1"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let task_id = task_resp["data"]["id"].as_str().unwrap();

    // Comment on a missing task is a 404
    let missing_resp = fixture
        .client
        .post(fixture.url("/api/tasks/no-such-task/comments"))
        .json(&json!({ "authorId": "user-1", "text": "hello?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_resp.status(), 404);

    let create_resp = fixture
        .client
        .post(fixture.url(&format!("/api/tasks/{}/comments", task_id)))
        .json(&json!({ "authorId": "user-1", "text": "Rebar inspected, good to pour" }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 201);
    let comment_body: Value = create_resp.json().await.unwrap();
    let comment_id = comment_body["data"]["id"].as_str().unwrap();

    let list_body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/tasks/{}/comments", task_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/comments/{}", comment_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);
}

#[tokio::test]
async fn test_bid_visibility_filter() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_admin", "Site Admin", &["admin"]).await;
    fixture.seed_user("clerk_c1", "Contractor One", &[]).await;
    fixture.seed_user("clerk_c2", "Contractor Two", &[]).await;

    let project_id = fixture.create_project("Bid Target").await;

    for contractor in ["clerk_c1", "clerk_c2"] {
        let resp = fixture
            .client
            .post(fixture.url("/api/bids"))
            .json(&json!({
                "projectId": project_id,
                "contractorId": contractor,
                "price": 50000.0
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    // Admin sees both bids, enriched with contractor names
    let admin_body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/bids?projectId={}", project_id)))
        .header("x-caller-id", "clerk_admin")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_bids = admin_body["data"].as_array().unwrap();
    assert_eq!(admin_bids.len(), 2);
    assert!(admin_bids
        .iter()
        .any(|b| b["contractorName"] == "Contractor One"));

    // A contractor only sees their own
    let c1_body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/bids?projectId={}", project_id)))
        .header("x-caller-id", "clerk_c1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let c1_bids = c1_body["data"].as_array().unwrap();
    assert_eq!(c1_bids.len(), 1);
    assert_eq!(c1_bids[0]["contractorId"], "clerk_c1");

    // No caller header at all is a 401
    let anon_resp = fixture
        .client
        .get(fixture.url(&format!("/api/bids?projectId={}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(anon_resp.status(), 401);
}

#[tokio::test]
async fn test_bid_approval_cascade() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_pm", "Project Manager", &["project_manager"]).await;
    fixture.seed_user("clerk_c1", "Contractor One", &[]).await;

    let project_id = fixture.create_project("Cascade Project").await;

    let opp_resp: Value = fixture
        .client
        .post(fixture.url("/api/opportunities"))
        .json(&json!({
            "title": "Roofing package",
            "content": "<p>Full roof replacement</p>",
            "projectId": project_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let opp_id = opp_resp["data"]["id"].as_str().unwrap();
    assert_eq!(opp_resp["data"]["status"], "OPEN");

    let bid_resp: Value = fixture
        .client
        .post(fixture.url("/api/bids"))
        .json(&json!({
            "projectId": project_id,
            "contractorId": "clerk_c1",
            "price": 82000.0,
            "opportunityId": opp_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bid_id = bid_resp["data"]["id"].as_str().unwrap();

    // Approve: bid APPROVED, opportunity CLOSED with contractor assigned
    let approve_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_id)))
        .header("x-caller-id", "clerk_pm")
        .json(&json!({ "status": "APPROVED", "opportunityId": opp_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(approve_resp.status(), 200);
    let approve_body: Value = approve_resp.json().await.unwrap();
    assert_eq!(approve_body["data"]["status"], "APPROVED");

    let opp_after: Value = fixture
        .client
        .get(fixture.url(&format!("/api/opportunities/{}", opp_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(opp_after["data"]["status"], "CLOSED");
    assert_eq!(opp_after["data"]["contractorId"], "clerk_c1");

    // Revert to pending: opportunity reopens, contractor cleared
    let revert_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_id)))
        .header("x-caller-id", "clerk_pm")
        .json(&json!({ "status": "PENDING", "opportunityId": opp_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(revert_resp.status(), 200);

    let opp_reverted: Value = fixture
        .client
        .get(fixture.url(&format!("/api/opportunities/{}", opp_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(opp_reverted["data"]["status"], "OPEN");
    assert!(opp_reverted["data"]["contractorId"].is_null());
}

#[tokio::test]
async fn test_bid_cascade_atomicity() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_pm", "Project Manager", &["project_manager"]).await;

    let project_id = fixture.create_project("Atomic Project").await;

    let bid_resp: Value = fixture
        .client
        .post(fixture.url("/api/bids"))
        .json(&json!({
            "projectId": project_id,
            "contractorId": "clerk_c1",
            "price": 1000.0
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bid_id = bid_resp["data"]["id"].as_str().unwrap();

    // Approving against a missing opportunity rolls back the bid write too
    let resp = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_id)))
        .header("x-caller-id", "clerk_pm")
        .json(&json!({ "status": "APPROVED", "opportunityId": "no-such-opp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let bid_after: Value = fixture
        .client
        .get(fixture.url(&format!("/api/bids/{}", bid_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bid_after["data"]["status"], "PENDING");
}

#[tokio::test]
async fn test_bid_review_requires_permission() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_c1", "Contractor One", &[]).await;

    let project_id = fixture.create_project("Gated Project").await;

    let bid_resp: Value = fixture
        .client
        .post(fixture.url("/api/bids"))
        .json(&json!({
            "projectId": project_id,
            "contractorId": "clerk_c1",
            "price": 500.0
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bid_id = bid_resp["data"]["id"].as_str().unwrap();

    // A contractor cannot approve their own bid
    let resp = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_id)))
        .header("x-caller-id", "clerk_c1")
        .json(&json!({ "status": "APPROVED" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_approved_opportunity_conflicts_with_second_bid() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_pm", "Project Manager", &["project_manager"]).await;

    let project_id = fixture.create_project("Contested Project").await;

    let opp_resp: Value = fixture
        .client
        .post(fixture.url("/api/opportunities"))
        .json(&json!({
            "title": "Concrete package",
            "projectId": project_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let opp_id = opp_resp["data"]["id"].as_str().unwrap();

    let mut bid_ids = Vec::new();
    for contractor in ["clerk_c1", "clerk_c2"] {
        let bid_resp: Value = fixture
            .client
            .post(fixture.url("/api/bids"))
            .json(&json!({
                "projectId": project_id,
                "contractorId": contractor,
                "price": 9000.0,
                "opportunityId": opp_id
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bid_ids.push(bid_resp["data"]["id"].as_str().unwrap().to_string());
    }

    let first = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_ids[0])))
        .header("x-caller-id", "clerk_pm")
        .json(&json!({ "status": "APPROVED", "opportunityId": opp_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = fixture
        .client
        .patch(fixture.url(&format!("/api/bids/{}/status", bid_ids[1])))
        .header("x-caller-id", "clerk_pm")
        .json(&json!({ "status": "APPROVED", "opportunityId": opp_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_leave_workflow() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_hr", "HR Lead", &["hr_team"]).await;
    fixture.seed_user("clerk_worker", "Site Worker", &[]).await;

    let employee_resp: Value = fixture
        .client
        .post(fixture.url("/api/employees"))
        .json(&json!({ "name": "Dana Reyes", "role": "foreman" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let employee_id = employee_resp["data"]["id"].as_str().unwrap();

    // Leave for a missing employee is rejected
    let missing_resp = fixture
        .client
        .post(fixture.url("/api/leaves"))
        .json(&json!({
            "employeeId": "no-such-employee",
            "leaveType": "vacation",
            "startDate": "2025-07-01",
            "endDate": "2025-07-05"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_resp.status(), 404);

    let create_resp = fixture
        .client
        .post(fixture.url("/api/leaves"))
        .json(&json!({
            "employeeId": employee_id,
            "leaveType": "vacation",
            "startDate": "2025-07-01",
            "endDate": "2025-07-05",
            "reason": "Family trip"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 201);
    let leave_body: Value = create_resp.json().await.unwrap();
    let leave_id = leave_body["data"]["id"].as_str().unwrap();
    assert_eq!(leave_body["data"]["status"], "PENDING");

    // Non-HR caller cannot review
    let forbidden = fixture
        .client
        .patch(fixture.url(&format!("/api/leaves/{}/status", leave_id)))
        .header("x-caller-id", "clerk_worker")
        .json(&json!({ "status": "APPROVED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);

    let approved = fixture
        .client
        .patch(fixture.url(&format!("/api/leaves/{}/status", leave_id)))
        .header("x-caller-id", "clerk_hr")
        .json(&json!({ "status": "APPROVED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(approved.status(), 200);
    let approved_body: Value = approved.json().await.unwrap();
    assert_eq!(approved_body["data"]["status"], "APPROVED");

    // Scoped list
    let list_body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/leaves?employeeId={}", employee_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_contractor_compliance_documents() {
    let fixture = TestFixture::new().await;

    let create_resp: Value = fixture
        .client
        .post(fixture.url("/api/contractors"))
        .json(&json!({
            "name": "Granite State Concrete",
            "specialties": ["concrete", "foundations"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let contractor_id = create_resp["data"]["id"].as_str().unwrap();

    let add_resp = fixture
        .client
        .post(fixture.url(&format!(
            "/api/contractors/{}/compliance-documents",
            contractor_id
        )))
        .json(&json!({
            "name": "Liability insurance",
            "fileUrl": "https://files.example/insurance.pdf"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(add_resp.status(), 200);
    let add_body: Value = add_resp.json().await.unwrap();
    assert_eq!(
        add_body["data"]["complianceDocuments"][0]["name"],
        "Liability insurance"
    );

    let remove_resp = fixture
        .client
        .delete(fixture.url(&format!(
            "/api/contractors/{}/compliance-documents",
            contractor_id
        )))
        .json(&json!({ "fileUrl": "https://files.example/insurance.pdf" }))
        .send()
        .await
        .unwrap();
    assert_eq!(remove_resp.status(), 200);
    let remove_body: Value = remove_resp.json().await.unwrap();
    assert!(remove_body["data"]["complianceDocuments"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_search_endpoint() {
    let fixture = TestFixture::new().await;
    let project_id = fixture.create_project("Harborview Medical Annex").await;

    fixture
        .client
        .post(fixture.url("/api/tasks"))
        .json(&json!({
            "title": "Harborview steel delivery",
            "projectId": project_id,
            "authorId": "user-1"
        }))
        .send()
        .await
        .unwrap();

    // Wait for search index to update
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/search?q=harborview"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(!body["data"]["tasks"].as_array().unwrap().is_empty());
    assert!(!body["data"]["projects"].as_array().unwrap().is_empty());
    assert!(body["data"]["users"].as_array().unwrap().is_empty());

    // Short queries are rejected at the boundary
    let short_resp = fixture
        .client
        .get(fixture.url("/api/search?q=ha"))
        .send()
        .await
        .unwrap();
    assert_eq!(short_resp.status(), 400);
    let short_body: Value = short_resp.json().await.unwrap();
    assert_eq!(short_body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_webhook_invalid_signature() {
    let fixture = TestFixture::new().await;

    let body = json!({
        "type": "user.created",
        "data": { "id": "clerk_evil", "first_name": "Mallory" }
    })
    .to_string();

    let resp = fixture
        .client
        .post(fixture.url("/api/webhooks/auth"))
        .header("webhook-id", "msg_1")
        .header("webhook-timestamp", "1700000000")
        .header("webhook-signature", "v1,bm90LWEtcmVhbC1zaWduYXR1cmU=")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);

    // No user row was created
    let users: Value = fixture
        .client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(users["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_user_created() {
    let fixture = TestFixture::new().await;

    let body = json!({
        "type": "user.created",
        "data": { "id": "clerk_new", "first_name": "Sam", "last_name": "Ortiz" }
    })
    .to_string();
    let signature = webhook_signature("msg_2", "1700000001", &body);

    let resp = fixture
        .client
        .post(fixture.url("/api/webhooks/auth"))
        .header("webhook-id", "msg_2")
        .header("webhook-timestamp", "1700000001")
        .header("webhook-signature", format!("v1,{}", signature))
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let user_resp = fixture
        .client
        .get(fixture.url("/api/users/clerk/clerk_new"))
        .send()
        .await
        .unwrap();
    assert_eq!(user_resp.status(), 200);
    let user_body: Value = user_resp.json().await.unwrap();
    assert_eq!(user_body["data"]["displayName"], "Sam Ortiz");

    // Redelivery of the same event conflicts on clerk_id
    let redelivery = fixture
        .client
        .post(fixture.url("/api/webhooks/auth"))
        .header("webhook-id", "msg_2")
        .header("webhook-timestamp", "1700000001")
        .header("webhook-signature", format!("v1,{}", signature))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(redelivery.status(), 409);
}

#[tokio::test]
async fn test_webhook_ignores_other_events() {
    let fixture = TestFixture::new().await;

    let body = json!({ "type": "session.created", "data": {} }).to_string();
    let signature = webhook_signature("msg_3", "1700000002", &body);

    let resp = fixture
        .client
        .post(fixture.url("/api/webhooks/auth"))
        .header("webhook-id", "msg_3")
        .header("webhook-timestamp", "1700000002")
        .header("webhook-signature", format!("v1,{}", signature))
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let resp_body: Value = resp.json().await.unwrap();
    assert_eq!(resp_body["data"]["ignored"], "session.created");
}

#[tokio::test]
async fn test_team_and_user_endpoints() {
    let fixture = TestFixture::new().await;
    fixture.seed_user("clerk_u1", "Jordan Lee", &[]).await;

    let team_resp = fixture
        .client
        .post(fixture.url("/api/teams"))
        .json(&json!({ "name": "Structures" }))
        .send()
        .await
        .unwrap();
    assert_eq!(team_resp.status(), 201);
    let team_body: Value = team_resp.json().await.unwrap();
    let team_id = team_body["data"]["id"].as_str().unwrap();

    // Attach the user to the team
    let users: Value = fixture
        .client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = users["data"][0]["id"].as_str().unwrap();

    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/users/{}", user_id)))
        .json(&json!({ "teamId": team_id, "permissions": ["project_manager"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["teamId"], team_id);
    assert_eq!(update_body["data"]["permissions"], json!(["project_manager"]));
}
