//! End-to-end tests of the JSON API over a real socket.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tenant_comms_governor::http::{self, AppState};

use super::test_helpers::{test_env, TestEnv};

struct Server {
    base: String,
    client: reqwest::Client,
    ct: CancellationToken,
    handle: JoinHandle<()>,
    _env: TestEnv,
}

impl Server {
    async fn start() -> Self {
        let env = test_env().await;
        let state = Arc::new(AppState {
            config: Arc::clone(&env.config),
            service: Arc::clone(&env.service),
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let ct = CancellationToken::new();
        let server_ct = ct.clone();
        let handle = tokio::spawn(async move {
            http::serve_on(listener, state, server_ct).await.expect("serve");
        });
        Self {
            base,
            client: reqwest::Client::new(),
            ct,
            handle,
            _env: env,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post(&self, path: &str, role: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(role) = role {
            req = req
                .header("x-actor-id", format!("u-{role}"))
                .header("x-actor-role", role);
        }
        let resp = req.send().await.expect("send");
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str, role: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(role) = role {
            req = req
                .header("x-actor-id", format!("u-{role}"))
                .header("x-actor-role", role);
        }
        let resp = req.send().await.expect("send");
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, role: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut req = self.client.put(self.url(path)).json(body);
        if let Some(role) = role {
            req = req
                .header("x-actor-id", format!("u-{role}"))
                .header("x-actor-role", role);
        }
        let resp = req.send().await.expect("send");
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn shutdown(self) {
        self.ct.cancel();
        self.handle.await.expect("server join");
    }
}

fn template_body(trigger: &str) -> Value {
    json!({
        "title": "After hours",
        "content": "Our office is closed; we will reply in the morning.",
        "category": "general",
        "trigger": trigger,
        "confidence": 0.88
    })
}

#[tokio::test]
async fn health_check() {
    let server = Server::start().await;
    let body = reqwest::get(server.url("/health"))
        .await
        .expect("send")
        .text()
        .await
        .expect("text");
    assert_eq!(body, "ok");
    server.shutdown().await;
}

#[tokio::test]
async fn settings_round_trip() {
    let server = Server::start().await;

    let (status, settings) = server.get("/ai/communication/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["delayMinutes"], 15);
    assert_eq!(settings["maxAttempts"], 3);

    let (status, body) = server
        .put("/ai/communication/settings", None, &json!({ "delayMinutes": 20 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = server
        .put("/ai/communication/settings", Some("manager"), &json!({ "delayMinutes": -1 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, updated) = server
        .put("/ai/communication/settings", Some("manager"), &json!({ "delayMinutes": 20 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["delayMinutes"], 20);

    let (_, settings) = server.get("/ai/communication/settings", None).await;
    assert_eq!(settings["delayMinutes"], 20);
    server.shutdown().await;
}

#[tokio::test]
async fn validate_endpoint_reports_invalid_settings() {
    let server = Server::start().await;
    let (status, body) = server
        .post(
            "/ai/communication/settings/validate",
            None,
            &json!({ "maxAttempts": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, body) = server
        .post(
            "/ai/communication/settings/validate",
            None,
            &json!({ "triggers": ["lease_questions"], "delayMinutes": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggers"], json!(["lease_questions"]));
    server.shutdown().await;
}

#[tokio::test]
async fn schedule_and_evaluate_endpoints() {
    let server = Server::start().await;

    let (status, decision) = server
        .post(
            "/ai/communication/schedule",
            None,
            &json!({
                "event": { "conversationId": "c-1", "trigger": "after_hours" },
                "state": { "attemptsSoFar": 0, "isBusinessHours": true }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision, json!({ "decision": "send_after", "delayMinutes": 15 }));

    let (_, decision) = server
        .post(
            "/ai/communication/schedule",
            None,
            &json!({ "event": { "conversationId": "c-1", "trigger": "lease_questions" } }),
        )
        .await;
    assert_eq!(decision, json!({ "decision": "skip" }));

    let (status, outcome) = server
        .post(
            "/ai/communication/evaluate",
            None,
            &json!({ "facts": { "elapsedMinutesSinceLastAgentReply": 31 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["escalation"]["ruleId"], "rule_default_no_response");
    assert_eq!(outcome["escalation"]["action"], "escalate_to_human");
    server.shutdown().await;
}

#[tokio::test]
async fn template_review_over_http() {
    let server = Server::start().await;

    let (status, _) = server
        .post("/ai/communication/templates", None, &template_body("after_hours"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = server
        .post("/ai/communication/templates", Some("system"), &template_body("after_hours"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["createdBy"], "AI System");
    let id = created["id"].as_str().expect("id").to_owned();

    let (status, _) = server
        .post(&format!("/ai/communication/templates/{id}/submit"), Some("system"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, pending) = server.get("/ai/communication/templates/pending", None).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    let (_, actions) = server
        .get(&format!("/ai/communication/templates/{id}/actions"), Some("manager"))
        .await;
    assert_eq!(actions, json!(["approved", "rejected"]));

    let (status, body) = server
        .post(
            &format!("/ai/communication/templates/{id}/reject"),
            Some("tenant"),
            &json!({ "reason": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = server
        .post(&format!("/ai/communication/templates/{id}/reject"), Some("manager"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_reason");

    let (status, approved) = server
        .post(
            &format!("/ai/communication/templates/{id}/approve"),
            Some("manager"),
            &json!({ "comments": "fine" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["reviewedBy"], "u-manager");

    let (status, body) = server
        .post(&format!("/ai/communication/templates/{id}/approve"), Some("manager"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    let (status, fetched) = server
        .get(&format!("/ai/communication/templates/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["reviewComments"], "fine");

    let (status, body) = server.get("/ai/communication/templates/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    server.shutdown().await;
}

#[tokio::test]
async fn resubmission_over_http() {
    let server = Server::start().await;
    let (_, created) = server
        .post("/ai/communication/templates", Some("system"), &template_body("common_questions"))
        .await;
    let id = created["id"].as_str().expect("id").to_owned();
    server
        .post(&format!("/ai/communication/templates/{id}/submit"), Some("system"), &json!({}))
        .await;
    server
        .post(
            &format!("/ai/communication/templates/{id}/reject"),
            Some("admin"),
            &json!({ "reason": "too long" }),
        )
        .await;

    let (status, corrected) = server
        .post(
            &format!("/ai/communication/templates/{id}/resubmit"),
            Some("system"),
            &json!({ "content": "Short and sweet." }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(corrected["status"], "draft");
    assert_ne!(corrected["id"], json!(id));
    server.shutdown().await;
}

#[tokio::test]
async fn conversation_endpoints() {
    let server = Server::start().await;

    let (status, outcome) = server
        .post(
            "/ai/communication/conversations/c-7/messages",
            None,
            &json!({ "trigger": "after_hours", "message": "Is the gym open?" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["decision"]["decision"], "send_after");
    assert_eq!(outcome["escalate"], false);

    let (status, outcome) = server
        .post(
            "/ai/communication/conversations/c-7/escalation-check",
            None,
            &json!({ "facts": { "elapsedMinutesSinceLastAgentReply": 45 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["escalation"]["priority"], "medium");

    let (status, resolved) = server
        .post("/ai/communication/conversations/c-7/resolve", None, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["cancelled"], Value::Null);
    server.shutdown().await;
}

#[tokio::test]
async fn tone_style_defaults_and_update() {
    let server = Server::start().await;

    let (status, current) = server.get("/ai/communication/tone-style", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["tone"], "friendly");
    assert_eq!(current["style"], "detailed");
    assert_eq!(current["examples"]["formal"]["concise"].as_str().map(str::is_empty), Some(false));

    let (status, updated) = server
        .put(
            "/ai/communication/tone-style",
            Some("manager"),
            &json!({ "tone": "formal", "customInstructions": "  Sign off as the front desk.  " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tone"], "formal");
    assert_eq!(updated["style"], "detailed");
    assert_eq!(updated["customInstructions"], "Sign off as the front desk.");
    assert_eq!(updated["example"], updated["examples"]["formal"]["detailed"]);

    let (_, reread) = server.get("/ai/communication/tone-style", None).await;
    assert_eq!(reread["tone"], "formal");
    server.shutdown().await;
}

#[tokio::test]
async fn tone_style_update_requires_actor() {
    let server = Server::start().await;
    let (status, body) = server
        .put("/ai/communication/tone-style", None, &json!({ "tone": "casual" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");
    server.shutdown().await;
}

#[tokio::test]
async fn catalog_lists_labels_and_descriptions() {
    let server = Server::start().await;
    let (status, catalog) = server.get("/ai/communication/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog["triggers"].as_array().map(Vec::len), Some(6));
    assert_eq!(catalog["triggers"][0]["value"], "after_hours");
    assert_eq!(catalog["triggers"][0]["label"], "After Hours");
    assert_eq!(catalog["conditions"].as_array().map(Vec::len), Some(5));
    assert_eq!(catalog["tones"][2]["value"], "casual");
    assert_eq!(catalog["styles"][2]["label"], "Empathetic");
    server.shutdown().await;
}
