//! HTTP adapter driven in-process with `tower::ServiceExt::oneshot`

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use civic_server::core::{StorageBackend, build_router};
use civic_server::issues::{IssueService, MemoryIssueRepository};
use civic_server::{Config, ServerState};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::Principal;
use tower::ServiceExt;

struct TestApp {
    state: ServerState,
}

impl TestApp {
    fn new() -> Self {
        let config = Config::with_overrides("/tmp/civic-http-test", 0, StorageBackend::Memory);
        let service = Arc::new(IssueService::new(
            Arc::new(MemoryIssueRepository::new()),
            config.event_channel_capacity.max(1),
        ));
        Self {
            state: ServerState::with_service(config, service),
        }
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    fn token(&self, principal: &Principal) -> String {
        self.state.jwt_service.generate_token(principal).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        as_user: Option<&Principal>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = as_user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_issue(&self, author: &Principal, city: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/issues",
                Some(author),
                Some(json!({
                    "title": "Streetlight out",
                    "description": "Whole lane is dark",
                    "category": "",
                    "address": "4th Cross Street",
                    "cityDistrict": city,
                    "coordinates": { "lat": 13.04, "lng": 80.23 },
                    "evidenceImages": ["light.jpg"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send("GET", "/health/detailed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/issues", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/issues")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_fetch() {
    let app = TestApp::new();
    let author = Principal::citizen("u-1", "Meena");
    let id = app.create_issue(&author, "Chennai").await;

    let (status, body) = app
        .send("GET", &format!("/api/issues/{id}"), Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["category"], "Other");
    assert_eq!(body["data"]["authorName"], "Meena");
    assert_eq!(body["data"]["votes"]["upCount"], 0);
}

#[tokio::test]
async fn test_create_validation_error() {
    let app = TestApp::new();
    let author = Principal::citizen("u-1", "Meena");
    let (status, body) = app
        .send(
            "POST",
            "/api/issues",
            Some(&author),
            Some(json!({
                "title": "",
                "description": "x",
                "address": "y",
                "cityDistrict": "Chennai"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_unknown_issue_is_404() {
    let app = TestApp::new();
    let user = Principal::citizen("u-1", "Meena");
    let (status, body) = app
        .send("GET", "/api/issues/nope", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
    assert_eq!(body["details"]["issueId"], "nope");
}

#[tokio::test]
async fn test_vote_flow_over_http() {
    let app = TestApp::new();
    let author = Principal::citizen("u-1", "Meena");
    let voter = Principal::citizen("u-2", "Ravi");
    let id = app.create_issue(&author, "Chennai").await;
    let uri = format!("/api/issues/{id}/vote");

    let (status, body) = app
        .send("POST", &uri, Some(&voter), Some(json!({ "direction": "up" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["votes"]["upCount"], 1);
    assert_eq!(body["data"]["votes"]["userVotes"]["u-2"], "up");

    let (status, body) = app
        .send("POST", &uri, Some(&author), Some(json!({ "direction": "up" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 5001);
    assert_eq!(body["message"], "You cannot confirm your own report");

    let (status, body) = app
        .send("POST", &uri, Some(&voter), Some(json!({ "direction": "sideways" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5003);
}

#[tokio::test]
async fn test_admin_transitions_over_http() {
    let app = TestApp::new();
    let author = Principal::citizen("u-1", "Meena");
    let admin = Principal::city_admin("adm-1", "Kavya", "Chennai");
    let id = app.create_issue(&author, "Chennai").await;

    // Citizens cannot change status
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/status"),
            Some(&author),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/status"),
            Some(&admin),
            Some(json!({ "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "IN_PROGRESS");

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/resolve"),
            Some(&admin),
            Some(json!({ "evidence": " " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 4003);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/resolve"),
            Some(&admin),
            Some(json!({ "evidence": "fixed.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "RESOLVED");
    assert_eq!(body["data"]["resolutionEvidence"], "fixed.jpg");

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/reject"),
            Some(&admin),
            Some(json!({ "reason": "SPAM" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4002);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/issues/{id}/rating"),
            Some(&author),
            Some(json!({ "stars": 5, "comment": "Great" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 5);
}

#[tokio::test]
async fn test_reject_reason_parsing() {
    let app = TestApp::new();
    let author = Principal::citizen("u-1", "Meena");
    let admin = Principal::super_admin("root", "Root");
    let id = app.create_issue(&author, "Madurai").await;
    let uri = format!("/api/issues/{id}/reject");

    let (status, body) = app
        .send("POST", &uri, Some(&admin), Some(json!({ "reason": "boring" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);

    let (status, body) = app
        .send(
            "POST",
            &uri,
            Some(&admin),
            Some(json!({ "reason": "Not a Civic Issue" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rejectionReason"], "NOT_CIVIC");
}

#[tokio::test]
async fn test_list_filters_and_stats() {
    let app = TestApp::new();
    let a = Principal::citizen("u-a", "A");
    let b = Principal::citizen("u-b", "B");
    let root = Principal::super_admin("root", "Root");
    let admin = Principal::city_admin("adm", "Adm", "Chennai");

    app.create_issue(&a, "Chennai").await;
    app.create_issue(&b, "chennai").await;
    app.create_issue(&a, "Pune").await;

    let (status, body) = app
        .send("GET", "/api/issues?city=CHENNAI", Some(&a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send("GET", "/api/issues?authorId=u-a", Some(&a), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send("GET", "/api/stats/cities/Chennai", Some(&admin), None)
        .await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["pending"], 2);

    let (status, body) = app
        .send("GET", "/api/stats/districts", Some(&root), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["issues"], 2);

    let (status, _) = app
        .send("GET", "/api/stats/districts", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
