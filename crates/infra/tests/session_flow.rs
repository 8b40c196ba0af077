//! End-to-end session flows against a mock backend: login, list fetching
//! through the controller stack, expiry refresh, and the single-flight
//! guarantee under concurrent expiry.

use std::sync::Arc;
use std::time::Duration;

use civiclink_core::assignment::{AssignmentTracker, MutationPhase};
use civiclink_core::complaints::ComplaintListController;
use civiclink_domain::{ApiError, AssignComplaintRequest, LoginRequest};
use civiclink_infra::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use civiclink_infra::{
    ApiConfig, ComplaintsApi, MemoryStore, RequestBody, SecureStore, SessionClient,
};
use reqwest::Method;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn complaint_json(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "complaint_number": format!("CMP-{id:04}"),
        "complainant_name": "A. Resident",
        "description": "water logging near the market",
        "location_address": "Sector 9",
        "status": "submitted",
        "priority": 2,
        "created_at": "2026-07-14T09:00:00Z"
    })
}

fn list_body(ids: &[i64], has_next: bool) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": {
            "complaints": ids.iter().map(|id| complaint_json(*id)).collect::<Vec<_>>(),
            "pagination": {
                "page": 1,
                "limit": ids.len(),
                "total": 40,
                "pages": 4,
                "has_next": has_next,
                "has_prev": false
            }
        }
    })
}

fn expired_body() -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": { "code": "TOKEN_EXPIRED", "message": "access token expired" }
    })
}

async fn seeded_session(server: &MockServer) -> (Arc<SessionClient>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_TOKEN_KEY, "old-token").await.unwrap();
    store.set(REFRESH_TOKEN_KEY, "refresh-1").await.unwrap();

    let client = Arc::new(
        SessionClient::new(ApiConfig::new(server.uri()), store.clone()).expect("session client"),
    );
    assert!(client.initialize().await.unwrap());
    (client, store)
}

#[tokio::test]
async fn login_then_list_through_the_controller_stack() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "token": "access-1",
                "refreshToken": "refresh-1",
                "expiresIn": 3600,
                "user": {
                    "id": 7,
                    "username": "je.sharma",
                    "email": "je.sharma@example.org",
                    "firstName": "Jai",
                    "lastName": "Sharma"
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/complaints"))
        .and(query_param("page", "1"))
        .and(query_param("search", "market"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[1, 2], true)))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session =
        Arc::new(SessionClient::new(ApiConfig::new(server.uri()), store).expect("session client"));
    session
        .login(&LoginRequest { username: "je.sharma".into(), password: "hunter2".into() })
        .await
        .unwrap();

    let api = Arc::new(ComplaintsApi::new(session));
    let controller = ComplaintListController::new(api, 10);

    controller.set_search_text("market").await.unwrap();

    let state = controller.snapshot();
    assert_eq!(state.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(state.has_more);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn expiry_mid_session_refreshes_transparently_for_the_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/complaints"))
        .and(header("Authorization", "Bearer old-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(expired_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "token": "new-token", "refreshToken": "refresh-2", "expiresIn": 3600 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/complaints"))
        .and(header("Authorization", "Bearer new-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[5], false)))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = seeded_session(&server).await;
    let api = Arc::new(ComplaintsApi::new(session));
    let controller = ComplaintListController::new(api, 10);

    controller.refresh().await.unwrap();

    // The caller never saw the expiry: one refresh happened underneath.
    let state = controller.snapshot();
    assert_eq!(state.items.len(), 1);
    assert!(state.error.is_none());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), Some("new-token".to_string()));
}

#[tokio::test]
async fn concurrent_expiry_shares_a_single_refresh() {
    let server = MockServer::start().await;

    // Both requests go out with the stale token and both hit expiry. The
    // response delay keeps them overlapped.
    for id in [1, 2] {
        Mock::given(method("GET"))
            .and(path(format!("/complaints/{id}")))
            .and(header("Authorization", "Bearer old-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(expired_body())
                    .set_delay(Duration::from_millis(25)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/complaints/{id}")))
            .and(header("Authorization", "Bearer new-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": complaint_json(id)
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    // Exactly one refresh reaches the transport; the second waiter joins the
    // in-flight one. The delay widens the window in which the gate is held.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "success": true,
                    "data": { "token": "new-token", "refreshToken": "refresh-2", "expiresIn": 3600 }
                }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (session, _store) = seeded_session(&server).await;

    let (first, second) = tokio::join!(
        session.authorized_request(Method::GET, "/complaints/1", RequestBody::Empty),
        session.authorized_request(Method::GET, "/complaints/2", RequestBody::Empty),
    );

    // Both original requests were retried with the single refreshed token.
    assert_eq!(first.unwrap()["id"], 1);
    assert_eq!(second.unwrap()["id"], 2);
}

#[tokio::test]
async fn assignment_commits_through_the_tracker_stack() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/complaints/assign"))
        .and(header("Authorization", "Bearer old-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "message": "Assigned", "assigned_to_user_id": 31 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _store) = seeded_session(&server).await;
    let api = Arc::new(ComplaintsApi::new(session));
    let tracker = AssignmentTracker::new(api);

    let receipt = tracker.submit(AssignComplaintRequest::to_user(9, 31)).await.unwrap();

    assert_eq!(receipt.message, "Assigned");
    assert_eq!(tracker.phase(9), Some(MutationPhase::Committed));
    assert_eq!(tracker.assignee(9), Some(31));
}

#[tokio::test]
async fn rejected_assignment_rolls_back_through_the_tracker_stack() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/complaints/assign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": { "code": "INVALID_ASSIGNEE", "message": "officer not in department" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _store) = seeded_session(&server).await;
    let api = Arc::new(ComplaintsApi::new(session));
    let tracker = AssignmentTracker::new(api);

    let result = tracker.submit(AssignComplaintRequest::to_user(9, 31)).await;

    assert!(matches!(result, Err(ApiError::Server(_))));
    assert_eq!(tracker.assignee(9), None);
    assert!(matches!(tracker.phase(9), Some(MutationPhase::Failed(_))));
}
