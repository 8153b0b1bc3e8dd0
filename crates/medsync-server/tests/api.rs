//! End-to-end tests of the REST API over an in-memory database.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use medsync_bridge::{BridgeController, DynBridgeController};
use medsync_protocol::ServerMessage;
use medsync_serial::{MockSerialOpener, SerialOpener};
use medsync_server::{AppState, routes, seed};
use medsync_storage::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

async fn test_state() -> (AppState, Arc<DynBridgeController>) {
    let db = Arc::new(Database::in_memory().await.unwrap());
    seed::ensure_default_users(&db, SECRET).await.unwrap();

    let (opener, _handle) = MockSerialOpener::new(Vec::new());
    let bridge = BridgeController::new(&db, Box::new(opener) as Box<dyn SerialOpener>);

    (AppState::new(db, Arc::clone(&bridge), SECRET), bridge)
}

async fn app() -> (Router, Arc<DynBridgeController>) {
    let (state, bridge) = test_state().await;
    (routes::router(state), bridge)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_requires_no_auth() {
    let (app, _bridge) = app().await;
    let (status, body) = send(&app, get("/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["serialConnected"], false);
    assert_eq!(body["websocketClients"], 0);

    // Also served unprefixed for load balancer probes
    let (status, _) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let (app, _bridge) = app().await;
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@medsync.local", "password": "admin123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _bridge) = app().await;
    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@medsync.local", "password": "nope" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let (app, _bridge) = app().await;

    let (status, _) = send(&app, get("/api/patients", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/patients", Some("bogus"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_role_and_duplicates() {
    let (app, _bridge) = app().await;

    let (status, body) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": "nurse@medsync.local",
                "password": "pw123456",
                "name": "Nurse Joy",
                "role": "pharmacy"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "pharmacy");
    // Registration logs the new account straight in
    assert!(!body["token"].as_str().unwrap().is_empty());

    // Same email twice
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": "nurse@medsync.local",
                "password": "pw123456",
                "name": "Nurse Joy",
                "role": "pharmacy"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Admin cannot be self-registered
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": "evil@medsync.local",
                "password": "pw123456",
                "name": "Evil",
                "role": "admin"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_and_logout_lifecycle() {
    let (app, _bridge) = app().await;
    let token = login(&app, "doctor@medsync.local", "doctor123").await;

    let (status, body) = send(&app, get("/api/auth/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "doctor@medsync.local");

    let (status, _) = send(
        &app,
        send_json("POST", "/api/auth/logout", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/auth/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patient_crud_roundtrip() {
    let (app, _bridge) = app().await;
    let token = login(&app, "admin@medsync.local", "admin123").await;

    let (status, created) = send(
        &app,
        send_json(
            "POST",
            "/api/patients",
            Some(&token),
            json!({
                "name": "Ana Souza",
                "dateOfBirth": "1984-02-11",
                "rfidUid": "04AB11"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    // Lookup by id and by rfid uid resolve the same record
    let (status, by_id) = send(&app, get(&format!("/api/patients/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, by_uid) = send(&app, get("/api/patients/04AB11", Some(&token))).await;
    assert_eq!(by_id["id"], by_uid["id"]);

    // Detail view embeds the patient's prescriptions
    assert_eq!(by_id["prescriptions"], json!([]));

    // Partial update keeps unspecified fields
    let (status, updated) = send(
        &app,
        send_json(
            "PUT",
            &format!("/api/patients/{id}"),
            Some(&token),
            json!({ "contact": "+55 11 99999-0000" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ana Souza");
    assert_eq!(updated["contact"], "+55 11 99999-0000");

    let (status, _) = send(&app, get("/api/patients/missing", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing wraps the rows in a `patients` envelope
    let (status, list) = send(&app, get("/api/patients", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["patients"].as_array().unwrap().len(), 1);
    assert_eq!(list["patients"][0]["name"], "Ana Souza");
}

#[tokio::test]
async fn card_registration_broadcasts_to_clients() {
    let (app, bridge) = app().await;
    let token = login(&app, "admin@medsync.local", "admin123").await;

    let mut sub = bridge.register_client().await;
    assert!(matches!(
        sub.rx.recv().await,
        Some(ServerMessage::Connection { .. })
    ));

    let (status, card) = send(
        &app,
        send_json(
            "POST",
            "/api/rfid/cards",
            Some(&token),
            json!({ "uid": "04AB11", "label": "Bed 12" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["uid"], "04AB11");

    match sub.rx.recv().await {
        Some(ServerMessage::CardRegistered { uid, label, .. }) => {
            assert_eq!(uid, "04AB11");
            assert_eq!(label, "Bed 12");
        }
        other => panic!("expected card_registered, got {other:?}"),
    }

    // Duplicate uid conflicts
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/api/rfid/cards",
            Some(&token),
            json!({ "uid": "04AB11", "label": "Bed 13" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn card_deactivation_is_soft() {
    let (app, _bridge) = app().await;
    let token = login(&app, "admin@medsync.local", "admin123").await;

    send(
        &app,
        send_json(
            "POST",
            "/api/rfid/cards",
            Some(&token),
            json!({ "uid": "FEED42", "label": "Spare" }),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/rfid/cards/FEED42")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/rfid/cards", Some(&token))).await;
    let card = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["uid"] == "FEED42")
        .unwrap();
    assert_eq!(card["is_active"], false);
}

#[tokio::test]
async fn prescription_issue_and_verify_flow() {
    let (app, _bridge) = app().await;
    let doctor = login(&app, "doctor@medsync.local", "doctor123").await;
    let admin = login(&app, "admin@medsync.local", "admin123").await;

    let (status, patient) = send(
        &app,
        send_json(
            "POST",
            "/api/patients",
            Some(&admin),
            json!({ "name": "Ana Souza" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let patient_id = patient["id"].as_str().unwrap().to_string();

    // A patient-role account cannot prescribe
    send(
        &app,
        send_json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": "pat@medsync.local",
                "password": "pw123456",
                "name": "Pat",
                "role": "patient"
            }),
        ),
    )
    .await;
    let patient_token = login(&app, "pat@medsync.local", "pw123456").await;
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            "/api/prescriptions",
            Some(&patient_token),
            json!({
                "patientId": &patient_id,
                "medication": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "8h"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Doctor issues; barcode is generated
    let (status, rx) = send(
        &app,
        send_json(
            "POST",
            "/api/prescriptions",
            Some(&doctor),
            json!({
                "patientId": &patient_id,
                "medication": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "8h",
                "notes": "after meals"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let barcode = rx["barcode"].as_str().unwrap().to_string();
    assert!(barcode.starts_with("RX-"));
    assert_eq!(rx["status"], "active");

    // Doctor cannot verify, admin can, by barcode
    let (status, _) = send(
        &app,
        send_json(
            "POST",
            &format!("/api/prescriptions/{barcode}/verify"),
            Some(&doctor),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, verified) = send(
        &app,
        send_json(
            "POST",
            &format!("/api/prescriptions/{barcode}/verify"),
            Some(&admin),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(verified["verified_at"].is_string());

    // Filterable listing, wrapped in a `prescriptions` envelope
    let (status, list) = send(&app, get("/api/prescriptions?status=active", Some(&doctor))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["prescriptions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn scan_logs_start_empty() {
    let (app, _bridge) = app().await;
    let token = login(&app, "admin@medsync.local", "admin123").await;

    let (status, body) = send(&app, get("/api/scan-logs?limit=10", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "logs": [] }));

    // Default limit applies when the query is absent
    let (status, body) = send(&app, get("/api/scan-logs", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], json!([]));
}
