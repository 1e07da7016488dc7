//! Service requests from intake to rating under `/api/v1/services`.

mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, TestApp};
use serde_json::{json, Value};

struct Fixture {
    customer: String,
    service_type: String,
    technician: String,
}

async fn fixture(app: &TestApp) -> Fixture {
    let customer = app
        .expect_data(
            Method::POST,
            "/api/v1/core/contacts",
            Some(json!({
                "first_name": "Hamid",
                "last_name": "Moradi",
                "email": "hamid@example.com"
            })),
            201,
        )
        .await;
    let service_type = app
        .expect_data(
            Method::POST,
            "/api/v1/services/types",
            Some(json!({ "name": "Maintenance", "base_price": "200" })),
            201,
        )
        .await;
    assert_eq!(service_type["estimated_duration_minutes"], 60);

    let technician = app
        .expect_data(
            Method::POST,
            "/api/v1/services/technicians",
            Some(json!({
                "user_id": app.admin.id,
                "employee_id": "T-100",
                "skill_level": "senior",
                "specializations": [id_of(&service_type)],
                "hourly_rate": "45"
            })),
            201,
        )
        .await;
    assert_eq!(technician["user_email"], "admin@farjad.test");

    Fixture {
        customer: id_of(&customer),
        service_type: id_of(&service_type),
        technician: id_of(&technician),
    }
}

async fn open_request(app: &TestApp, fixture: &Fixture, title: &str, priority: &str) -> Value {
    app.expect_data(
        Method::POST,
        "/api/v1/services/requests",
        Some(json!({
            "title": title,
            "customer_id": fixture.customer,
            "service_type_id": fixture.service_type,
            "priority": priority,
            "service_address": "5 Enghelab Sq",
            "service_city": "Tehran"
        })),
        201,
    )
    .await
}

#[tokio::test]
async fn request_lifecycle_stamps_each_stage() {
    let app = TestApp::new().await;
    let fixture = fixture(&app).await;

    let request = open_request(&app, &fixture, "Pump noise", "high").await;
    assert!(request["request_number"].as_str().unwrap_or_default().starts_with("SR-"));
    assert_eq!(request["status"], "pending");
    assert_eq!(request["customer_name"], "Hamid Moradi");
    assert_eq!(request["service_type_name"], "Maintenance");
    assert!(request["assigned_at"].is_null());
    let uri = format!("/api/v1/services/requests/{}", id_of(&request));

    let assigned = app
        .expect_data(
            Method::PATCH,
            &uri,
            Some(json!({ "assigned_technician_id": fixture.technician })),
            200,
        )
        .await;
    assert_eq!(assigned["status"], "assigned");
    assert!(assigned["assigned_at"].is_string());
    assert!(assigned["assigned_technician_name"].is_string());
    assert_eq!(assigned["assigned_by"], app.admin.id.to_string());

    let started = app
        .expect_data(Method::PATCH, &uri, Some(json!({ "status": "in_progress" })), 200)
        .await;
    assert!(started["started_at"].is_string());
    assert_eq!(started["assigned_at"], assigned["assigned_at"]);

    let completed = app
        .expect_data(
            Method::PATCH,
            &uri,
            Some(json!({ "status": "completed", "actual_cost": "240" })),
            200,
        )
        .await;
    assert!(completed["completed_at"].is_string());
}

#[tokio::test]
async fn notes_and_rating_belong_to_a_request() {
    let app = TestApp::new().await;
    let fixture = fixture(&app).await;
    let request = open_request(&app, &fixture, "Panel inspection", "low").await;
    let uri = format!("/api/v1/services/requests/{}", id_of(&request));

    app.expect_data(
        Method::POST,
        &format!("{uri}/notes"),
        Some(json!({ "note": "Customer reports intermittent fault", "is_internal": true })),
        201,
    )
    .await;
    let notes = app
        .expect_data(Method::GET, &format!("{uri}/notes"), None, 200)
        .await;
    assert_eq!(notes.as_array().map(Vec::len), Some(1));
    assert_eq!(notes[0]["is_internal"], true);

    let response = app
        .request_authenticated(Method::GET, &format!("{uri}/rating"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request_authenticated(Method::PUT, &format!("{uri}/rating"), Some(json!({ "rating": 6 })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let first = app
        .expect_data(
            Method::PUT,
            &format!("{uri}/rating"),
            Some(json!({ "rating": 3, "comment": "Late" })),
            200,
        )
        .await;
    let second = app
        .expect_data(
            Method::PUT,
            &format!("{uri}/rating"),
            Some(json!({ "rating": 5, "comment": "Fixed quickly" })),
            200,
        )
        .await;
    assert_eq!(first["id"], second["id"]);

    let rating = app
        .expect_data(Method::GET, &format!("{uri}/rating"), None, 200)
        .await;
    assert_eq!(rating["rating"], 5);
    assert_eq!(rating["comment"], "Fixed quickly");
}

#[tokio::test]
async fn requests_filter_by_status_and_priority() {
    let app = TestApp::new().await;
    let fixture = fixture(&app).await;
    open_request(&app, &fixture, "Urgent outage", "urgent").await;
    open_request(&app, &fixture, "Routine check", "low").await;

    let page = app
        .expect_data(Method::GET, "/api/v1/services/requests?priority=urgent", None, 200)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Urgent outage");

    let page = app
        .expect_data(Method::GET, "/api/v1/services/requests?status=pending", None, 200)
        .await;
    assert_eq!(page["total"], 2);

    let page = app
        .expect_data(Method::GET, "/api/v1/services/requests?search=outage", None, 200)
        .await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn schedules_need_a_forward_window() {
    let app = TestApp::new().await;
    let fixture = fixture(&app).await;
    let request = open_request(&app, &fixture, "Compressor service", "medium").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/services/schedules",
            Some(json!({
                "technician_id": fixture.technician,
                "service_request_id": id_of(&request),
                "start_time": "2024-05-01T12:00:00Z",
                "end_time": "2024-05-01T09:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let schedule = app
        .expect_data(
            Method::POST,
            "/api/v1/services/schedules",
            Some(json!({
                "technician_id": fixture.technician,
                "service_request_id": id_of(&request),
                "start_time": "2024-05-01T09:00:00Z",
                "end_time": "2024-05-01T12:00:00Z"
            })),
            201,
        )
        .await;

    // Moving only the start past the stored end is still rejected
    let response = app
        .request_authenticated(
            Method::PATCH,
            &format!("/api/v1/services/schedules/{}", id_of(&schedule)),
            Some(json!({ "start_time": "2024-05-01T13:00:00Z" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let confirmed = app
        .expect_data(
            Method::PATCH,
            &format!("/api/v1/services/schedules/{}", id_of(&schedule)),
            Some(json!({ "is_confirmed": true })),
            200,
        )
        .await;
    assert_eq!(confirmed["is_confirmed"], true);
}
