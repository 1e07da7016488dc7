//! Contacts, companies, addresses and audit logs under `/api/v1/core`.

mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, response_json, TestApp};
use serde_json::{json, Value};

async fn create_contact(app: &TestApp, first: &str, last: &str, contact_type: &str) -> Value {
    app.expect_data(
        Method::POST,
        "/api/v1/core/contacts",
        Some(json!({
            "first_name": first,
            "last_name": last,
            "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            "phone": "+989121234567",
            "contact_type": contact_type
        })),
        201,
    )
    .await
}

#[tokio::test]
async fn contact_crud_round_trip() {
    let app = TestApp::new().await;

    let contact = create_contact(&app, "Ali", "Rezaei", "customer").await;
    assert_eq!(contact["full_name"], "Ali Rezaei");
    assert_eq!(contact["created_by"], app.admin.id.to_string());
    let id = id_of(&contact);

    let fetched = app
        .expect_data(Method::GET, &format!("/api/v1/core/contacts/{id}"), None, 200)
        .await;
    assert_eq!(fetched["email"], "ali.rezaei@example.com");

    let patched = app
        .expect_data(
            Method::PATCH,
            &format!("/api/v1/core/contacts/{id}"),
            Some(json!({ "notes": "Prefers email" })),
            200,
        )
        .await;
    assert_eq!(patched["notes"], "Prefers email");
    assert_eq!(patched["last_name"], "Rezaei");

    let replaced = app
        .expect_data(
            Method::PUT,
            &format!("/api/v1/core/contacts/{id}"),
            Some(json!({
                "first_name": "Ali",
                "last_name": "Karimi",
                "email": "ali.karimi@example.com",
                "contact_type": "supplier"
            })),
            200,
        )
        .await;
    assert_eq!(replaced["contact_type"], "supplier");
    assert_eq!(replaced["full_name"], "Ali Karimi");

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/core/contacts/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/core/contacts/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_validation_errors_are_bad_requests() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/core/contacts",
            Some(json!({
                "first_name": "",
                "last_name": "Rezaei",
                "email": "not-an-email"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["details"].as_str().is_some());
}

#[tokio::test]
async fn contact_list_searches_orders_and_paginates() {
    let app = TestApp::new().await;
    create_contact(&app, "Maryam", "Ahmadi", "customer").await;
    create_contact(&app, "Reza", "Bagheri", "employee").await;
    create_contact(&app, "Sina", "Ahmadi", "customer").await;

    let page = app
        .expect_data(Method::GET, "/api/v1/core/contacts?search=ahmadi", None, 200)
        .await;
    assert_eq!(page["total"], 2);

    // Every term must match some field
    let page = app
        .expect_data(
            Method::GET,
            "/api/v1/core/contacts?search=ahmadi%20sina",
            None,
            200,
        )
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["first_name"], "Sina");

    let page = app
        .expect_data(Method::GET, "/api/v1/core/contacts?ordering=-first_name", None, 200)
        .await;
    let names: Vec<&str> = page["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|c| c["first_name"].as_str())
        .collect();
    assert_eq!(names, vec!["Sina", "Reza", "Maryam"]);

    let page = app
        .expect_data(
            Method::GET,
            "/api/v1/core/contacts?page=2&limit=2&ordering=first_name",
            None,
            200,
        )
        .await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["items"][0]["first_name"], "Sina");

    let page = app
        .expect_data(
            Method::GET,
            "/api/v1/core/contacts?contact_type=employee",
            None,
            200,
        )
        .await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn contact_statistics_count_every_type() {
    let app = TestApp::new().await;
    create_contact(&app, "Maryam", "Ahmadi", "customer").await;
    let inactive = create_contact(&app, "Reza", "Bagheri", "supplier").await;
    app.expect_data(
        Method::PATCH,
        &format!("/api/v1/core/contacts/{}", id_of(&inactive)),
        Some(json!({ "is_active": false })),
        200,
    )
    .await;

    let stats = app
        .expect_data(Method::GET, "/api/v1/core/contacts/statistics", None, 200)
        .await;
    assert_eq!(stats["total_contacts"], 2);
    assert_eq!(stats["active_contacts"], 1);
    assert_eq!(stats["inactive_contacts"], 1);
    assert_eq!(stats["by_type"]["customer"], 1);
    assert_eq!(stats["by_type"]["employee"], 0);
}

#[tokio::test]
async fn address_requires_exactly_one_owner() {
    let app = TestApp::new().await;
    let contact = create_contact(&app, "Maryam", "Ahmadi", "customer").await;
    let company = app
        .expect_data(
            Method::POST,
            "/api/v1/core/companies",
            Some(json!({ "name": "Pars Industrial" })),
            201,
        )
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/core/addresses",
            Some(json!({ "street_address": "12 Valiasr St", "city": "Tehran" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/core/addresses",
            Some(json!({
                "contact_id": id_of(&contact),
                "company_id": id_of(&company),
                "street_address": "12 Valiasr St",
                "city": "Tehran"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let address = app
        .expect_data(
            Method::POST,
            "/api/v1/core/addresses",
            Some(json!({
                "company_id": id_of(&company),
                "street_address": "12 Valiasr St",
                "city": "Tehran"
            })),
            201,
        )
        .await;
    assert_eq!(address["company_id"], id_of(&company));
}

#[tokio::test]
async fn audited_writes_are_listed_in_audit_logs() {
    let app = TestApp::new().await;
    let contact = create_contact(&app, "Maryam", "Ahmadi", "customer").await;

    let logs = app
        .expect_data(
            Method::GET,
            "/api/v1/core/audit-logs?model_name=Contact",
            None,
            200,
        )
        .await;
    assert_eq!(logs["total"], 1);
    let entry = &logs["items"][0];
    assert_eq!(entry["action"], "create");
    assert_eq!(entry["object_id"], id_of(&contact));
    assert_eq!(entry["object_repr"], "Maryam Ahmadi");
    assert_eq!(entry["user_id"], app.admin.id.to_string());
}
