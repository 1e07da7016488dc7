mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{decimal, id_of, TestApp};
use rust_decimal_macros::dec;

struct Catalog {
    category: String,
    brand: String,
}

async fn catalog(app: &TestApp) -> Catalog {
    let category = app
        .expect_data(
            Method::POST,
            "/api/v1/inventory/categories",
            Some(json!({ "name": "Motors" })),
            201,
        )
        .await;
    let brand = app
        .expect_data(
            Method::POST,
            "/api/v1/inventory/brands",
            Some(json!({ "name": "Siemens", "website": "https://www.siemens.com" })),
            201,
        )
        .await;
    Catalog {
        category: id_of(&category),
        brand: id_of(&brand),
    }
}

async fn product(app: &TestApp, catalog: &Catalog, sku: &str) -> Value {
    app.expect_data(
        Method::POST,
        "/api/v1/inventory/products",
        Some(json!({
            "name": "Industrial Motor",
            "sku": sku,
            "category_id": catalog.category,
            "brand_id": catalog.brand,
            "cost_price": "80",
            "selling_price": "100",
            "min_stock_level": 5,
            "max_stock_level": 100
        })),
        201,
    )
    .await
}

async fn move_stock(app: &TestApp, product_id: &str, quantity: i32, kind: &str) -> Value {
    app.expect_data(
        Method::POST,
        "/api/v1/inventory/inventory",
        Some(json!({
            "product_id": product_id,
            "quantity": quantity,
            "transaction_type": kind
        })),
        201,
    )
    .await
}

#[tokio::test]
async fn product_reports_labels_margin_and_empty_stock() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;

    let created = product(&app, &catalog, "MOT-001").await;
    assert_eq!(created["category_name"], "Motors");
    assert_eq!(created["brand_name"], "Siemens");
    assert_eq!(created["status"], "active");
    assert_eq!(decimal(&created["profit_margin"]), dec!(25));
    assert_eq!(created["current_stock"], 0);
    assert_eq!(created["is_out_of_stock"], true);
    assert_eq!(created["is_low_stock"], true);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/products",
            Some(json!({
                "name": "Duplicate",
                "sku": "MOT-001",
                "category_id": catalog.category,
                "brand_id": catalog.brand,
                "cost_price": "1",
                "selling_price": "2"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn product_rejects_inverted_stock_levels() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/products",
            Some(json!({
                "name": "Panel",
                "sku": "CP-001",
                "category_id": catalog.category,
                "brand_id": catalog.brand,
                "cost_price": "10",
                "selling_price": "20",
                "min_stock_level": 50,
                "max_stock_level": 10
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_is_the_sum_of_movements() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let id = id_of(&product(&app, &catalog, "MOT-002").await);

    let received = move_stock(&app, &id, 20, "in").await;
    assert_eq!(received["product_sku"], "MOT-002");
    move_stock(&app, &id, -6, "out").await;
    move_stock(&app, &id, -1, "adjustment").await;

    let refreshed = app
        .expect_data(Method::GET, &format!("/api/v1/inventory/products/{id}"), None, 200)
        .await;
    assert_eq!(refreshed["current_stock"], 13);
    assert_eq!(refreshed["is_low_stock"], false);
    assert_eq!(refreshed["is_out_of_stock"], false);

    let movements = app
        .expect_data(
            Method::GET,
            &format!("/api/v1/inventory/inventory?product={id}"),
            None,
            200,
        )
        .await;
    assert_eq!(movements["total"], 3);

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/inventory/inventory/{}", id_of(&received)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let refreshed = app
        .expect_data(Method::GET, &format!("/api/v1/inventory/products/{id}"), None, 200)
        .await;
    assert_eq!(refreshed["current_stock"], -7);
    assert_eq!(refreshed["is_out_of_stock"], true);
}

#[tokio::test]
async fn category_paths_and_cycles() {
    let app = TestApp::new().await;
    let root = app
        .expect_data(
            Method::POST,
            "/api/v1/inventory/categories",
            Some(json!({ "name": "Electrical" })),
            201,
        )
        .await;
    let child = app
        .expect_data(
            Method::POST,
            "/api/v1/inventory/categories",
            Some(json!({ "name": "Cables", "parent_id": id_of(&root) })),
            201,
        )
        .await;
    assert_eq!(child["full_path"], "Electrical > Cables");

    let response = app
        .request_authenticated(
            Method::PATCH,
            &format!("/api/v1/inventory/categories/{}", id_of(&root)),
            Some(json!({ "parent_id": id_of(&child) })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_allows_one_primary_image() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let id = id_of(&product(&app, &catalog, "MOT-003").await);
    let images = format!("/api/v1/inventory/products/{id}/images");

    app.expect_data(
        Method::POST,
        &images,
        Some(json!({ "image": "products/mot-003-front.jpg", "is_primary": true })),
        201,
    )
    .await;
    app.expect_data(
        Method::POST,
        &images,
        Some(json!({ "image": "products/mot-003-side.jpg", "sort_order": 1 })),
        201,
    )
    .await;

    let response = app
        .request_authenticated(
            Method::POST,
            &images,
            Some(json!({ "image": "products/mot-003-back.jpg", "is_primary": true })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listed = app.expect_data(Method::GET, &images, None, 200).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn suppliers_are_searchable() {
    let app = TestApp::new().await;
    for name in ["Industrial Supply Co.", "Tech Parts Ltd."] {
        app.expect_data(
            Method::POST,
            "/api/v1/inventory/suppliers",
            Some(json!({ "name": name, "email": "sales@example.com" })),
            201,
        )
        .await;
    }

    let page = app
        .expect_data(Method::GET, "/api/v1/inventory/suppliers?search=tech", None, 200)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Tech Parts Ltd.");
}

#[tokio::test]
async fn brand_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let catalog = catalog(&app).await;
    let id = id_of(&product(&app, &catalog, "MOT-004").await);

    let brand_uri = format!("/api/v1/inventory/brands/{}", catalog.brand);
    let response = app.request_authenticated(Method::DELETE, &brand_uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/inventory/products/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.request_authenticated(Method::DELETE, &brand_uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
