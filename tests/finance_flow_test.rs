//! Invoices, payments, ledger balances and expense approval under `/api/v1/finance`.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn customer(app: &TestApp) -> String {
    let contact = app
        .expect_data(
            Method::POST,
            "/api/v1/core/contacts",
            Some(json!({
                "first_name": "Nima",
                "last_name": "Farahani",
                "email": "nima@example.com"
            })),
            201,
        )
        .await;
    id_of(&contact)
}

async fn account(app: &TestApp, code: &str, name: &str, account_type: &str) -> String {
    let account = app
        .expect_data(
            Method::POST,
            "/api/v1/finance/accounts",
            Some(json!({ "code": code, "name": name, "account_type": account_type })),
            201,
        )
        .await;
    id_of(&account)
}

async fn invoice_with_items(app: &TestApp) -> Value {
    let customer_id = customer(app).await;
    app.expect_data(
        Method::POST,
        "/api/v1/finance/invoices",
        Some(json!({
            "customer_id": customer_id,
            "invoice_date": "2024-03-01",
            "due_date": "2024-03-31",
            "tax_rate": "10",
            "discount_amount": "5",
            "items": [
                { "description": "Motor service", "quantity": "2", "unit_price": "100" },
                { "description": "Filter", "quantity": "1", "unit_price": "50", "discount_percentage": "10" }
            ]
        })),
        201,
    )
    .await
}

#[tokio::test]
async fn invoice_totals_follow_items() {
    let app = TestApp::new().await;
    let invoice = invoice_with_items(&app).await;

    assert!(invoice["invoice_number"].as_str().unwrap_or_default().starts_with("INV-"));
    assert_eq!(invoice["status"], "draft");
    assert_eq!(invoice["customer_name"], "Nima Farahani");
    assert_eq!(invoice["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(decimal(&invoice["subtotal"]), dec!(245));
    assert_eq!(decimal(&invoice["tax_amount"]), dec!(24.50));
    assert_eq!(decimal(&invoice["total_amount"]), dec!(264.50));
    assert_eq!(decimal(&invoice["remaining_amount"]), dec!(264.50));

    let id = id_of(&invoice);
    let item = app
        .expect_data(
            Method::POST,
            &format!("/api/v1/finance/invoices/{id}/items"),
            Some(json!({ "description": "Labour", "quantity": "3", "unit_price": "20" })),
            201,
        )
        .await;
    assert_eq!(decimal(&item["line_total"]), dec!(60));

    let refreshed = app
        .expect_data(Method::GET, &format!("/api/v1/finance/invoices/{id}"), None, 200)
        .await;
    assert_eq!(decimal(&refreshed["subtotal"]), dec!(305));
    assert_eq!(decimal(&refreshed["total_amount"]), dec!(330.50));

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/finance/invoices/{id}/items/{}", id_of(&item)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let refreshed = app
        .expect_data(Method::GET, &format!("/api/v1/finance/invoices/{id}"), None, 200)
        .await;
    assert_eq!(decimal(&refreshed["total_amount"]), dec!(264.50));
}

#[tokio::test]
async fn invoice_rejects_due_date_before_invoice_date() {
    let app = TestApp::new().await;
    let customer_id = customer(&app).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/finance/invoices",
            Some(json!({
                "customer_id": customer_id,
                "invoice_date": "2024-03-10",
                "due_date": "2024-03-01"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payments_reduce_remaining_amount() {
    let app = TestApp::new().await;
    let invoice = invoice_with_items(&app).await;
    let id = id_of(&invoice);

    let payment = app
        .expect_data(
            Method::POST,
            "/api/v1/finance/payments",
            Some(json!({
                "invoice_id": id,
                "amount": "100",
                "payment_method": "bank_transfer"
            })),
            201,
        )
        .await;
    assert!(payment["payment_number"].as_str().unwrap_or_default().starts_with("PAY-"));
    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["invoice_number"], invoice["invoice_number"]);

    let refreshed = app
        .expect_data(Method::GET, &format!("/api/v1/finance/invoices/{id}"), None, 200)
        .await;
    assert_eq!(decimal(&refreshed["remaining_amount"]), dec!(164.50));

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/finance/payments",
            Some(json!({
                "invoice_id": id,
                "amount": "0",
                "payment_method": "cash"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_invoice_removes_its_items_and_payments() {
    let app = TestApp::new().await;
    let invoice = invoice_with_items(&app).await;
    let id = id_of(&invoice);
    app.expect_data(
        Method::POST,
        "/api/v1/finance/payments",
        Some(json!({ "invoice_id": id, "amount": "10", "payment_method": "cash" })),
        201,
    )
    .await;

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/finance/invoices/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let payments = app
        .expect_data(Method::GET, "/api/v1/finance/payments", None, 200)
        .await;
    assert_eq!(payments["total"], 0);
}

#[tokio::test]
async fn account_balance_follows_normal_side() {
    let app = TestApp::new().await;
    let cash = account(&app, "1000", "Cash", "asset").await;
    let revenue = account(&app, "4000", "Sales", "revenue").await;

    for amount in ["300", "200"] {
        app.expect_data(
            Method::POST,
            "/api/v1/finance/transactions",
            Some(json!({
                "description": "Cash sale",
                "amount": amount,
                "debit_account_id": cash,
                "credit_account_id": revenue
            })),
            201,
        )
        .await;
    }

    let balance = app
        .expect_data(
            Method::GET,
            &format!("/api/v1/finance/accounts/{cash}/balance"),
            None,
            200,
        )
        .await;
    assert_eq!(decimal(&balance["debits"]), dec!(500));
    assert_eq!(decimal(&balance["credits"]), dec!(0));
    assert_eq!(decimal(&balance["balance"]), dec!(500));

    let balance = app
        .expect_data(
            Method::GET,
            &format!("/api/v1/finance/accounts/{revenue}/balance"),
            None,
            200,
        )
        .await;
    assert_eq!(decimal(&balance["balance"]), dec!(500));
}

#[tokio::test]
async fn transaction_sides_must_differ() {
    let app = TestApp::new().await;
    let cash = account(&app, "1000", "Cash", "asset").await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/finance/transactions",
            Some(json!({
                "description": "Self transfer",
                "amount": "10",
                "debit_account_id": cash,
                "credit_account_id": cash
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expense_approval_needs_manage_permission() {
    let app = TestApp::new().await;
    let office = account(&app, "6000", "Office", "expense").await;

    let expense = app
        .expect_data(
            Method::POST,
            "/api/v1/finance/expenses",
            Some(json!({
                "description": "Printer paper",
                "category": "office",
                "amount": "42.50",
                "account_id": office
            })),
            201,
        )
        .await;
    assert_eq!(expense["is_approved"], false);
    let approve = format!("/api/v1/finance/expenses/{}/approve", id_of(&expense));

    let staff = app.regular_user_token("clerk", true).await;
    let response = app
        .request(Method::POST, &approve, None, Some(&staff))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let approved = app.expect_data(Method::POST, &approve, None, 200).await;
    assert_eq!(approved["is_approved"], true);
    assert_eq!(approved["approved_by"], app.admin.id.to_string());
    assert!(approved["approved_at"].is_string());

    let response = app.request_authenticated(Method::POST, &approve, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invoiced_customer_cannot_be_deleted() {
    let app = TestApp::new().await;
    let invoice = invoice_with_items(&app).await;
    let customer_id = invoice["customer_id"].as_str().unwrap_or_default();
    let contact_uri = format!("/api/v1/core/contacts/{customer_id}");

    let response = app
        .request_authenticated(Method::DELETE, &contact_uri, None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::response_json(response).await;
    assert!(body["message"].as_str().unwrap_or_default().contains("invoice"));

    // Still there once the invoice goes away
    app.expect_data(Method::GET, &contact_uri, None, 200).await;
    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/finance/invoices/{}", id_of(&invoice)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .request_authenticated(Method::DELETE, &contact_uri, None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
