//! `/api/v1/finance`: invoices, payments, chart of accounts, journal transactions and expenses

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use super::common::{created, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt, Resources},
    errors::ServiceError,
    services::{
        finance::{
            accounts::{
                AccountBalance, AccountFilters, AccountResponse, CreateAccountRequest,
                UpdateAccountRequest,
            },
            expenses::{
                CreateExpenseRequest, ExpenseFilters, ExpenseResponse, UpdateExpenseRequest,
            },
            invoices::{
                CreateInvoiceItemRequest, CreateInvoiceRequest, InvoiceFilters,
                InvoiceItemResponse, InvoiceResponse, UpdateInvoiceRequest,
            },
            payments::{
                CreatePaymentRequest, PaymentFilters, PaymentResponse, UpdatePaymentRequest,
            },
            transactions::{
                CreateTransactionRequest, TransactionFilters, TransactionResponse,
                UpdateTransactionRequest,
            },
        },
        Actor,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn routes() -> Router<AppState> {
    let invoices = Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/:id",
            get(get_invoice)
                .put(replace_invoice)
                .patch(update_invoice)
                .delete(delete_invoice),
        )
        .route(
            "/invoices/:id/items",
            get(list_invoice_items).post(add_invoice_item),
        )
        .route(
            "/invoices/:id/items/:item_id",
            put(update_invoice_item).delete(delete_invoice_item),
        )
        .with_resource(Resources::INVOICES);

    let payments = Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route(
            "/payments/:id",
            get(get_payment)
                .put(replace_payment)
                .patch(update_payment)
                .delete(delete_payment),
        )
        .with_resource(Resources::PAYMENTS);

    let accounts = Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(get_account)
                .put(replace_account)
                .patch(update_account)
                .delete(delete_account),
        )
        .route("/accounts/:id/balance", get(account_balance))
        .with_resource(Resources::ACCOUNTS);

    let transactions = Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(replace_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .with_resource(Resources::TRANSACTIONS);

    let expenses = Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense)
                .put(replace_expense)
                .patch(update_expense)
                .delete(delete_expense),
        )
        .with_resource(Resources::EXPENSES);

    let expense_approval = Router::new()
        .route("/expenses/:id/approve", post(approve_expense))
        .with_permission(perm::EXPENSES_MANAGE);

    Router::new()
        .merge(invoices)
        .merge(payments)
        .merge(accounts)
        .merge(transactions)
        .merge(expenses)
        .merge(expense_approval)
}

// ---- invoices ----

#[utoipa::path(
    get,
    path = "/api/v1/finance/invoices",
    tag = "finance",
    summary = "List invoices",
    params(ListQuery, InvoiceFilters),
    responses(
        (status = 200, description = "Invoices with items", body = ApiResponse<PaginatedResponse<InvoiceResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<InvoiceFilters>,
) -> ApiResult<PaginatedResponse<InvoiceResponse>> {
    let page = state
        .services
        .invoices
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/invoices",
    tag = "finance",
    summary = "Create invoice",
    description = "Creates the invoice and its items in one transaction; totals are computed from the items",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = ApiResponse<InvoiceResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Created<InvoiceResponse> {
    Ok(created(state.services.invoices.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/invoices/{id}",
    tag = "finance",
    summary = "Get invoice",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = ApiResponse<InvoiceResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<InvoiceResponse> {
    Ok(ok(state.services.invoices.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/invoices/{id}",
    tag = "finance",
    summary = "Replace invoice header",
    description = "Items are managed through the items sub-resource and are left untouched",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = CreateInvoiceRequest,
    responses((status = 200, description = "Invoice updated", body = ApiResponse<InvoiceResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateInvoiceRequest>,
) -> ApiResult<InvoiceResponse> {
    Ok(ok(state
        .services
        .invoices
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/finance/invoices/{id}",
    tag = "finance",
    summary = "Update invoice header",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses((status = 200, description = "Invoice updated", body = ApiResponse<InvoiceResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> ApiResult<InvoiceResponse> {
    Ok(ok(state.services.invoices.update(id, payload, &actor).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/invoices/{id}",
    tag = "finance",
    summary = "Delete invoice",
    description = "Items and payments are removed with the invoice",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses((status = 204, description = "Invoice deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.invoices.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/invoices/{id}/items",
    tag = "finance",
    summary = "List invoice items",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Items", body = ApiResponse<Vec<InvoiceItemResponse>>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_invoice_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<InvoiceItemResponse>> {
    Ok(ok(state.services.invoices.items(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/invoices/{id}/items",
    tag = "finance",
    summary = "Add invoice item",
    description = "Recomputes the invoice subtotal, tax and total",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = CreateInvoiceItemRequest,
    responses(
        (status = 201, description = "Item added", body = ApiResponse<InvoiceItemResponse>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_invoice_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateInvoiceItemRequest>,
) -> Created<InvoiceItemResponse> {
    Ok(created(state.services.invoices.add_item(id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/invoices/{id}/items/{item_id}",
    tag = "finance",
    summary = "Replace invoice item",
    description = "Recomputes the invoice subtotal, tax and total",
    params(
        ("id" = Uuid, Path, description = "Invoice ID"),
        ("item_id" = Uuid, Path, description = "Item ID"),
    ),
    request_body = CreateInvoiceItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<InvoiceItemResponse>),
        (status = 404, description = "Invoice or item not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_invoice_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateInvoiceItemRequest>,
) -> ApiResult<InvoiceItemResponse> {
    Ok(ok(state
        .services
        .invoices
        .update_item(id, item_id, payload.into())
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/invoices/{id}/items/{item_id}",
    tag = "finance",
    summary = "Delete invoice item",
    params(
        ("id" = Uuid, Path, description = "Invoice ID"),
        ("item_id" = Uuid, Path, description = "Item ID"),
    ),
    responses((status = 204, description = "Item deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_invoice_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServiceError> {
    state.services.invoices.delete_item(id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- payments ----

#[utoipa::path(
    get,
    path = "/api/v1/finance/payments",
    tag = "finance",
    summary = "List payments",
    params(ListQuery, PaymentFilters),
    responses((status = 200, description = "Payments", body = ApiResponse<PaginatedResponse<PaymentResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<PaymentFilters>,
) -> ApiResult<PaginatedResponse<PaymentResponse>> {
    let page = state
        .services
        .payments
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/payments",
    tag = "finance",
    summary = "Record payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_payment(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreatePaymentRequest>,
) -> Created<PaymentResponse> {
    Ok(created(state.services.payments.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/payments/{id}",
    tag = "finance",
    summary = "Get payment",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = ApiResponse<PaymentResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PaymentResponse> {
    Ok(ok(state.services.payments.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/payments/{id}",
    tag = "finance",
    summary = "Replace payment",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = CreatePaymentRequest,
    responses((status = 200, description = "Payment updated", body = ApiResponse<PaymentResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<PaymentResponse> {
    Ok(ok(state
        .services
        .payments
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/finance/payments/{id}",
    tag = "finance",
    summary = "Update payment",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses((status = 200, description = "Payment updated", body = ApiResponse<PaymentResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdatePaymentRequest>,
) -> ApiResult<PaymentResponse> {
    Ok(ok(state.services.payments.update(id, payload, &actor).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/payments/{id}",
    tag = "finance",
    summary = "Delete payment",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses((status = 204, description = "Payment deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.payments.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- chart of accounts ----

#[utoipa::path(
    get,
    path = "/api/v1/finance/accounts",
    tag = "finance",
    summary = "List ledger accounts",
    params(ListQuery, AccountFilters),
    responses((status = 200, description = "Accounts", body = ApiResponse<PaginatedResponse<AccountResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AccountFilters>,
) -> ApiResult<PaginatedResponse<AccountResponse>> {
    let page = state
        .services
        .ledger_accounts
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/accounts",
    tag = "finance",
    summary = "Create ledger account",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AccountResponse>),
        (status = 409, description = "Code already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Created<AccountResponse> {
    Ok(created(state.services.ledger_accounts.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/accounts/{id}",
    tag = "finance",
    summary = "Get ledger account",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AccountResponse> {
    Ok(ok(state.services.ledger_accounts.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/accounts/{id}",
    tag = "finance",
    summary = "Replace ledger account",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Account set as its own parent", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn replace_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<AccountResponse> {
    Ok(ok(state
        .services
        .ledger_accounts
        .update(id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/finance/accounts/{id}",
    tag = "finance",
    summary = "Update ledger account",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Account set as its own parent", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<AccountResponse> {
    Ok(ok(state.services.ledger_accounts.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/accounts/{id}",
    tag = "finance",
    summary = "Delete ledger account",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 409, description = "Account has children, transactions or expenses", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.ledger_accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/accounts/{id}/balance",
    tag = "finance",
    summary = "Ledger account balance",
    description = "Debit-normal accounts (asset, expense) report debits minus credits; the rest report credits minus debits",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Balance", body = ApiResponse<AccountBalance>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn account_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AccountBalance> {
    Ok(ok(state.services.ledger_accounts.balance(id).await?))
}

// ---- transactions ----

#[utoipa::path(
    get,
    path = "/api/v1/finance/transactions",
    tag = "finance",
    summary = "List journal transactions",
    params(ListQuery, TransactionFilters),
    responses((status = 200, description = "Transactions", body = ApiResponse<PaginatedResponse<TransactionResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TransactionFilters>,
) -> ApiResult<PaginatedResponse<TransactionResponse>> {
    let page = state
        .services
        .transactions
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/transactions",
    tag = "finance",
    summary = "Post journal transaction",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction posted", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Debit and credit accounts are the same", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateTransactionRequest>,
) -> Created<TransactionResponse> {
    Ok(created(
        state.services.transactions.create(payload, &actor).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/transactions/{id}",
    tag = "finance",
    summary = "Get journal transaction",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransactionResponse> {
    Ok(ok(state.services.transactions.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/transactions/{id}",
    tag = "finance",
    summary = "Replace journal transaction",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = CreateTransactionRequest,
    responses((status = 200, description = "Transaction updated", body = ApiResponse<TransactionResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<TransactionResponse> {
    Ok(ok(state
        .services
        .transactions
        .update(id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/finance/transactions/{id}",
    tag = "finance",
    summary = "Update journal transaction",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = UpdateTransactionRequest,
    responses((status = 200, description = "Transaction updated", body = ApiResponse<TransactionResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<TransactionResponse> {
    Ok(ok(state.services.transactions.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/transactions/{id}",
    tag = "finance",
    summary = "Delete journal transaction",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses((status = 204, description = "Transaction deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.transactions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- expenses ----

#[utoipa::path(
    get,
    path = "/api/v1/finance/expenses",
    tag = "finance",
    summary = "List expenses",
    params(ListQuery, ExpenseFilters),
    responses((status = 200, description = "Expenses", body = ApiResponse<PaginatedResponse<ExpenseResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ExpenseFilters>,
) -> ApiResult<PaginatedResponse<ExpenseResponse>> {
    let page = state
        .services
        .expenses
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/expenses",
    tag = "finance",
    summary = "Record expense",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_expense(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateExpenseRequest>,
) -> Created<ExpenseResponse> {
    Ok(created(state.services.expenses.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance/expenses/{id}",
    tag = "finance",
    summary = "Get expense",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense", body = ApiResponse<ExpenseResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ExpenseResponse> {
    Ok(ok(state.services.expenses.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/finance/expenses/{id}",
    tag = "finance",
    summary = "Replace expense",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = CreateExpenseRequest,
    responses((status = 200, description = "Expense updated", body = ApiResponse<ExpenseResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<ExpenseResponse> {
    Ok(ok(state.services.expenses.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/finance/expenses/{id}",
    tag = "finance",
    summary = "Update expense",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = UpdateExpenseRequest,
    responses((status = 200, description = "Expense updated", body = ApiResponse<ExpenseResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> ApiResult<ExpenseResponse> {
    Ok(ok(state.services.expenses.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/finance/expenses/{id}",
    tag = "finance",
    summary = "Delete expense",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses((status = 204, description = "Expense deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.expenses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/finance/expenses/{id}/approve",
    tag = "finance",
    summary = "Approve expense",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense approved", body = ApiResponse<ExpenseResponse>),
        (status = 403, description = "Requires expenses:manage", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already approved", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn approve_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> ApiResult<ExpenseResponse> {
    Ok(ok(state.services.expenses.approve(id, &actor).await?))
}
