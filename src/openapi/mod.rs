use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the `Bearer` JWT scheme referenced by `security(("Bearer" = []))`
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Farjad ERP API",
        version = "1.0.0",
        description = r#"
# Farjad ERP API

Back office for small service businesses: user accounts, contacts and companies,
invoicing and bookkeeping, product inventory and field service dispatch.

## Authentication

Obtain a token pair from `POST /api/v1/accounts/login` and send the access token
on every other request:

```
Authorization: Bearer <access-token>
```

Permissions have the form `resource:action` (`read`, `create`, `update`,
`delete`, `manage`). `resource:*` and `*` grant wildcards.

## Lists

Every list endpoint accepts:
- `page`: page number (default 1)
- `limit`: items per page (default 20, max 100)
- `search`: whitespace separated terms, all of which must match
- `ordering`: comma separated fields, `-` prefix for descending

## Errors

Failures return `ErrorResponse`:

```json
{
  "error": "Not Found",
  "message": "Not found: Invoice 550e8400-e29b-41d4-a716-446655440000 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8000", description = "Local development")),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Authentication, users, profiles and roles"),
        (name = "core", description = "Contacts, companies, addresses, configuration and audit trail"),
        (name = "finance", description = "Invoices, payments, ledger accounts, transactions and expenses"),
        (name = "inventory", description = "Products, categories, brands, suppliers and stock movements"),
        (name = "services", description = "Service requests, service types, technicians and schedules"),
        (name = "health", description = "Liveness, readiness and build metadata")
    ),
    paths(
        crate::health::health_check,
        crate::health::readiness_check,
        crate::health::version_info,
        // accounts
        crate::handlers::accounts::login,
        crate::handlers::accounts::token,
        crate::handlers::accounts::refresh_token,
        crate::handlers::accounts::register,
        crate::handlers::accounts::request_password_reset,
        crate::handlers::accounts::confirm_password_reset,
        crate::handlers::accounts::get_me,
        crate::handlers::accounts::replace_me,
        crate::handlers::accounts::update_me,
        crate::handlers::accounts::logout,
        crate::handlers::accounts::list_users,
        crate::handlers::accounts::create_user,
        crate::handlers::accounts::get_user,
        crate::handlers::accounts::replace_user,
        crate::handlers::accounts::update_user,
        crate::handlers::accounts::delete_user,
        crate::handlers::accounts::list_user_roles,
        crate::handlers::accounts::assign_user_role,
        crate::handlers::accounts::remove_user_role,
        crate::handlers::accounts::list_profiles,
        crate::handlers::accounts::create_profile,
        crate::handlers::accounts::get_profile,
        crate::handlers::accounts::replace_profile,
        crate::handlers::accounts::update_profile,
        crate::handlers::accounts::delete_profile,
        crate::handlers::accounts::list_roles,
        crate::handlers::accounts::create_role,
        crate::handlers::accounts::get_role,
        crate::handlers::accounts::replace_role,
        crate::handlers::accounts::update_role,
        crate::handlers::accounts::delete_role,
        crate::handlers::accounts::grant_permission,
        crate::handlers::accounts::revoke_permission,
        crate::handlers::accounts::list_permissions,
        crate::handlers::accounts::get_permission,
        // core_data
        crate::handlers::core_data::list_contacts,
        crate::handlers::core_data::create_contact,
        crate::handlers::core_data::contact_statistics,
        crate::handlers::core_data::get_contact,
        crate::handlers::core_data::replace_contact,
        crate::handlers::core_data::update_contact,
        crate::handlers::core_data::delete_contact,
        crate::handlers::core_data::list_companies,
        crate::handlers::core_data::create_company,
        crate::handlers::core_data::company_statistics,
        crate::handlers::core_data::get_company,
        crate::handlers::core_data::replace_company,
        crate::handlers::core_data::update_company,
        crate::handlers::core_data::delete_company,
        crate::handlers::core_data::list_addresses,
        crate::handlers::core_data::create_address,
        crate::handlers::core_data::get_address,
        crate::handlers::core_data::replace_address,
        crate::handlers::core_data::update_address,
        crate::handlers::core_data::delete_address,
        crate::handlers::core_data::list_configurations,
        crate::handlers::core_data::create_configuration,
        crate::handlers::core_data::get_configuration,
        crate::handlers::core_data::replace_configuration,
        crate::handlers::core_data::update_configuration,
        crate::handlers::core_data::delete_configuration,
        crate::handlers::core_data::list_audit_logs,
        crate::handlers::core_data::get_audit_log,
        // finance
        crate::handlers::finance::list_invoices,
        crate::handlers::finance::create_invoice,
        crate::handlers::finance::get_invoice,
        crate::handlers::finance::replace_invoice,
        crate::handlers::finance::update_invoice,
        crate::handlers::finance::delete_invoice,
        crate::handlers::finance::list_invoice_items,
        crate::handlers::finance::add_invoice_item,
        crate::handlers::finance::update_invoice_item,
        crate::handlers::finance::delete_invoice_item,
        crate::handlers::finance::list_payments,
        crate::handlers::finance::create_payment,
        crate::handlers::finance::get_payment,
        crate::handlers::finance::replace_payment,
        crate::handlers::finance::update_payment,
        crate::handlers::finance::delete_payment,
        crate::handlers::finance::list_accounts,
        crate::handlers::finance::create_account,
        crate::handlers::finance::get_account,
        crate::handlers::finance::replace_account,
        crate::handlers::finance::update_account,
        crate::handlers::finance::delete_account,
        crate::handlers::finance::account_balance,
        crate::handlers::finance::list_transactions,
        crate::handlers::finance::create_transaction,
        crate::handlers::finance::get_transaction,
        crate::handlers::finance::replace_transaction,
        crate::handlers::finance::update_transaction,
        crate::handlers::finance::delete_transaction,
        crate::handlers::finance::list_expenses,
        crate::handlers::finance::create_expense,
        crate::handlers::finance::get_expense,
        crate::handlers::finance::replace_expense,
        crate::handlers::finance::update_expense,
        crate::handlers::finance::delete_expense,
        crate::handlers::finance::approve_expense,
        // inventory
        crate::handlers::inventory::list_products,
        crate::handlers::inventory::create_product,
        crate::handlers::inventory::get_product,
        crate::handlers::inventory::replace_product,
        crate::handlers::inventory::update_product,
        crate::handlers::inventory::delete_product,
        crate::handlers::inventory::list_product_images,
        crate::handlers::inventory::add_product_image,
        crate::handlers::inventory::delete_product_image,
        crate::handlers::inventory::list_categories,
        crate::handlers::inventory::create_category,
        crate::handlers::inventory::get_category,
        crate::handlers::inventory::replace_category,
        crate::handlers::inventory::update_category,
        crate::handlers::inventory::delete_category,
        crate::handlers::inventory::list_brands,
        crate::handlers::inventory::create_brand,
        crate::handlers::inventory::get_brand,
        crate::handlers::inventory::replace_brand,
        crate::handlers::inventory::update_brand,
        crate::handlers::inventory::delete_brand,
        crate::handlers::inventory::list_suppliers,
        crate::handlers::inventory::create_supplier,
        crate::handlers::inventory::get_supplier,
        crate::handlers::inventory::replace_supplier,
        crate::handlers::inventory::update_supplier,
        crate::handlers::inventory::delete_supplier,
        crate::handlers::inventory::list_movements,
        crate::handlers::inventory::create_movement,
        crate::handlers::inventory::get_movement,
        crate::handlers::inventory::replace_movement,
        crate::handlers::inventory::update_movement,
        crate::handlers::inventory::delete_movement,
        // field_service
        crate::handlers::field_service::list_requests,
        crate::handlers::field_service::create_request,
        crate::handlers::field_service::get_request,
        crate::handlers::field_service::replace_request,
        crate::handlers::field_service::update_request,
        crate::handlers::field_service::delete_request,
        crate::handlers::field_service::list_notes,
        crate::handlers::field_service::add_note,
        crate::handlers::field_service::get_rating,
        crate::handlers::field_service::rate_request,
        crate::handlers::field_service::list_types,
        crate::handlers::field_service::create_type,
        crate::handlers::field_service::get_type,
        crate::handlers::field_service::replace_type,
        crate::handlers::field_service::update_type,
        crate::handlers::field_service::delete_type,
        crate::handlers::field_service::list_technicians,
        crate::handlers::field_service::create_technician,
        crate::handlers::field_service::get_technician,
        crate::handlers::field_service::replace_technician,
        crate::handlers::field_service::update_technician,
        crate::handlers::field_service::delete_technician,
        crate::handlers::field_service::list_schedules,
        crate::handlers::field_service::create_schedule,
        crate::handlers::field_service::get_schedule,
        crate::handlers::field_service::replace_schedule,
        crate::handlers::field_service::update_schedule,
        crate::handlers::field_service::delete_schedule,
    ),
    components(
        schemas(
            crate::ListQuery,
            crate::ResponseMeta,
            crate::errors::ErrorResponse,
            crate::health::HealthResponse,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_module() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Farjad ERP API"));
        for path in [
            "/api/v1/accounts/login",
            "/api/v1/core/contacts",
            "/api/v1/finance/invoices/{id}/items",
            "/api/v1/inventory/products",
            "/api/v1/services/requests/{id}/rating",
            "/health",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(json.contains("\"Bearer\""));
    }
}
