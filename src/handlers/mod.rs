//! HTTP handlers, one module per business area. Each module exposes a
//! `routes()` router that `api_v1_routes` nests under the module prefix.

pub mod accounts;
pub mod common;
pub mod core_data;
pub mod field_service;
pub mod finance;
pub mod inventory;

use std::sync::Arc;

use crate::{
    auth::AuthService,
    config::AppConfig,
    db::DbPool,
    services as svc,
};

pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    // accounts
    pub account: Arc<svc::accounts::AccountService>,
    pub users: Arc<svc::accounts::UserService>,
    pub profiles: Arc<svc::accounts::ProfileService>,
    pub roles: Arc<svc::accounts::RoleService>,
    pub permissions: Arc<svc::accounts::PermissionService>,
    // core
    pub contacts: Arc<svc::core_data::ContactService>,
    pub companies: Arc<svc::core_data::CompanyService>,
    pub addresses: Arc<svc::core_data::AddressService>,
    pub configurations: Arc<svc::core_data::ConfigurationService>,
    pub audit_logs: Arc<svc::core_data::AuditLogService>,
    // finance
    pub invoices: Arc<svc::finance::InvoiceService>,
    pub payments: Arc<svc::finance::PaymentService>,
    pub ledger_accounts: Arc<svc::finance::LedgerAccountService>,
    pub transactions: Arc<svc::finance::TransactionService>,
    pub expenses: Arc<svc::finance::ExpenseService>,
    // inventory
    pub products: Arc<svc::inventory::ProductService>,
    pub categories: Arc<svc::inventory::CategoryService>,
    pub brands: Arc<svc::inventory::BrandService>,
    pub suppliers: Arc<svc::inventory::SupplierService>,
    pub movements: Arc<svc::inventory::InventoryMovementService>,
    // services
    pub service_requests: Arc<svc::field_service::ServiceRequestService>,
    pub service_types: Arc<svc::field_service::ServiceTypeService>,
    pub technicians: Arc<svc::field_service::TechnicianService>,
    pub schedules: Arc<svc::field_service::ScheduleService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>, config: Arc<AppConfig>) -> Self {
        Self {
            account: Arc::new(svc::accounts::AccountService::new(db.clone(), auth, config)),
            users: Arc::new(svc::accounts::UserService::new(db.clone())),
            profiles: Arc::new(svc::accounts::ProfileService::new(db.clone())),
            roles: Arc::new(svc::accounts::RoleService::new(db.clone())),
            permissions: Arc::new(svc::accounts::PermissionService::new(db.clone())),

            contacts: Arc::new(svc::core_data::ContactService::new(db.clone())),
            companies: Arc::new(svc::core_data::CompanyService::new(db.clone())),
            addresses: Arc::new(svc::core_data::AddressService::new(db.clone())),
            configurations: Arc::new(svc::core_data::ConfigurationService::new(db.clone())),
            audit_logs: Arc::new(svc::core_data::AuditLogService::new(db.clone())),

            invoices: Arc::new(svc::finance::InvoiceService::new(db.clone())),
            payments: Arc::new(svc::finance::PaymentService::new(db.clone())),
            ledger_accounts: Arc::new(svc::finance::LedgerAccountService::new(db.clone())),
            transactions: Arc::new(svc::finance::TransactionService::new(db.clone())),
            expenses: Arc::new(svc::finance::ExpenseService::new(db.clone())),

            products: Arc::new(svc::inventory::ProductService::new(db.clone())),
            categories: Arc::new(svc::inventory::CategoryService::new(db.clone())),
            brands: Arc::new(svc::inventory::BrandService::new(db.clone())),
            suppliers: Arc::new(svc::inventory::SupplierService::new(db.clone())),
            movements: Arc::new(svc::inventory::InventoryMovementService::new(db.clone())),

            service_requests: Arc::new(svc::field_service::ServiceRequestService::new(db.clone())),
            service_types: Arc::new(svc::field_service::ServiceTypeService::new(db.clone())),
            technicians: Arc::new(svc::field_service::TechnicianService::new(db.clone())),
            schedules: Arc::new(svc::field_service::ScheduleService::new(db)),
        }
    }
}
