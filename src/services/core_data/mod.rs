//! Contacts, companies, addresses and system records

pub mod addresses;
pub mod audit_logs;
pub mod companies;
pub mod configurations;
pub mod contacts;

pub use addresses::AddressService;
pub use audit_logs::AuditLogService;
pub use companies::CompanyService;
pub use configurations::ConfigurationService;
pub use contacts::ContactService;
