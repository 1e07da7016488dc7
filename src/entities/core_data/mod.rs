//! Contacts, companies and shared system records

pub mod address;
pub mod audit_log;
pub mod company;
pub mod contact;
pub mod system_configuration;

pub use address::AddressType;
pub use audit_log::AuditAction;
pub use company::CompanyType;
pub use contact::ContactType;
