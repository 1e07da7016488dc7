/*!
 * # Permissions Module
 *
 * Permission strings have the form `resource:action`.
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    pub const MANAGE: &'static str = "manage";
    pub const ALL: &'static str = "*";

    pub fn is_known(action: &str) -> bool {
        matches!(
            action,
            Self::READ | Self::CREATE | Self::UPDATE | Self::DELETE | Self::MANAGE | Self::ALL
        )
    }
}

/// Resource names used by the route permission layers
pub struct Resources;

impl Resources {
    // accounts
    pub const USERS: &'static str = "users";
    pub const PROFILES: &'static str = "profiles";
    pub const ROLES: &'static str = "roles";
    pub const PERMISSIONS: &'static str = "permissions";
    // core
    pub const CONTACTS: &'static str = "contacts";
    pub const COMPANIES: &'static str = "companies";
    pub const ADDRESSES: &'static str = "addresses";
    pub const CONFIGURATIONS: &'static str = "configurations";
    pub const AUDIT_LOGS: &'static str = "audit_logs";
    // finance
    pub const INVOICES: &'static str = "invoices";
    pub const PAYMENTS: &'static str = "payments";
    pub const ACCOUNTS: &'static str = "accounts";
    pub const TRANSACTIONS: &'static str = "transactions";
    pub const EXPENSES: &'static str = "expenses";
    // inventory
    pub const PRODUCTS: &'static str = "products";
    pub const CATEGORIES: &'static str = "categories";
    pub const BRANDS: &'static str = "brands";
    pub const SUPPLIERS: &'static str = "suppliers";
    pub const INVENTORY: &'static str = "inventory";
    // services
    pub const SERVICE_REQUESTS: &'static str = "service_requests";
    pub const SERVICE_TYPES: &'static str = "service_types";
    pub const TECHNICIANS: &'static str = "technicians";
    pub const SCHEDULES: &'static str = "schedules";
}

/// Permission string constants for routes outside the method mapping
pub mod consts {
    pub const EXPENSES_MANAGE: &str = "expenses:manage";
    pub const ROLES_MANAGE: &str = "roles:manage";
    pub const USERS_MANAGE: &str = "users:manage";
}

/// Format a permission string
pub fn format_permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

/// Accepts `resource:action` with a known action, or the bare `*` grant
pub fn is_valid_permission(permission: &str) -> bool {
    if permission == Actions::ALL {
        return true;
    }
    match permission.split_once(':') {
        Some((resource, action)) => {
            !resource.is_empty()
                && resource
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_' || c == '-')
                && Actions::is_known(action)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_resource_and_action() {
        assert_eq!(
            format_permission(Resources::INVOICES, Actions::READ),
            "invoices:read"
        );
    }

    #[test]
    fn validates_permission_shape() {
        assert!(is_valid_permission("invoices:read"));
        assert!(is_valid_permission("service_requests:*"));
        assert!(is_valid_permission("*"));
        assert!(!is_valid_permission("invoices"));
        assert!(!is_valid_permission("invoices:approve"));
        assert!(!is_valid_permission(":read"));
        assert!(!is_valid_permission("Invoices:read"));
    }
}
