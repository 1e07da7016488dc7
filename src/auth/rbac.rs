/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Built-in roles and their permission grants. Database roles with the same
 * name inherit these grants in addition to their own `role_permissions`.
 */

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

pub const ADMIN_ROLE: &str = "admin";
pub const MANAGER_ROLE: &str = "manager";
pub const STAFF_ROLE: &str = "staff";
pub const READONLY_ROLE: &str = "readonly";

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

const BUSINESS_RESOURCES: &[&str] = &[
    "contacts",
    "companies",
    "addresses",
    "invoices",
    "payments",
    "accounts",
    "transactions",
    "expenses",
    "products",
    "categories",
    "brands",
    "suppliers",
    "inventory",
    "service_requests",
    "service_types",
    "technicians",
    "schedules",
];

fn grants(resources: &[&str], actions: &[&str]) -> Vec<String> {
    resources
        .iter()
        .flat_map(|resource| actions.iter().map(move |action| format!("{resource}:{action}")))
        .collect()
}

lazy_static! {
    pub static ref ROLES: HashMap<String, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            ADMIN_ROLE.to_string(),
            Role {
                name: ADMIN_ROLE.to_string(),
                description: "Administrator with full access".to_string(),
                permissions: vec!["*".to_string()],
            },
        );

        let mut manager = grants(BUSINESS_RESOURCES, &["*"]);
        manager.extend(grants(&["users", "profiles", "roles", "permissions"], &["read"]));
        manager.extend(grants(&["configurations", "audit_logs"], &["read"]));
        roles.insert(
            MANAGER_ROLE.to_string(),
            Role {
                name: MANAGER_ROLE.to_string(),
                description: "Manager with full access to business records".to_string(),
                permissions: manager,
            },
        );

        let mut staff = grants(BUSINESS_RESOURCES, &["read", "create", "update"]);
        staff.extend(grants(&["profiles", "configurations"], &["read"]));
        roles.insert(
            STAFF_ROLE.to_string(),
            Role {
                name: STAFF_ROLE.to_string(),
                description: "Staff member who maintains day-to-day records".to_string(),
                permissions: staff,
            },
        );

        roles.insert(
            READONLY_ROLE.to_string(),
            Role {
                name: READONLY_ROLE.to_string(),
                description: "Read-only access to business records".to_string(),
                permissions: grants(BUSINESS_RESOURCES, &["read"]),
            },
        );

        roles
    };
}

/// Checks a single granted permission against a required one
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == "*" || granted == required {
        return true;
    }

    match granted.strip_suffix(":*") {
        Some(resource) => required
            .split_once(':')
            .map_or(false, |(required_resource, _)| required_resource == resource),
        None => false,
    }
}

/// RBAC service for resolving built-in roles
#[derive(Clone, Default)]
pub struct RbacService;

impl RbacService {
    pub fn new() -> Self {
        Self
    }

    pub fn get_role(&self, role_name: &str) -> Option<&Role> {
        ROLES.get(role_name)
    }

    pub fn get_all_roles(&self) -> Vec<&Role> {
        ROLES.values().collect()
    }

    /// Get all permissions for multiple roles; unknown names contribute nothing
    pub fn get_permissions_for_roles(&self, role_names: &[String]) -> HashSet<String> {
        let mut permissions = HashSet::new();

        for role_name in role_names {
            if let Some(role) = ROLES.get(role_name) {
                permissions.extend(role.permissions.iter().cloned());
            }
        }

        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*", "invoices:delete", true)]
    #[case("invoices:*", "invoices:update", true)]
    #[case("invoices:read", "invoices:read", true)]
    #[case("invoices:read", "invoices:update", false)]
    #[case("invoice:*", "invoices:read", false)]
    #[case("contacts:*", "companies:read", false)]
    fn wildcard_matching(#[case] granted: &str, #[case] required: &str, #[case] expected: bool) {
        assert_eq!(permission_matches(granted, required), expected);
    }

    #[test]
    fn builtin_roles_exist() {
        let rbac = RbacService::new();
        for name in [ADMIN_ROLE, MANAGER_ROLE, STAFF_ROLE, READONLY_ROLE] {
            assert!(rbac.get_role(name).is_some(), "missing role {name}");
        }
        assert_eq!(rbac.get_all_roles().len(), 4);
    }

    #[test]
    fn readonly_cannot_write() {
        let perms = RbacService::new().get_permissions_for_roles(&[READONLY_ROLE.to_string()]);
        assert!(perms.contains("invoices:read"));
        assert!(!perms.iter().any(|p| permission_matches(p, "invoices:create")));
    }

    #[test]
    fn staff_cannot_delete_but_manager_can() {
        let rbac = RbacService::new();
        let staff = rbac.get_permissions_for_roles(&[STAFF_ROLE.to_string()]);
        assert!(!staff.iter().any(|p| permission_matches(p, "products:delete")));

        let manager = rbac.get_permissions_for_roles(&[MANAGER_ROLE.to_string()]);
        assert!(manager.iter().any(|p| permission_matches(p, "products:delete")));
        assert!(!manager.iter().any(|p| permission_matches(p, "users:delete")));
    }
}
