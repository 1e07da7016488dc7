//! Users, profiles, roles and the sign-in flows

pub mod auth;
pub mod permissions;
pub mod profiles;
pub mod roles;
pub mod users;

pub use auth::AccountService;
pub use permissions::PermissionService;
pub use profiles::ProfileService;
pub use roles::RoleService;
pub use users::UserService;
