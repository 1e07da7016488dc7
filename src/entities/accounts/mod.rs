//! Users, roles and authentication records

pub mod password_reset_token;
pub mod profile;
pub mod refresh_token;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_role;
pub mod user_session;

pub use profile::Gender;
