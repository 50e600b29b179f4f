pub mod auth;
pub use auth::{auth_guard, AuthenticatedUser};
pub mod rbac;
pub use rbac::{ApproverRole, RequireRole, RoleSet};
