// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. The trait that defines a set of roles allowed through a guard
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
    fn describe() -> &'static str;
}

/// 2. The extractor. Putting `RequireRole<T>` in a handler's signature makes
/// the role check part of the route itself; the handler body never sees an
/// unauthorized caller. Runs after `auth_guard` has resolved the principal.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allowed().contains(&user.role) {
            return Err(AppError::Forbidden(format!(
                "This action requires {}.",
                T::describe()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// ROLE SET DEFINITIONS
// ---

/// Document approval is reserved for managers and HR.
pub struct ApproverRole;
impl RoleSet for ApproverRole {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::Manager, UserRole::Hr]
    }
    fn describe() -> &'static str {
        "a manager or HR account"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_are_not_approvers() {
        assert!(ApproverRole::allowed().contains(&UserRole::Manager));
        assert!(ApproverRole::allowed().contains(&UserRole::Hr));
        assert!(!ApproverRole::allowed().contains(&UserRole::Staff));
    }
}
