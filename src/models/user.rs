//! User model, session object and role guards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::Role;
use crate::error::AppError;

/// Application user. The id is the hosted auth provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Site the user supervises, if any
    pub site_id: Option<i32>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Case-insensitive substring of the username
    pub username: Option<String>,
    pub role: Option<Role>,
}

/// Change a user's role (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Role,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 2, max = 64, message = "Username must be 2-64 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 4, max = 32, message = "Phone must be 4-32 characters"))]
    pub phone: Option<String>,
}

/// Request-scoped session: the verified token subject joined with its
/// `users` row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub site_id: Option<i32>,
    pub username: Option<String>,
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Session {
            user_id: user.id,
            email: user.email,
            role: user.role,
            site_id: user.site_id,
            username: user.username,
        }
    }
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_any_of(&[Role::Admin])
    }

    pub fn require_supervisor(&self) -> Result<(), AppError> {
        self.require_any_of(&[Role::Supervisor])
    }

    pub fn require_any_of(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role '{}' is not allowed to perform this action",
                self.role
            )))
        }
    }

    /// Site assigned to this user; supervisors without one cannot act on
    /// inventory.
    pub fn require_site(&self) -> Result<i32, AppError> {
        self.site_id.ok_or_else(|| {
            AppError::BusinessRule(
                "You are not assigned to a site. Please contact an administrator.".to_string(),
            )
        })
    }

    /// Admins may view any site, supervisors only their own
    pub fn require_site_access(&self, site_id: i32) -> Result<(), AppError> {
        if self.is_admin() || self.site_id == Some(site_id) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not allowed to access this site".to_string(),
            ))
        }
    }
}
