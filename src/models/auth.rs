//! Sign-in payloads and access token claims

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::user::User;

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 64, message = "Username must be 2-64 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 4, max = 32, message = "Phone must be 4-32 characters"))]
    pub phone: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile fields supplied when an OAuth account signs in for the first time
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteSignup {
    #[validate(length(min = 2, max = 64, message = "Username must be 2-64 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 4, max = 32, message = "Phone must be 4-32 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OAuthQuery {
    /// Provider name known to the auth service, e.g. `google`
    pub provider: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OAuthUrlResponse {
    pub url: String,
}

/// Tokens plus the application user. Tokens are absent after a signup that
/// still awaits email confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Claims of an access token issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub aud: Option<String>,
}
