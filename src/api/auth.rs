//! Authentication endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        auth::{
            AuthResponse, CompleteSignup, LoginRequest, OAuthQuery, OAuthUrlResponse,
            RefreshRequest, SignupRequest,
        },
        user::{UpdateProfile, User},
    },
    AppState,
};

use super::{BearerToken, CurrentUser};

/// Create an account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.services.auth.signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.services.auth.login(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for new tokens
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Session refreshed", body = AuthResponse),
        (status = 401, description = "Refresh token rejected")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.services.auth.refresh(&request.refresh_token).await?;
    Ok(Json(response))
}

/// Sign out
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> StatusCode {
    state.services.auth.logout(&token).await;
    StatusCode::NO_CONTENT
}

/// Authorize URL for OAuth sign-in
#[utoipa::path(
    get,
    path = "/auth/oauth",
    tag = "auth",
    params(OAuthQuery),
    responses(
        (status = 200, description = "URL to send the browser to", body = OAuthUrlResponse)
    )
)]
pub async fn oauth_url(
    State(state): State<AppState>,
    Query(query): Query<OAuthQuery>,
) -> AppResult<Json<OAuthUrlResponse>> {
    let url = state
        .services
        .auth
        .oauth_url(&query.provider, query.redirect_to.as_deref())?;
    Ok(Json(OAuthUrlResponse { url }))
}

/// Create the profile of an account that signed in through OAuth
#[utoipa::path(
    post,
    path = "/auth/complete-signup",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = CompleteSignup,
    responses(
        (status = 200, description = "Profile ready", body = User),
        (status = 401, description = "Invalid token")
    )
)]
pub async fn complete_signup(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(data): Json<CompleteSignup>,
) -> AppResult<Json<User>> {
    let user = state.services.auth.complete_signup(&token, data).await?;
    Ok(Json(user))
}

/// Current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.me(&session).await?;
    Ok(Json(user))
}

/// Update own username and phone
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(profile): Json<UpdateProfile>,
) -> AppResult<Json<User>> {
    let user = state.services.auth.update_profile(&session, profile).await?;
    Ok(Json(user))
}
