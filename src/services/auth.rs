//! Authentication service
//!
//! Accounts, passwords and token issuance live in the hosted auth service
//! (GoTrue-compatible REST API). This module forwards sign-in calls to it,
//! verifies the access tokens it issues and joins them with the local
//! `users` row to build the request session.

use std::time::Duration;

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        auth::{AccessClaims, AuthResponse, CompleteSignup, LoginRequest, SignupRequest},
        user::{Session, UpdateProfile, User},
    },
    repository::Repository,
};

const MISSING_PROFILE: &str = "No profile found for this account. Please complete signup.";

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: ProviderUser,
}

/// Signup answers with a full session when email confirmation is disabled
/// and with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignupResponse {
    Session(TokenResponse),
    User(ProviderUser),
}

#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "Auth service rejected the request".to_string())
    }
}

/// HTTP client for the hosted auth REST API
#[derive(Clone)]
pub struct AuthGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthGateway {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build auth HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<SignupResponse> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "username": username, "phone": phone },
        });
        self.send(self.client.post(self.endpoint("signup")).json(&body)).await
    }

    async fn password_grant(&self, email: &str, password: &str) -> AppResult<TokenResponse> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        self.send(request).await.map_err(|e| match e {
            AppError::BadRequest(_) => {
                AppError::Authentication("Invalid login credentials".to_string())
            }
            other => other,
        })
    }

    async fn refresh_grant(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        self.send(request).await.map_err(|e| match e {
            AppError::BadRequest(msg) => AppError::Authentication(msg),
            other => other,
        })
    }

    async fn logout(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Upstream(format!(
                "Logout failed with status {}",
                response.status()
            )))
        }
    }

    fn authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> AppResult<String> {
        let mut params = vec![("provider", provider)];
        if let Some(redirect_to) = redirect_to {
            params.push(("redirect_to", redirect_to));
        }
        let url = Url::parse_with_params(&self.endpoint("authorize"), &params)
            .map_err(|e| AppError::Internal(format!("Invalid auth URL: {}", e)))?;
        Ok(url.into())
    }

    /// Send a request with the project key. 4xx answers become BadRequest
    /// carrying the provider's message, everything else is Upstream.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| AppError::Upstream(format!("Unexpected auth response: {}", e)));
        }

        let message = response
            .json::<ProviderError>()
            .await
            .unwrap_or_default()
            .into_message();

        if status.is_client_error() {
            Err(AppError::BadRequest(message))
        } else {
            Err(AppError::Upstream(format!("Auth service error ({}): {}", status, message)))
        }
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Upstream("Auth service timed out".to_string())
    } else {
        AppError::Upstream(format!("Auth service unreachable: {}", e))
    }
}

/// Verify an access token signed by the auth service
pub fn verify_access_token(token: &str, secret: &str, audience: &str) -> AppResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    decode::<AccessClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Authentication("Token expired".to_string()),
            _ => AppError::Authentication("Invalid token".to_string()),
        })
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    gateway: AuthGateway,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> AppResult<Self> {
        let gateway = AuthGateway::new(&config)?;
        Ok(Self { repository, gateway, config })
    }

    /// Create the auth account and its application profile
    pub async fn signup(&self, request: SignupRequest) -> AppResult<AuthResponse> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        if self.repository.users.email_exists(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let response = self
            .gateway
            .signup(
                &email,
                &request.password,
                request.username.as_deref(),
                request.phone.as_deref(),
            )
            .await?;

        let (provider_user, tokens) = match response {
            SignupResponse::Session(tokens) => {
                let user = ProviderUser { id: tokens.user.id, email: tokens.user.email.clone() };
                (user, Some(tokens))
            }
            SignupResponse::User(user) => (user, None),
        };

        let user = self
            .repository
            .users
            .create(
                provider_user.id,
                provider_user.email.as_deref().unwrap_or(&email),
                request.username.as_deref().map(str::trim),
                request.phone.as_deref().map(str::trim),
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");

        Ok(match tokens {
            Some(tokens) => Self::auth_response(tokens, user),
            None => AuthResponse {
                access_token: None,
                refresh_token: None,
                token_type: "bearer".to_string(),
                expires_in: None,
                user,
            },
        })
    }

    /// Password sign-in
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;
        let tokens = self
            .gateway
            .password_grant(request.email.trim(), &request.password)
            .await?;
        let user = self.profile_of(tokens.user.id).await?;
        Ok(Self::auth_response(tokens, user))
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let tokens = self.gateway.refresh_grant(refresh_token).await?;
        let user = self.profile_of(tokens.user.id).await?;
        Ok(Self::auth_response(tokens, user))
    }

    /// Revoke the session upstream. Failures are logged, not returned: the
    /// client drops its tokens either way.
    pub async fn logout(&self, access_token: &str) {
        if let Err(e) = self.gateway.logout(access_token).await {
            tracing::warn!("Logout failed: {}", e);
        }
    }

    /// Authorize URL the browser is sent to for OAuth sign-in
    pub fn oauth_url(&self, provider: &str, redirect_to: Option<&str>) -> AppResult<String> {
        if provider.trim().is_empty() {
            return Err(AppError::Validation("Provider is required".to_string()));
        }
        let redirect_to = redirect_to.or(self.config.oauth_redirect_url.as_deref());
        self.gateway.authorize_url(provider.trim(), redirect_to)
    }

    /// Resolve a bearer token into the request session
    pub async fn session(&self, token: &str) -> AppResult<Session> {
        let claims = self.verify(token)?;
        let user = self.profile_of(claims.sub).await?;
        Ok(user.into())
    }

    /// Insert the profile of an account created through OAuth sign-in.
    /// Returns the existing profile when there already is one.
    pub async fn complete_signup(&self, token: &str, data: CompleteSignup) -> AppResult<User> {
        data.validate()?;
        let claims = self.verify(token)?;

        if let Some(user) = self.repository.users.find_by_id(claims.sub).await? {
            return Ok(user);
        }

        let email = claims
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::BadRequest("Token carries no email address".to_string()))?;

        let user = self
            .repository
            .users
            .create(
                claims.sub,
                &email.to_lowercase(),
                data.username.as_deref().map(str::trim),
                data.phone.as_deref().map(str::trim),
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Profile completed");
        Ok(user)
    }

    /// Current user's profile
    pub async fn me(&self, session: &Session) -> AppResult<User> {
        self.repository.users.get_by_id(session.user_id).await
    }

    pub async fn update_profile(&self, session: &Session, profile: UpdateProfile) -> AppResult<User> {
        profile.validate()?;
        self.repository.users.update_profile(session.user_id, &profile).await
    }

    fn verify(&self, token: &str) -> AppResult<AccessClaims> {
        verify_access_token(token, &self.config.jwt_secret, &self.config.jwt_audience)
    }

    async fn profile_of(&self, id: Uuid) -> AppResult<User> {
        self.repository
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Authentication(MISSING_PROFILE.to_string()))
    }

    fn auth_response(tokens: TokenResponse, user: User) -> AuthResponse {
        AuthResponse {
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: tokens.expires_in,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use mockito::Matcher;

    const SECRET: &str = "test-secret";

    fn token_for(sub: Uuid, aud: &str, exp: i64) -> String {
        let claims = AccessClaims {
            sub,
            email: Some("site@example.com".to_string()),
            exp,
            iat: Some(Utc::now().timestamp()),
            aud: Some(aud.to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn gateway(url: &str) -> AuthGateway {
        AuthGateway::new(&AuthConfig {
            url: url.to_string(),
            api_key: "anon-key".to_string(),
            request_timeout_secs: 2,
            ..AuthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_verify_access_token() {
        let sub = Uuid::new_v4();
        let token = token_for(sub, "authenticated", Utc::now().timestamp() + 3600);

        let claims = verify_access_token(&token, SECRET, "authenticated").unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("site@example.com"));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let token = token_for(Uuid::new_v4(), "authenticated", Utc::now().timestamp() - 3600);
        match verify_access_token(&token, SECRET, "authenticated") {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected result: {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_audience() {
        let token = token_for(Uuid::new_v4(), "authenticated", Utc::now().timestamp() + 3600);
        assert!(matches!(
            verify_access_token(&token, "other-secret", "authenticated"),
            Err(AppError::Authentication(_))
        ));

        let token = token_for(Uuid::new_v4(), "anon", Utc::now().timestamp() + 3600);
        assert!(matches!(
            verify_access_token(&token, SECRET, "authenticated"),
            Err(AppError::Authentication(_))
        ));

        assert!(verify_access_token("not-a-jwt", SECRET, "authenticated").is_err());
    }

    #[tokio::test]
    async fn test_password_grant_returns_tokens() {
        let mut server = mockito::Server::new_async().await;
        let user_id = Uuid::new_v4();
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .match_header("apikey", "anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "access",
                    "refresh_token": "refresh",
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "user": { "id": user_id, "email": "site@example.com" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let tokens = gateway(&server.url())
            .password_grant("site@example.com", "secret")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.user.id, user_id);
    }

    #[tokio::test]
    async fn test_password_grant_maps_rejection_to_authentication() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
            .create_async()
            .await;

        let result = gateway(&server.url()).password_grant("a@b.c", "wrong").await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_signup_without_confirmation_returns_bare_user() {
        let mut server = mockito::Server::new_async().await;
        let user_id = Uuid::new_v4();
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": user_id, "email": "new@example.com" }).to_string())
            .create_async()
            .await;

        let response = gateway(&server.url())
            .signup("new@example.com", "secret1", Some("new"), None)
            .await
            .unwrap();

        match response {
            SignupResponse::User(user) => assert_eq!(user.id, user_id),
            SignupResponse::Session(_) => panic!("expected bare user"),
        }
    }

    #[tokio::test]
    async fn test_signup_provider_error_is_bad_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":422,"msg":"User already registered"}"#)
            .create_async()
            .await;

        match gateway(&server.url()).signup("dup@example.com", "secret1", None, None).await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "User already registered"),
            _ => panic!("expected BadRequest"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = gateway(&server.url()).refresh_grant("refresh").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let url = gateway("https://auth.example.com/")
            .authorize_url("google", Some("https://app.example.com/after login"))
            .unwrap();

        assert!(url.starts_with("https://auth.example.com/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fapp.example.com%2Fafter+login"));
    }
}
