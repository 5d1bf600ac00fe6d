//! Authentication lifecycle.
//!
//! [`AuthService`] signs users in and out and keeps the tokens and the
//! signed-in user in the client's [`KeyValueStore`](crate::platform::KeyValueStore).
//! The bearer interceptor reads the token from the same store, so a
//! successful login authenticates every later request.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::endpoints::auth as endpoints;
use super::invalidate;
use crate::client::ApiClient;
use crate::platform::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use crate::types::{
    ApiResponse, AuthSession, LoginForm, RegisterForm, RequestDescriptor, TokenRefresh, User,
    UserUpdate,
};
use crate::{PanelError, Result};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and persist the returned session.
    pub async fn login(&self, credentials: &LoginForm) -> Result<ApiResponse<AuthSession>> {
        let response: ApiResponse<AuthSession> =
            self.client.post(endpoints::LOGIN, credentials).await?;
        if response.success
            && let Some(session) = &response.data
        {
            self.store_session(session)?;
            info!(user = %session.user.email, "signed in");
        }
        Ok(response)
    }

    /// Create an account and persist the returned session.
    pub async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<AuthSession>> {
        let response: ApiResponse<AuthSession> =
            self.client.post(endpoints::REGISTER, form).await?;
        if response.success
            && let Some(session) = &response.data
        {
            self.store_session(session)?;
            info!(user = %session.user.email, "registered");
        }
        Ok(response)
    }

    /// Sign out. Local state is cleared even when the backend call fails.
    pub async fn logout(&self) -> Result<ApiResponse<Value>> {
        if let Err(e) = self.client.post_empty::<Value>(endpoints::LOGOUT).await {
            warn!(error = %e, "logout call failed, clearing local session anyway");
        }
        self.clear_session();
        self.client.clear_cache();
        info!("signed out");
        Ok(ApiResponse::empty("Logged out successfully"))
    }

    /// Fetch the signed-in user and refresh the stored copy.
    pub async fn profile(&self) -> Result<ApiResponse<User>> {
        let response: ApiResponse<User> = self.client.get(endpoints::PROFILE).await?;
        if response.success
            && let Some(user) = &response.data
        {
            self.store_user(user)?;
        }
        Ok(response)
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<ApiResponse<User>> {
        let request = RequestDescriptor::put(endpoints::PROFILE).body(serde_json::to_value(update)?);
        let response: ApiResponse<User> = self
            .client
            .mutate(request, invalidate(endpoints::PROFILE))
            .await?;
        if response.success
            && let Some(user) = &response.data
        {
            self.store_user(user)?;
        }
        Ok(response)
    }

    /// Trade the stored refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<ApiResponse<TokenRefresh>> {
        let refresh_token = self
            .client
            .store()
            .get(REFRESH_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .ok_or(PanelError::MissingRefreshToken)?;

        let response: ApiResponse<TokenRefresh> = self
            .client
            .post(endpoints::REFRESH, &json!({ "refreshToken": refresh_token }))
            .await?;
        if response.success
            && let Some(refresh) = &response.data
        {
            self.client
                .store()
                .set(AUTH_TOKEN_KEY, &refresh.access_token)?;
            debug!("access token refreshed");
        }
        Ok(response)
    }

    pub async fn verify_email(&self, token: &str) -> Result<ApiResponse<Value>> {
        self.client
            .post(endpoints::VERIFY_EMAIL, &json!({ "token": token }))
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiResponse<Value>> {
        self.client
            .post(endpoints::FORGOT_PASSWORD, &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<ApiResponse<Value>> {
        self.client
            .post(
                endpoints::RESET_PASSWORD,
                &json!({ "token": token, "password": new_password }),
            )
            .await
    }

    /// Whether a stored access token exists and has not expired.
    pub fn is_authenticated(&self) -> bool {
        let Some(token) = self.client.store().get(AUTH_TOKEN_KEY) else {
            return false;
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        token_expiry(&token).is_some_and(|exp| exp > now)
    }

    /// The user persisted by the last login or profile fetch.
    pub fn stored_user(&self) -> Option<User> {
        let raw = self.client.store().get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Restore the session on startup.
    ///
    /// Fetches the profile; if that fails, refreshes the token and tries
    /// once more. Any other outcome clears the stored session.
    pub async fn initialize(&self) -> Option<User> {
        if !self.is_authenticated() {
            self.clear_session();
            return None;
        }

        match self.profile().await {
            Ok(response) => return response.success.then_some(response.data).flatten(),
            Err(e) => debug!(error = %e, "profile fetch failed, trying token refresh"),
        }

        let retried = async {
            self.refresh_token().await?;
            self.profile().await
        }
        .await;
        match retried {
            Ok(response) => response.success.then_some(response.data).flatten(),
            Err(e) => {
                warn!(error = %e, "could not restore session");
                self.clear_session();
                None
            }
        }
    }

    fn store_session(&self, session: &AuthSession) -> Result<()> {
        let store = self.client.store();
        store.set(AUTH_TOKEN_KEY, &session.access_token)?;
        store.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.store_user(&session.user)
    }

    fn store_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.client.store().set(USER_KEY, &json)
    }

    fn clear_session(&self) {
        let store = self.client.store();
        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = store.remove(key) {
                warn!(key, error = %e, "failed to clear stored session");
            }
        }
    }
}

/// `exp` claim of a JWT, in seconds since the epoch.
///
/// Returns `None` for anything that is not a three-part token with a
/// base64 JSON payload carrying a numeric `exp`.
pub fn token_expiry(token: &str) -> Option<f64> {
    let mut parts = token.split('.');
    let (_header, payload) = (parts.next()?, parts.next()?);
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(claims: Value) -> String {
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig")
    }

    #[test]
    fn expiry_is_read_from_payload() {
        assert_eq!(token_expiry(&jwt(json!({"exp": 1_700_000_000}))), Some(1.7e9));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let payload = base64::engine::general_purpose::STANDARD.encode(r#"{"exp":42}"#);
        assert!(payload.ends_with('='));
        assert_eq!(token_expiry(&format!("h.{payload}.s")), Some(42.0));
    }

    #[test]
    fn malformed_tokens_have_no_expiry() {
        assert_eq!(token_expiry("not-a-jwt"), None);
        assert_eq!(token_expiry("a.%%%.c"), None);
        assert_eq!(token_expiry(&jwt(json!({"sub": "u1"}))), None);
        assert_eq!(token_expiry(&jwt(json!({"exp": "soon"}))), None);
    }
}
