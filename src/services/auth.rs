//! Authentication and session lifecycle.
//!
//! ```text
//! anonymous --login/register--> authenticating --ok--> authenticated
//!                                              \--err--> anonymous
//! authenticated --logout--> anonymous
//! authenticated --any 401--> anonymous        (handled by ApiClient)
//! authenticated --refresh_token--> authenticated (new access token)
//! ```

// Author: kelexine (https://github.com/kelexine)

use crate::cache::TtlCache;
use crate::client::{ApiClient, SessionState};
use crate::error::{ApiError, Result};
use crate::models::{AccessToken, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, User};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    cache: Arc<TtlCache>,
}

impl AuthService {
    pub(crate) fn new(client: ApiClient, cache: Arc<TtlCache>) -> Self {
        Self { client, cache }
    }

    pub fn state(&self) -> SessionState {
        self.client.session().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    /// Log in and persist the issued token pair.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        debug!("Logging in as {}", credentials.username);
        self.authenticate("/auth/login/", credentials).await
    }

    /// Create an account; the backend logs the new user in directly.
    pub async fn register(&self, user: &RegisterRequest) -> Result<AuthResponse> {
        debug!("Registering {}", user.username);
        self.authenticate("/auth/register/", user).await
    }

    async fn authenticate<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<AuthResponse> {
        let session = self.client.session();
        session.begin_authentication();

        let response: AuthResponse = match self.client.post(path, body).await {
            Ok(response) => response,
            Err(e) => {
                session.authentication_failed();
                return Err(e);
            }
        };

        if let Err(e) = self.client.tokens().store(&response.tokens()) {
            session.authentication_failed();
            return Err(e);
        }

        // Cached aggregates may belong to whoever was logged in before.
        self.cache.clear();
        session.authenticated();
        info!("Authenticated as {}", response.user.username);
        Ok(response)
    }

    /// Log out.
    ///
    /// The server is notified on a best-effort basis; local tokens are removed
    /// whether or not that call succeeds.
    pub async fn logout(&self) -> Result<()> {
        if let Some(refresh) = self.client.tokens().refresh_token() {
            let body = RefreshRequest { refresh: &refresh };
            if let Err(e) = self.client.post_empty("/auth/logout/", &body).await {
                warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }

        let cleared = self.client.tokens().clear();
        self.cache.clear();
        self.client.session().logged_out();
        cleared
    }

    pub async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/user/").await
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<String> {
        let refresh = self
            .client
            .tokens()
            .refresh_token()
            .ok_or(ApiError::NoRefreshToken)?;

        let result: Result<AccessToken> = self
            .client
            .post("/auth/token/refresh/", &RefreshRequest { refresh: &refresh })
            .await;

        match result {
            Ok(token) => {
                self.client.tokens().store_access(&token.access)?;
                crate::metrics::record_token_refresh(true);
                debug!("Access token refreshed");
                Ok(token.access.clone())
            }
            Err(e) => {
                crate::metrics::record_token_refresh(false);
                Err(e)
            }
        }
    }
}
