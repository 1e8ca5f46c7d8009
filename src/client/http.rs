// Backend API client - auth injection, error normalization, 401 handling
// Author: kelexine (https://github.com/kelexine)

use super::session::{Session, SessionEvent, SessionState};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::storage::TokenStore;
use bytes::Bytes;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Query parameters attached to a request.
pub type Query<'a> = [(&'a str, String)];

/// Single choke point for every backend call.
///
/// Each request:
/// - carries `Authorization: Bearer <access>` when an access token is stored
/// - is sent exactly once (no retries, no queueing)
/// - on a non-2xx status becomes an [`ApiError`] built from the backend envelope
/// - on a 401 additionally clears both stored tokens and emits
///   [`SessionEvent::Expired`] before the error is returned
///
/// Cloning is cheap; clones share the connection pool, token store and session.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Arc<str>,
    tokens: Arc<dyn TokenStore>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// The session starts `Authenticated` if an access token is already stored.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("fintrack/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let initial = if tokens.has_tokens() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };

        debug!("Created API client for {}", config.base_url);

        Ok(Self {
            http_client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            tokens,
            session: Arc::new(Session::new(initial)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Subscribe to session lifecycle events ("session expired" in particular).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request and return the successful response untouched.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &Query<'_>,
    ) -> Result<Response> {
        let mut builder = self.http_client.request(method.clone(), self.url(path));

        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                crate::metrics::record_api_request(
                    method.as_str(),
                    path,
                    None,
                    start.elapsed().as_secs_f64(),
                );
                warn!("{} {} failed before a response: {}", method, path, e);
                return Err(ApiError::network(&e));
            }
        };

        let status = response.status();
        crate::metrics::record_api_request(
            method.as_str(),
            path,
            Some(status.as_u16()),
            start.elapsed().as_secs_f64(),
        );
        debug!("{} {} -> {}", method, path, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);

        if err.is_auth_expired() {
            self.handle_unauthorized(path);
        } else {
            debug!(
                "Backend error body: {}",
                crate::utils::logging::sanitize(&body)
            );
        }

        Err(err)
    }

    /// Global reaction to a 401: drop local credentials, then tell subscribers.
    fn handle_unauthorized(&self, path: &str) {
        if let Err(e) = self.tokens.clear() {
            error!("Failed to clear stored tokens after 401: {}", e);
        }
        self.session.expired(path);
    }

    /// Send a request and decode the JSON response body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &Query<'_>,
    ) -> Result<T> {
        let response = self.request(method, path, body, query).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            debug!(
                "Undecodable response from {} (first 200 chars): {}",
                path,
                text.chars().take(200).collect::<String>()
            );
            ApiError::Decode(format!("{}: {}", path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T> {
        self.request_json(Method::GET, path, None, query).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request_json(Method::POST, path, Some(body), &[]).await
    }

    /// POST whose response body is irrelevant.
    pub async fn post_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body), &[]).await?;
        Ok(())
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request_json(Method::PATCH, path, Some(body), &[]).await
    }

    /// Body-less PATCH used for action endpoints (`mark_read` and friends).
    pub async fn patch_empty(&self, path: &str) -> Result<()> {
        self.request(Method::PATCH, path, None, &[]).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None, &[]).await?;
        Ok(())
    }

    /// GET a binary payload (CSV export and similar downloads).
    pub async fn get_bytes(&self, path: &str, query: &Query<'_>) -> Result<Bytes> {
        let response = self.request(Method::GET, path, None, query).await?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to read download body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        };
        ApiClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let c = client("http://localhost:8001/api/");
        assert_eq!(c.base_url(), "http://localhost:8001/api");
        assert_eq!(c.url("/budgets/"), "http://localhost:8001/api/budgets/");
        assert_eq!(c.url("budgets/3/"), "http://localhost:8001/api/budgets/3/");
    }

    #[test]
    fn test_initial_session_follows_store() {
        let c = client("http://localhost:8001/api");
        assert_eq!(c.session().state(), SessionState::Anonymous);

        let store = Arc::new(MemoryTokenStore::with_tokens(
            &crate::storage::AuthTokens::new("a", "r"),
        ));
        let c = ApiClient::new(&ApiConfig::default(), store).unwrap();
        assert_eq!(c.session().state(), SessionState::Authenticated);
    }
}
