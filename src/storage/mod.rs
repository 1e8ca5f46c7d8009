// Persistent credential storage
// Author: kelexine (https://github.com/kelexine)

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Access/refresh token pair issued by the backend on login or register.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize, Zeroize)]
#[zeroize(drop)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

// Custom Debug impl that never logs tokens
impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

impl AuthTokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Durable home of the token pair.
///
/// Both values are written together on login and removed together on logout or
/// when the backend rejects the access token. A stored access token says nothing
/// about validity; the backend is the only authority on that.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Persist a freshly issued pair, replacing whatever was stored.
    fn store(&self, tokens: &AuthTokens) -> Result<()>;

    /// Replace only the access token (after a refresh).
    fn store_access(&self, access: &str) -> Result<()>;

    /// Remove both tokens.
    fn clear(&self) -> Result<()>;

    fn has_tokens(&self) -> bool {
        self.access_token().is_some()
    }
}

/// On-disk and in-memory layout, keyed the same way the browser client keyed
/// its local storage.
#[derive(Default, Clone, Deserialize, Serialize, Zeroize)]
#[zeroize(drop)]
pub(crate) struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub(crate) fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl From<&AuthTokens> for StoredTokens {
    fn from(tokens: &AuthTokens) -> Self {
        Self {
            access_token: Some(tokens.access.clone()),
            refresh_token: Some(tokens.refresh.clone()),
        }
    }
}
