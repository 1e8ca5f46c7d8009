// In-memory token storage for tests and throwaway sessions
// Author: kelexine (https://github.com/kelexine)

use super::{AuthTokens, StoredTokens, TokenStore};
use crate::error::Result;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pair already present, as if restored from a previous run.
    pub fn with_tokens(tokens: &AuthTokens) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens::from(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh_token.clone()
    }

    fn store(&self, tokens: &AuthTokens) -> Result<()> {
        *self.tokens.write() = StoredTokens::from(tokens);
        Ok(())
    }

    fn store_access(&self, access: &str) -> Result<()> {
        self.tokens.write().access_token = Some(access.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.tokens.write() = StoredTokens::default();
        Ok(())
    }
}
