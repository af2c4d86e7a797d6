//! Bearer token cache with single-flight acquisition

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    Unset,
    Set(String),
}

/// Cached authentication token shared by all clones of a client
///
/// The lock is held for the whole authentication exchange, so concurrent
/// callers on an unset cache wait for a single exchange and then all see
/// its token.
#[derive(Debug, Clone)]
pub struct TokenManager {
    state: Arc<Mutex<TokenState>>,
}

impl TokenManager {
    pub fn new(initial: Option<String>) -> Self {
        let state = match initial {
            Some(token) => TokenState::Set(token),
            None => TokenState::Unset,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Return the cached token, running `authenticate` first if none is cached
    pub async fn get_or_authenticate<F, Fut>(&self, authenticate: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut state = self.state.lock().await;
        if let TokenState::Set(token) = &*state {
            return Ok(token.clone());
        }

        debug!("No cached token, authenticating");
        let token = authenticate().await?;
        *state = TokenState::Set(token.clone());
        info!("Authenticated and cached token");
        Ok(token)
    }

    /// Overwrite the cached token
    pub async fn set(&self, token: String) {
        let mut state = self.state.lock().await;
        *state = TokenState::Set(token);
        info!("Token injected");
    }

    /// Cached token, without triggering authentication
    pub async fn cached(&self) -> Option<String> {
        match &*self.state.lock().await {
            TokenState::Set(token) => Some(token.clone()),
            TokenState::Unset => None,
        }
    }
}
