//! Cached anti-forgery credential shared by all callers of one client.

use std::future::Future;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::FetchError;
use crate::tokens::CsrfToken;
use crate::types::Cookie;

/// An anti-forgery token together with the session cookies it was issued with.
///
/// The two only make sense as a pair, so they are always read and replaced
/// together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfCredential {
    token: Option<CsrfToken>,
    cookies: Vec<Cookie>,
}

impl CsrfCredential {
    pub fn new(token: CsrfToken, cookies: Vec<Cookie>) -> Self {
        Self {
            token: Some(token),
            cookies,
        }
    }

    /// Returns the cached token, if one has been fetched.
    pub fn token(&self) -> Option<&CsrfToken> {
        self.token.as_ref()
    }

    /// Returns the session cookies captured alongside the token.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }
}

/// Lock-guarded cache of the current [`CsrfCredential`].
///
/// Created empty; mutated only by [`SessionState::refresh`].
///
/// # Thread Safety
///
/// Readers always observe a complete credential, either the one before or
/// the one after a refresh. A refresh holds the write lock for the whole
/// fetch-and-store sequence, including the network round trip, so concurrent
/// refreshes run one after another and each performs its own fetch.
#[derive(Debug, Default)]
pub struct SessionState {
    credential: RwLock<CsrfCredential>,
}

impl SessionState {
    /// Create an empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session state seeded with a known credential.
    pub fn with_credential(credential: CsrfCredential) -> Self {
        Self {
            credential: RwLock::new(credential),
        }
    }

    /// Returns a snapshot of the current credential.
    ///
    /// Waits only while a refresh is storing a new credential.
    pub async fn current(&self) -> CsrfCredential {
        self.credential.read().await.clone()
    }

    /// Replace the credential with a freshly fetched one.
    ///
    /// The write lock is held while `fetcher` runs. On failure the previous
    /// credential is kept and the error is returned. On success the stored
    /// credential is returned, so the caller retries with exactly what it
    /// fetched.
    pub async fn refresh<F, Fut>(&self, fetcher: F) -> Result<CsrfCredential, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CsrfCredential, FetchError>>,
    {
        let mut guard = self.credential.write().await;
        let fresh = fetcher().await?;
        *guard = fresh.clone();
        debug!(cookies = fresh.cookies.len(), "Stored refreshed credential");
        Ok(fresh)
    }
}
