//! Anti-forgery token type.

use std::fmt;

/// A session-bound anti-forgery token issued by the service.
///
/// The service hands it out in the `X-CSRF-Token` response header when asked
/// with `X-CSRF-Token: Fetch`, and expects it back on every state-mutating
/// request together with the session cookies it was issued with.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in request headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP request headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"[REDACTED]").finish()
    }
}
