//! Credential and session collaborators
//!
//! Token storage and sign-in live outside this crate; the client only asks
//! for a bearer token per call and reports when the server rejects it.

use async_trait::async_trait;

/// Source of the bearer token attached to every call
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` when signed out
    async fn bearer_token(&self) -> Option<String>;
}

/// Receives the global sign-out signal
pub trait SessionObserver: Send + Sync {
    /// Called once per rejected credential (HTTP 401)
    fn signed_out(&self, reason: &str);
}

/// Fixed token, for tools and tests
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSessionObserver;

impl SessionObserver for LogSessionObserver {
    fn signed_out(&self, reason: &str) {
        tracing::warn!(reason, "session ended by server");
    }
}
