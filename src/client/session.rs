//! Session credential source for the streaming client

use async_trait::async_trait;

/// Supplies the bearer credential for brain-endpoint requests.
///
/// The client asks for the token immediately before each request; a `None`
/// answer means no session is active and the request must fail fast
/// without touching the network.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current bearer token, or `None` when unauthenticated
    async fn bearer_token(&self) -> Option<String>;
}

/// Fixed-token session, for tests and server-to-server callers
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    /// Session that always yields the given token
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Session with no credential
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
