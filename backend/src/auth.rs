use secrecy::SecretString;
use types::{AuthHeader, UserSession};

/// Supplies the header attached to every backend request.
///
/// Passed into the data source explicitly instead of being looked up from
/// ambient session state.
#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    async fn auth_header(&self) -> Option<AuthHeader>;
}

/// Sends requests without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    async fn auth_header(&self) -> Option<AuthHeader> {
        None
    }
}

/// A bearer token fixed at startup.
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl AuthProvider for StaticToken {
    async fn auth_header(&self) -> Option<AuthHeader> {
        Some(AuthHeader::bearer(self.0.clone()))
    }
}

impl AuthProvider for UserSession {
    async fn auth_header(&self) -> Option<AuthHeader> {
        Some(UserSession::auth_header(self))
    }
}

impl<A: AuthProvider> AuthProvider for Option<A> {
    async fn auth_header(&self) -> Option<AuthHeader> {
        match self {
            Some(auth) => auth.auth_header().await,
            None => None,
        }
    }
}
