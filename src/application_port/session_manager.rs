use super::auth_service::{AuthError, TokenPair};
use crate::domain_model::UserId;

/// Refresh-token lifecycle: issue, rotate, revoke.
#[async_trait::async_trait]
pub trait SessionManager: Send + Sync {
    /// Issue a new pair and register its refresh token.
    async fn login(&self, subject: UserId) -> Result<TokenPair, AuthError>;
    /// Redeem a refresh token exactly once for a new pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    /// Revoke one refresh token of `subject`, or all of them when `refresh_token` is `None`.
    /// Returns the number of registry entries removed.
    async fn logout(&self, subject: UserId, refresh_token: Option<&str>) -> Result<u64, AuthError>;
}
