use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use std::sync::Arc;

/// Request-time gate for access tokens.
///
/// Stateless: the registry is never consulted, so an access token stays valid
/// until it expires.
pub struct AccessGuard {
    token_codec: Arc<dyn TokenCodec>,
}

impl AccessGuard {
    pub fn new(token_codec: Arc<dyn TokenCodec>) -> Self {
        Self { token_codec }
    }

    /// Authorize from the raw `Authorization` header value.
    pub async fn authorize(&self, header: Option<&str>) -> Result<UserId, AuthError> {
        let token = header
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .token_codec
            .verify(TokenKind::Access, token)
            .await
            .map_err(|e| {
                debug!(reason = e.label(), "access token rejected");
                AuthError::InvalidToken(e)
            })?;
        Ok(claims.subject)
    }
}

/// Extract the credential from `Bearer <token>`, scheme case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
