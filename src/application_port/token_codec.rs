use crate::domain_model::*;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Verification failures. Callers reject on any of them; the variants exist
/// for logs only and must not reach a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token malformed: {0}")]
    Malformed(String),
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short label used as a structured log field.
    pub fn label(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Signing(_) => "signing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    /// Sign a fresh token of `kind` for `subject`, valid for `ttl`.
    async fn issue(
        &self,
        kind: TokenKind,
        subject: UserId,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError>;

    /// Check signature, structure, kind and expiry, and rebuild the claims.
    async fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenError>;
}
