use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    StoreUnavailable(String),
    /// Bulk revocation kept going past failures; `first` is the first one seen.
    #[error("bulk delete incomplete: {deleted} deleted, {failed} failed, first error: {first}")]
    PartialDelete {
        deleted: u64,
        failed: u64,
        first: String,
    },
}

/// Server-side record of which refresh-token ids may still be redeemed.
///
/// An entry for `(subject, token_id)` exists iff that refresh token is still
/// eligible. Expiry is enforced by the store itself.
#[async_trait::async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Create or overwrite the entry with a fresh expiry.
    async fn put(&self, subject: UserId, token_id: TokenId, ttl: Duration)
    -> Result<(), RegistryError>;

    async fn exists(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError>;

    /// Remove one entry. Returns whether an entry was actually present.
    async fn delete(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError>;

    /// Remove every entry of `subject`, returning how many were removed.
    async fn delete_all(&self, subject: UserId) -> Result<u64, RegistryError>;
}
