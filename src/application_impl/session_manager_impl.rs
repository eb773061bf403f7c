use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

pub struct RealSessionManager {
    token_codec: Arc<dyn TokenCodec>,
    registry: Arc<dyn TokenRegistry>,
    cfg: SessionConfig,
}

impl RealSessionManager {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        registry: Arc<dyn TokenRegistry>,
        cfg: SessionConfig,
    ) -> Self {
        Self {
            token_codec,
            registry,
            cfg,
        }
    }

    async fn issue_pair(&self, subject: UserId) -> Result<TokenPair, AuthError> {
        let access = self
            .token_codec
            .issue(TokenKind::Access, subject, self.cfg.access_ttl)
            .await
            .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))?;
        let refresh = self
            .token_codec
            .issue(TokenKind::Refresh, subject, self.cfg.refresh_ttl)
            .await
            .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))?;

        self.registry
            .put(subject, refresh.token_id, self.cfg.refresh_ttl)
            .await
            .map_err(|e| {
                error!(%subject, error = %e, "failed to register refresh token");
                AuthError::TokenCreationFailed(e.to_string())
            })?;

        debug!(%subject, jti = %refresh.token_id, "refresh token registered");

        Ok(TokenPair {
            access_token: AccessToken(access.token),
            refresh_token: RefreshToken(refresh.token),
            token_type: TOKEN_TYPE,
            expires_in: self.cfg.access_ttl.as_secs(),
            refresh_expires_in: self.cfg.refresh_ttl.as_secs(),
        })
    }

    async fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.token_codec
            .verify(TokenKind::Refresh, token)
            .await
            .map_err(|e| {
                debug!(reason = e.label(), "refresh token rejected");
                AuthError::InvalidToken(e)
            })
    }
}

#[async_trait::async_trait]
impl SessionManager for RealSessionManager {
    async fn login(&self, subject: UserId) -> Result<TokenPair, AuthError> {
        let pair = self.issue_pair(subject).await?;
        info!(%subject, "session opened");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_refresh(refresh_token).await?;
        let TokenClaims {
            subject, token_id, ..
        } = claims;

        let active = self
            .registry
            .exists(subject, token_id)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        if !active {
            warn!(%subject, jti = %token_id, "refresh token not recognized");
            return Err(AuthError::TokenNotRecognized);
        }

        // Rotation: the old entry must be gone before a replacement exists.
        match self.registry.delete(subject, token_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%subject, jti = %token_id, "refresh token consumed concurrently");
                return Err(AuthError::TokenNotRecognized);
            }
            Err(e) => {
                error!(%subject, jti = %token_id, error = %e, "refresh rotation failed");
                return Err(AuthError::RotationFailed(e.to_string()));
            }
        }

        let pair = self.issue_pair(subject).await?;
        info!(%subject, consumed = %token_id, "session refreshed");
        Ok(pair)
    }

    async fn logout(&self, subject: UserId, refresh_token: Option<&str>) -> Result<u64, AuthError> {
        let Some(refresh_token) = refresh_token else {
            let revoked = self.registry.delete_all(subject).await.map_err(|e| {
                error!(%subject, error = %e, "bulk revocation incomplete");
                AuthError::StoreUnavailable(e.to_string())
            })?;
            info!(%subject, revoked, "all sessions revoked");
            return Ok(revoked);
        };

        let claims = self.verify_refresh(refresh_token).await?;
        if claims.subject != subject {
            warn!(%subject, owner = %claims.subject, "cross-subject revocation refused");
            return Err(AuthError::Forbidden);
        }

        let removed = self
            .registry
            .delete(subject, claims.token_id)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        info!(%subject, jti = %claims.token_id, removed, "session revoked");
        Ok(removed as u64)
    }
}
