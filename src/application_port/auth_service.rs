use super::token_codec::TokenError;
use crate::domain_model::UserId;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing or malformed authorization header")]
    Unauthenticated,
    #[error("token invalid: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("token not recognized")]
    TokenNotRecognized,
    #[error("token belongs to another subject")]
    Forbidden,
    #[error("token creation failed: {0}")]
    TokenCreationFailed(String),
    #[error("rotation failed: {0}")]
    RotationFailed(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub username: String,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: u64,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Check stored credentials and open a session for the matching user.
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Create `username` with `password` if no user exists yet.
    async fn seed_user(&self, username: &str, password: &str) -> Result<Option<UserId>, AuthError>;
}
