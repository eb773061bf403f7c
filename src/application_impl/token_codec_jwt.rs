use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct JwtConfig {
    pub signing_key: Vec<u8>,
    /// Clock-skew tolerance applied to `exp`.
    pub leeway: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &"<redacted>")
            .field("leeway", &self.leeway)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id as string
    jti: String,
    iat: i64,
    exp: i64,
}

fn to_datetime(ts: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| TokenError::Malformed(format!("timestamp out of range: {ts}")))
}

fn encode_claims(
    kind: TokenKind,
    subject: UserId,
    ttl: Duration,
    now: DateTime<Utc>,
    cfg: &JwtConfig,
) -> Result<IssuedToken, TokenError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| TokenError::Signing(e.to_string()))?;
    let exp_dt = now
        .checked_add_signed(ttl)
        .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;
    let token_id = TokenId::new();
    let claims = Claims {
        sub: subject.to_string(),
        jti: token_id.to_string(),
        iat: now.timestamp(),
        exp: exp_dt.timestamp(),
    };
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some(kind.typ().to_string());
    let token = encode(&header, &claims, &EncodingKey::from_secret(&cfg.signing_key))
        .map_err(|e| TokenError::Signing(e.to_string()))?;
    Ok(IssuedToken {
        token,
        token_id,
        expires_at: to_datetime(claims.exp)?,
    })
}

fn decode_claims(
    kind: TokenKind,
    token: &str,
    now: DateTime<Utc>,
    cfg: &JwtConfig,
) -> Result<TokenClaims, TokenError> {
    let mut v = Validation::new(Algorithm::HS256);
    // expiry is checked below against `now`
    v.validate_exp = false;
    v.leeway = 0;
    v.set_required_spec_claims(&["exp", "sub"]);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&cfg.signing_key), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            other => TokenError::Malformed(format!("{other:?}")),
        })?;

    if data.header.typ.as_deref() != Some(kind.typ()) {
        return Err(TokenError::Malformed(format!("not a {kind} token")));
    }

    let claims = data.claims;
    let leeway = cfg.leeway.as_secs() as i64;
    if claims.exp.saturating_add(leeway) <= now.timestamp() {
        return Err(TokenError::Expired);
    }

    let subject = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| TokenError::Malformed("subject is not a user id".to_string()))?;
    let token_id = claims
        .jti
        .parse::<TokenId>()
        .map_err(|_| TokenError::Malformed("jti is not a token id".to_string()))?;

    Ok(TokenClaims {
        kind,
        subject,
        token_id,
        issued_at: to_datetime(claims.iat)?,
        expires_at: to_datetime(claims.exp)?,
    })
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    pub fn issue_at(
        &self,
        kind: TokenKind,
        subject: UserId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        encode_claims(kind, subject, ttl, now, &self.cfg)
    }

    pub fn verify_at(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        decode_claims(kind, token, now, &self.cfg)
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue(
        &self,
        kind: TokenKind,
        subject: UserId,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(kind, subject, ttl, Utc::now())
    }

    async fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(kind, token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(key: &[u8]) -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            signing_key: key.to_vec(),
            leeway: Duration::ZERO,
        })
    }

    const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);

    #[tokio::test]
    async fn issued_token_verifies_with_same_subject() {
        let codec = codec(b"unit-test-secret");
        let user = UserId::new();
        let before = Utc::now();

        let issued = codec
            .issue(TokenKind::Access, user, FIFTEEN_MINUTES)
            .await
            .unwrap();
        let claims = codec.verify(TokenKind::Access, &issued.token).await.unwrap();

        assert_eq!(claims.subject, user);
        assert_eq!(claims.token_id, issued.token_id);
        assert_eq!(claims.kind, TokenKind::Access);
        let expected = (before + chrono::Duration::seconds(15 * 60)).timestamp();
        assert!((claims.expires_at.timestamp() - expected).abs() <= 1);
    }

    #[test]
    fn token_ids_are_unique() {
        let codec = codec(b"unit-test-secret");
        let user = UserId::new();
        let now = Utc::now();
        let a = codec
            .issue_at(TokenKind::Refresh, user, FIFTEEN_MINUTES, now)
            .unwrap();
        let b = codec
            .issue_at(TokenKind::Refresh, user, FIFTEEN_MINUTES, now)
            .unwrap();
        assert_ne!(a.token_id, b.token_id);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn oversized_ttl_is_a_signing_error() {
        let codec = codec(b"unit-test-secret");
        let result = codec.issue_at(
            TokenKind::Refresh,
            UserId::new(),
            Duration::from_secs(10_000_000_000_000),
            Utc::now(),
        );
        assert!(matches!(result, Err(TokenError::Signing(_))));

        let result = codec.issue_at(TokenKind::Access, UserId::new(), Duration::MAX, Utc::now());
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn expired_after_ttl() {
        let codec = codec(b"unit-test-secret");
        let issued_at = Utc::now();
        let issued = codec
            .issue_at(TokenKind::Access, UserId::new(), FIFTEEN_MINUTES, issued_at)
            .unwrap();

        let just_before = issued_at + chrono::Duration::seconds(15 * 60 - 1);
        assert!(codec.verify_at(TokenKind::Access, &issued.token, just_before).is_ok());

        let after = issued_at + chrono::Duration::seconds(15 * 60 + 1);
        assert_eq!(
            codec.verify_at(TokenKind::Access, &issued.token, after),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn leeway_extends_validity() {
        let codec = JwtHs256Codec::new(JwtConfig {
            signing_key: b"unit-test-secret".to_vec(),
            leeway: Duration::from_secs(30),
        });
        let issued_at = Utc::now();
        let issued = codec
            .issue_at(TokenKind::Access, UserId::new(), FIFTEEN_MINUTES, issued_at)
            .unwrap();

        let skewed = issued_at + chrono::Duration::seconds(15 * 60 + 10);
        assert!(codec.verify_at(TokenKind::Access, &issued.token, skewed).is_ok());
        let late = issued_at + chrono::Duration::seconds(15 * 60 + 31);
        assert_eq!(
            codec.verify_at(TokenKind::Access, &issued.token, late),
            Err(TokenError::Expired)
        );
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_signature() {
        let issued = codec(b"secret-one")
            .issue(TokenKind::Access, UserId::new(), FIFTEEN_MINUTES)
            .await
            .unwrap();
        let err = codec(b"secret-two")
            .verify(TokenKind::Access, &issued.token)
            .await
            .unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected() {
        let codec = codec(b"unit-test-secret");
        let issued = codec
            .issue(TokenKind::Access, UserId::new(), FIFTEEN_MINUTES)
            .await
            .unwrap();
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let other = codec
            .issue(TokenKind::Access, UserId::new(), FIFTEEN_MINUTES)
            .await
            .unwrap();
        parts[1] = other.token.split('.').nth(1).unwrap().to_string();

        let err = codec
            .verify(TokenKind::Access, &parts.join("."))
            .await
            .unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let codec = codec(b"unit-test-secret");
        for token in ["", "not-a-jwt", "a.b.c"] {
            let err = codec.verify(TokenKind::Access, token).await.unwrap_err();
            assert!(matches!(err, TokenError::Malformed(_)), "{token}: {err:?}");
        }
    }

    #[tokio::test]
    async fn kinds_are_not_interchangeable() {
        let codec = codec(b"unit-test-secret");
        let refresh = codec
            .issue(TokenKind::Refresh, UserId::new(), FIFTEEN_MINUTES)
            .await
            .unwrap();

        let err = codec
            .verify(TokenKind::Access, &refresh.token)
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
        assert!(codec.verify(TokenKind::Refresh, &refresh.token).await.is_ok());
    }
}
