use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use tokio::sync::OnceCell;

const DUMMY_PASSWORD: &str = "no such user";

pub struct RealAuthService {
    auth_repo: Arc<dyn AuthRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    session_manager: Arc<dyn SessionManager>,
    /// Verified against for unknown usernames so both failures cost one hash check.
    dummy_hash: OnceCell<String>,
}

impl RealAuthService {
    pub fn new(
        auth_repo: Arc<dyn AuthRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        session_manager: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            auth_repo,
            credential_hasher,
            session_manager,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn burn_verify(&self, password: &str) -> Result<(), AuthError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.credential_hasher.hash_password(DUMMY_PASSWORD))
            .await?;
        self.credential_hasher
            .verify_password(password, dummy_hash)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { username, password } = request;

        let Some(rec) = self.auth_repo.get_by_username(&username).await? else {
            debug!(%username, "login for unknown user");
            self.burn_verify(&password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            debug!(%username, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.session_manager.login(rec.user_id).await?;

        Ok(LoginResult {
            user_id: rec.user_id,
            username: rec.username,
            tokens,
        })
    }

    async fn seed_user(&self, username: &str, password: &str) -> Result<Option<UserId>, AuthError> {
        if self.auth_repo.count_users().await? > 0 {
            return Ok(None);
        }

        let user_id = UserId::new();
        let password_hash = self.credential_hasher.hash_password(password).await?;
        self.auth_repo
            .create_credentials(user_id, username, &password_hash)
            .await?;

        info!(%user_id, %username, "seed user created");
        Ok(Some(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::infra_memory::{MemoryAuthRepo, MemoryTokenRegistry};
    use std::time::Duration;

    fn service() -> (RealAuthService, Arc<MemoryAuthRepo>) {
        let repo = Arc::new(MemoryAuthRepo::new());
        let codec = Arc::new(JwtHs256Codec::new(JwtConfig {
            signing_key: b"auth-test-secret".to_vec(),
            leeway: Duration::ZERO,
        }));
        let sessions = Arc::new(RealSessionManager::new(
            codec,
            Arc::new(MemoryTokenRegistry::new()),
            SessionConfig {
                access_ttl: Duration::from_secs(60),
                refresh_ttl: Duration::from_secs(3600),
            },
        ));
        let service = RealAuthService::new(repo.clone(), Arc::new(Argon2PasswordHasher), sessions);
        (service, repo)
    }

    fn input(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn seed_then_login() {
        let (service, _) = service();
        let user_id = service.seed_user("admin", "password").await.unwrap().unwrap();

        let result = service.login(input("admin", "password")).await.unwrap();
        assert_eq!(result.user_id, user_id);
        assert_eq!(result.username, "admin");
        assert_eq!(result.tokens.expires_in, 60);
    }

    #[tokio::test]
    async fn seed_is_skipped_when_users_exist() {
        let (service, repo) = service();
        service.seed_user("admin", "password").await.unwrap();
        assert!(service.seed_user("other", "password").await.unwrap().is_none());
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let (service, _) = service();
        service.seed_user("admin", "password").await.unwrap();

        let wrong_password = service.login(input("admin", "nope")).await;
        let unknown_user = service.login(input("ghost", "password")).await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn plaintext_stored_password_never_logs_in() {
        let (service, repo) = service();
        repo.create_credentials(UserId::new(), "legacy", "password")
            .await
            .unwrap();

        let result = service.login(input("legacy", "password")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    /// Counts verifications so both failure paths can be compared.
    #[derive(Default)]
    struct CountingHasher {
        verifies: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CredentialHasher for CountingHasher {
        async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
            Argon2PasswordHasher.hash_password(password).await
        }

        async fn verify_password(
            &self,
            password: &str,
            password_hash: &str,
        ) -> Result<bool, AuthError> {
            self.verifies
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Argon2PasswordHasher
                .verify_password(password, password_hash)
                .await
        }
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_hash_check() {
        let hasher = Arc::new(CountingHasher::default());
        let codec = Arc::new(JwtHs256Codec::new(JwtConfig {
            signing_key: b"auth-test-secret".to_vec(),
            leeway: Duration::ZERO,
        }));
        let sessions = Arc::new(RealSessionManager::new(
            codec,
            Arc::new(MemoryTokenRegistry::new()),
            SessionConfig {
                access_ttl: Duration::from_secs(60),
                refresh_ttl: Duration::from_secs(3600),
            },
        ));
        let service = RealAuthService::new(Arc::new(MemoryAuthRepo::new()), hasher.clone(), sessions);
        service.seed_user("admin", "password").await.unwrap();

        let count = || hasher.verifies.load(std::sync::atomic::Ordering::SeqCst);
        let _ = service.login(input("admin", "nope")).await;
        assert_eq!(count(), 1);
        let result = service.login(input("ghost", "nope")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(count(), 2);
        let _ = service.login(input("ghost", "again")).await;
        assert_eq!(count(), 3);
    }
}
