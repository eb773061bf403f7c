use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_postgres::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{self, Settings};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub session_manager: Arc<dyn SessionManager>,
    pub access_guard: Arc<AccessGuard>,
    pub category_service: Arc<dyn CategoryService>,
    pub book_service: Arc<dyn BookService>,
    pool: Option<PgPool>,
}

struct Repos {
    auth_repo: Arc<dyn AuthRepo>,
    category_repo: Arc<dyn CategoryRepo>,
    book_repo: Arc<dyn BookRepo>,
    pool: Option<PgPool>,
}

/// Upper bound for any configured token lifetime.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn ttl_from_secs(name: &str, secs: u64) -> anyhow::Result<Duration> {
    if secs == 0 || secs > MAX_TTL_SECS {
        return Err(anyhow::anyhow!(
            "auth.{} must be between 1 and {} seconds, got {}",
            name,
            MAX_TTL_SECS,
            secs
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn auth_configs(auth: &settings::Auth) -> anyhow::Result<(JwtConfig, SessionConfig)> {
    if auth.jwt_secret.is_empty() {
        return Err(anyhow::anyhow!("auth.jwt_secret must not be empty"));
    }
    if auth.leeway_secs > MAX_TTL_SECS {
        return Err(anyhow::anyhow!("auth.leeway_secs is out of range: {}", auth.leeway_secs));
    }
    let jwt_config = JwtConfig {
        signing_key: auth.jwt_secret.clone().into_bytes(),
        leeway: Duration::from_secs(auth.leeway_secs),
    };
    let session_config = SessionConfig {
        access_ttl: ttl_from_secs("access_ttl_secs", auth.access_ttl_secs)?,
        refresh_ttl: ttl_from_secs("refresh_ttl_secs", auth.refresh_ttl_secs)?,
    };
    Ok((jwt_config, session_config))
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (jwt_config, session_config) = auth_configs(&settings.auth)?;

        let repos = Self::open_repos(settings).await?;

        let registry: Arc<dyn TokenRegistry> = match settings.registry.backend.as_str() {
            "memory" => {
                warn!("refresh tokens are held in memory and lost on restart");
                Arc::new(MemoryTokenRegistry::new())
            }
            "redis" => {
                let client = redis::Client::open(settings.redis.url.as_str())?;
                let conn = client.get_connection_manager().await?;
                Arc::new(RedisTokenRegistry::new(
                    conn,
                    settings.redis.key_prefix.clone(),
                    Duration::from_millis(settings.redis.op_timeout_ms),
                    settings.redis.scan_batch,
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown registry backend: {}", other)),
        };

        let server = Self::assemble(
            jwt_config,
            session_config,
            registry,
            repos.auth_repo,
            repos.category_repo,
            repos.book_repo,
            repos.pool,
        );

        if let Some(seed) = &settings.seed {
            server
                .auth_service
                .seed_user(&seed.username, &seed.password)
                .await?;
        }

        info!("server started");
        Ok(server)
    }

    async fn open_repos(settings: &Settings) -> anyhow::Result<Repos> {
        match settings.database.backend.as_str() {
            "memory" => {
                warn!("catalog and users are held in memory and lost on restart");
                let catalog = Arc::new(MemoryCatalogRepo::new());
                Ok(Repos {
                    auth_repo: Arc::new(MemoryAuthRepo::new()),
                    category_repo: catalog.clone(),
                    book_repo: catalog,
                    pool: None,
                })
            }
            "postgres" => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.database.max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(&settings.database.url)
                    .await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                info!("database migrations applied");

                Ok(Repos {
                    auth_repo: Arc::new(PgAuthRepo::new(pool.clone())),
                    category_repo: Arc::new(PgCategoryRepo::new(pool.clone())),
                    book_repo: Arc::new(PgBookRepo::new(pool.clone())),
                    pool: Some(pool),
                })
            }
            other => Err(anyhow::anyhow!("Unknown database backend: {}", other)),
        }
    }

    /// Wire services over already-opened stores.
    pub fn assemble(
        jwt_config: JwtConfig,
        session_config: SessionConfig,
        registry: Arc<dyn TokenRegistry>,
        auth_repo: Arc<dyn AuthRepo>,
        category_repo: Arc<dyn CategoryRepo>,
        book_repo: Arc<dyn BookRepo>,
        pool: Option<PgPool>,
    ) -> Self {
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(jwt_config));
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let session_manager: Arc<dyn SessionManager> = Arc::new(RealSessionManager::new(
            token_codec.clone(),
            registry,
            session_config,
        ));
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            auth_repo,
            credential_hasher,
            session_manager.clone(),
        ));
        let access_guard = Arc::new(AccessGuard::new(token_codec));
        let category_service: Arc<dyn CategoryService> = Arc::new(RealCategoryService::new(
            category_repo,
            book_repo.clone(),
        ));
        let book_service: Arc<dyn BookService> = Arc::new(RealBookService::new(book_repo));

        Self {
            auth_service,
            session_manager,
            access_guard,
            category_service,
            book_service,
            pool,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("database pool closed");
        }
    }
}
