use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Process-local registry. Entries expire lazily on access.
#[derive(Default)]
pub struct MemoryTokenRegistry {
    entries: DashMap<(UserId, TokenId), Instant>,
}

impl MemoryTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired entries across all subjects.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| *e.value() > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl TokenRegistry for MemoryTokenRegistry {
    async fn put(
        &self,
        subject: UserId,
        token_id: TokenId,
        ttl: Duration,
    ) -> Result<(), RegistryError> {
        self.entries
            .insert((subject, token_id), Instant::now() + ttl);
        Ok(())
    }

    async fn exists(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError> {
        let key = (subject, token_id);
        let live = match self.entries.get(&key) {
            Some(expires_at) => *expires_at > Instant::now(),
            None => return Ok(false),
        };
        if !live {
            self.entries.remove(&key);
        }
        Ok(live)
    }

    async fn delete(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(&(subject, token_id))
            .is_some_and(|(_, expires_at)| expires_at > now))
    }

    async fn delete_all(&self, subject: UserId) -> Result<u64, RegistryError> {
        let now = Instant::now();
        let mut deleted = 0;
        self.entries.retain(|(owner, _), expires_at| {
            if *owner != subject {
                return true;
            }
            if *expires_at > now {
                deleted += 1;
            }
            false
        });
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn put_then_exists() {
        let registry = MemoryTokenRegistry::new();
        let (user, jti) = (UserId::new(), TokenId::new());

        assert!(!registry.exists(user, jti).await.unwrap());
        registry.put(user, jti, HOUR).await.unwrap();
        assert!(registry.exists(user, jti).await.unwrap());
        assert!(!registry.exists(UserId::new(), jti).await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_whether_entry_was_present() {
        let registry = MemoryTokenRegistry::new();
        let (user, jti) = (UserId::new(), TokenId::new());
        registry.put(user, jti, HOUR).await.unwrap();

        assert!(registry.delete(user, jti).await.unwrap());
        assert!(!registry.delete(user, jti).await.unwrap());
        assert!(!registry.exists(user, jti).await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire() {
        let registry = MemoryTokenRegistry::new();
        let (user, jti) = (UserId::new(), TokenId::new());
        registry
            .put(user, jti, Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!registry.exists(user, jti).await.unwrap());
        assert!(!registry.delete(user, jti).await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites_expiry() {
        let registry = MemoryTokenRegistry::new();
        let (user, jti) = (UserId::new(), TokenId::new());
        registry
            .put(user, jti, Duration::from_millis(20))
            .await
            .unwrap();
        registry.put(user, jti, HOUR).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(registry.exists(user, jti).await.unwrap());
    }

    #[tokio::test]
    async fn delete_all_only_touches_one_subject() {
        let registry = MemoryTokenRegistry::new();
        let (alice, bob) = (UserId::new(), UserId::new());
        for _ in 0..3 {
            registry.put(alice, TokenId::new(), HOUR).await.unwrap();
        }
        let bobs = TokenId::new();
        registry.put(bob, bobs, HOUR).await.unwrap();

        assert_eq!(registry.delete_all(alice).await.unwrap(), 3);
        assert_eq!(registry.delete_all(alice).await.unwrap(), 0);
        assert!(registry.exists(bob, bobs).await.unwrap());
        assert_eq!(registry.len(), 1);
    }
}
