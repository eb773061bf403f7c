use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::future::Future;
use std::time::Duration;

const VALID_MARKER: &str = "valid";

fn token_key(prefix: &str, subject: UserId, token_id: TokenId) -> String {
    format!("{prefix}:{subject}:{token_id}")
}

fn subject_pattern(prefix: &str, subject: UserId) -> String {
    format!("{prefix}:{subject}:*")
}

/// `SET EX 0` is an error in Redis, so sub-second lifetimes round up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// The two commands bulk revocation needs.
#[async_trait::async_trait]
trait KeySpace: Send + Sync {
    /// One `SCAN` page: next cursor and matched keys.
    async fn scan_page(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), RegistryError>;

    async fn delete_key(&self, key: &str) -> Result<u64, RegistryError>;
}

/// Walk every `SCAN` page and delete each key. A failed `DEL` does not stop
/// the walk; a failed `SCAN` does, since the cursor is lost.
async fn delete_matching(
    space: &impl KeySpace,
    pattern: &str,
    count: usize,
) -> Result<u64, RegistryError> {
    let mut cursor: u64 = 0;
    let mut deleted: u64 = 0;
    let mut failed: u64 = 0;
    let mut first: Option<String> = None;

    loop {
        let (next, keys) = match space.scan_page(cursor, pattern, count).await {
            Ok(page) => page,
            Err(e) => {
                failed += 1;
                first.get_or_insert_with(|| e.to_string());
                break;
            }
        };

        for key in keys {
            match space.delete_key(&key).await {
                Ok(n) => deleted += n,
                Err(e) => {
                    warn!(%key, error = %e, "failed to revoke refresh token");
                    failed += 1;
                    first.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if next == 0 {
            break;
        }
        cursor = next;
    }

    match first {
        None => Ok(deleted),
        Some(first) => Err(RegistryError::PartialDelete {
            deleted,
            failed,
            first,
        }),
    }
}

pub struct RedisTokenRegistry {
    conn: ConnectionManager,
    prefix: String,
    op_timeout: Duration,
    scan_batch: usize,
}

impl RedisTokenRegistry {
    pub fn new(
        conn: ConnectionManager,
        prefix: impl Into<String>,
        op_timeout: Duration,
        scan_batch: usize,
    ) -> Self {
        RedisTokenRegistry {
            conn,
            prefix: prefix.into(),
            op_timeout,
            scan_batch: scan_batch.max(1),
        }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = RedisResult<T>>,
    ) -> Result<T, RegistryError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RegistryError::StoreUnavailable(format!("{op}: {e}"))),
            Err(_) => Err(RegistryError::StoreUnavailable(format!(
                "{op}: timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait::async_trait]
impl KeySpace for RedisTokenRegistry {
    async fn scan_page(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), RegistryError> {
        let mut conn = self.conn.clone();
        let mut scan = redis::cmd("SCAN");
        scan.arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count);
        let page = scan.query_async::<(u64, Vec<String>)>(&mut conn);
        self.bounded("SCAN", page).await
    }

    async fn delete_key(&self, key: &str) -> Result<u64, RegistryError> {
        let mut conn = self.conn.clone();
        let removed: i64 = self.bounded("DEL", conn.del(key)).await?;
        Ok(removed.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl TokenRegistry for RedisTokenRegistry {
    async fn put(
        &self,
        subject: UserId,
        token_id: TokenId,
        ttl: Duration,
    ) -> Result<(), RegistryError> {
        let key = token_key(&self.prefix, subject, token_id);
        let mut conn = self.conn.clone();
        let _: () = self
            .bounded("SET", conn.set_ex(&key, VALID_MARKER, ttl_secs(ttl)))
            .await?;
        Ok(())
    }

    async fn exists(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError> {
        let key = token_key(&self.prefix, subject, token_id);
        let mut conn = self.conn.clone();
        self.bounded("EXISTS", conn.exists(&key)).await
    }

    async fn delete(&self, subject: UserId, token_id: TokenId) -> Result<bool, RegistryError> {
        let key = token_key(&self.prefix, subject, token_id);
        Ok(self.delete_key(&key).await? > 0)
    }

    async fn delete_all(&self, subject: UserId) -> Result<u64, RegistryError> {
        let pattern = subject_pattern(&self.prefix, subject);
        delete_matching(self, &pattern, self.scan_batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Serves fixed `SCAN` pages keyed by cursor and records every `DEL`.
    #[derive(Default)]
    struct PagedKeys {
        pages: HashMap<u64, (u64, Vec<String>)>,
        failing_keys: HashSet<String>,
        failing_cursor: Option<u64>,
        scans: Mutex<Vec<(u64, String, usize)>>,
        deleted: Mutex<Vec<String>>,
    }

    impl PagedKeys {
        fn page(mut self, cursor: u64, next: u64, keys: &[&str]) -> Self {
            self.pages
                .insert(cursor, (next, keys.iter().map(|k| k.to_string()).collect()));
            self
        }

        fn failing_key(mut self, key: &str) -> Self {
            self.failing_keys.insert(key.to_string());
            self
        }
    }

    #[async_trait::async_trait]
    impl KeySpace for PagedKeys {
        async fn scan_page(
            &self,
            cursor: u64,
            pattern: &str,
            count: usize,
        ) -> Result<(u64, Vec<String>), RegistryError> {
            self.scans
                .lock()
                .unwrap()
                .push((cursor, pattern.to_string(), count));
            if self.failing_cursor == Some(cursor) {
                return Err(RegistryError::StoreUnavailable("SCAN: connection reset".into()));
            }
            Ok(self.pages.get(&cursor).cloned().unwrap_or((0, Vec::new())))
        }

        async fn delete_key(&self, key: &str) -> Result<u64, RegistryError> {
            if self.failing_keys.contains(key) {
                return Err(RegistryError::StoreUnavailable(format!("DEL {key}: timed out")));
            }
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(1)
        }
    }

    #[test]
    fn keys_are_namespaced_by_subject() {
        let subject = UserId::new();
        let token_id = TokenId::new();

        let key = token_key("rt", subject, token_id);
        assert_eq!(key, format!("rt:{subject}:{token_id}"));

        let pattern = subject_pattern("rt", subject);
        assert_eq!(pattern, format!("rt:{subject}:*"));
        assert!(key.starts_with(pattern.trim_end_matches('*')));
        assert!(!token_key("rt", UserId::new(), token_id).starts_with(pattern.trim_end_matches('*')));
    }

    #[test]
    fn ttl_is_at_least_one_second() {
        assert_eq!(ttl_secs(Duration::ZERO), 1);
        assert_eq!(ttl_secs(Duration::from_millis(400)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(900)), 900);
        assert_eq!(ttl_secs(Duration::from_millis(1_900)), 1);
    }

    #[tokio::test]
    async fn bulk_delete_follows_cursor_across_pages() {
        let space = PagedKeys::default()
            .page(0, 17, &["rt:u:1", "rt:u:2"])
            .page(17, 42, &[])
            .page(42, 0, &["rt:u:3"]);

        let deleted = delete_matching(&space, "rt:u:*", 2).await.unwrap();

        assert_eq!(deleted, 3);
        let scans = space.scans.lock().unwrap().clone();
        let cursors: Vec<u64> = scans.iter().map(|(c, _, _)| *c).collect();
        assert_eq!(cursors, vec![0, 17, 42]);
        assert!(scans.iter().all(|(_, p, n)| p == "rt:u:*" && *n == 2));
    }

    #[tokio::test]
    async fn bulk_delete_continues_past_failed_key() {
        let space = PagedKeys::default()
            .page(0, 5, &["rt:u:1", "rt:u:2", "rt:u:3"])
            .page(5, 0, &["rt:u:4"])
            .failing_key("rt:u:2");

        let err = delete_matching(&space, "rt:u:*", 100).await.unwrap_err();

        match err {
            RegistryError::PartialDelete {
                deleted,
                failed,
                first,
            } => {
                assert_eq!(deleted, 3);
                assert_eq!(failed, 1);
                assert!(first.contains("rt:u:2"), "{first}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            *space.deleted.lock().unwrap(),
            vec!["rt:u:1", "rt:u:3", "rt:u:4"]
        );
    }

    #[tokio::test]
    async fn first_failure_is_reported() {
        let space = PagedKeys::default()
            .page(0, 0, &["rt:u:1", "rt:u:2"])
            .failing_key("rt:u:1")
            .failing_key("rt:u:2");

        let err = delete_matching(&space, "rt:u:*", 100).await.unwrap_err();
        match err {
            RegistryError::PartialDelete {
                deleted,
                failed,
                first,
            } => {
                assert_eq!((deleted, failed), (0, 2));
                assert!(first.contains("rt:u:1"), "{first}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn lost_cursor_stops_the_walk() {
        let space = PagedKeys {
            failing_cursor: Some(9),
            ..Default::default()
        }
        .page(0, 9, &["rt:u:1"]);

        let err = delete_matching(&space, "rt:u:*", 100).await.unwrap_err();
        match err {
            RegistryError::PartialDelete {
                deleted,
                failed,
                first,
            } => {
                assert_eq!((deleted, failed), (1, 1));
                assert!(first.contains("SCAN"), "{first}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_matches_deletes_nothing() {
        let space = PagedKeys::default();
        assert_eq!(delete_matching(&space, "rt:u:*", 100).await.unwrap(), 0);
        assert!(space.deleted.lock().unwrap().is_empty());
    }
}
