use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Default)]
pub struct MemoryAuthRepo {
    users: DashMap<String, AuthCredentialsRecord>,
}

impl MemoryAuthRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AuthRepo for MemoryAuthRepo {
    async fn create_credentials(
        &self,
        user_id: UserId,
        username: &str,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::InternalError(format!(
                "username already exists: {username}"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(AuthCredentialsRecord {
                    user_id,
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                });
                Ok(())
            }
        }
    }

    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthCredentialsRecord>, AuthError> {
        Ok(self.users.get(username).map(|r| r.value().clone()))
    }

    async fn count_users(&self) -> Result<i64, AuthError> {
        Ok(self.users.len() as i64)
    }
}
