//! In-memory user store using a Tokio mutex, for tests and single-node
//! development runs.

use super::user::{StoreError, TokenFields, UserField, UserRecord, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct InnerState {
    /// Records keyed by user id
    users: HashMap<String, UserRecord>,
    /// User ids in insertion order, for stable listing
    order: Vec<String>,
}

/// In-memory user store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.state.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count_by_field(&self, field: UserField, value: &str) -> Result<u64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|user| field.value_of(user) == value)
            .count() as u64)
    }

    async fn find_by_field(&self, field: UserField, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.lock().await;
        if field == UserField::UserId {
            return Ok(state.users.get(value).cloned());
        }
        Ok(state
            .users
            .values()
            .find(|user| field.value_of(user) == value)
            .cloned())
    }

    async fn insert_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        // Checked under the same lock as the insert, so concurrent
        // signups cannot both pass
        for field in [UserField::UserId, UserField::Email, UserField::Phone] {
            let wanted = field.value_of(record);
            if state.users.values().any(|user| field.value_of(user) == wanted) {
                return Err(StoreError::Duplicate(field));
            }
        }

        state.order.push(record.user_id.clone());
        state.users.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn upsert_token_fields(&self, user_id: &str, fields: &TokenFields) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.token = Some(fields.access_token.clone());
                user.refresh_token = Some(fields.refresh_token.clone());
                user.updated_at = fields.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<(Vec<UserRecord>, u64), StoreError> {
        let state = self.state.lock().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let page = state
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| state.users.get(id).cloned())
            .collect();

        Ok((page, state.users.len() as u64))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, email: &str, phone: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            user_id: id.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: "$2b$04$hash".into(),
            user_type: "USER".into(),
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryUserStore::new();
        store.insert_user(&record("u1", "a@x.com", "5550100")).await.unwrap();

        let by_email = store.find_by_field(UserField::Email, "a@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().user_id, "u1");

        let by_id = store.find_by_field(UserField::UserId, "u1").await.unwrap();
        assert!(by_id.is_some());

        assert!(store.find_by_field(UserField::Phone, "000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.insert_user(&record("u1", "a@x.com", "5550100")).await.unwrap();

        let result = store.insert_user(&record("u2", "a@x.com", "5550199")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(UserField::Email))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let store = MemoryUserStore::new();
        store.insert_user(&record("u1", "a@x.com", "5550100")).await.unwrap();

        let result = store.insert_user(&record("u2", "b@x.com", "5550100")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(UserField::Phone))));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_one() {
        let store = MemoryUserStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_user(&record(&format!("u{}", i), "same@x.com", &format!("55501{:02}", i)))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.count_by_field(UserField::Email, "same@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_token_fields() {
        let store = MemoryUserStore::new();
        store.insert_user(&record("u1", "a@x.com", "5550100")).await.unwrap();

        let fields = TokenFields {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            updated_at: Utc::now(),
        };
        assert!(store.upsert_token_fields("u1", &fields).await.unwrap());
        // Same write twice leaves the same state
        assert!(store.upsert_token_fields("u1", &fields).await.unwrap());

        let user = store.find_by_field(UserField::UserId, "u1").await.unwrap().unwrap();
        assert_eq!(user.token.as_deref(), Some("access"));
        assert_eq!(user.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(user.updated_at, fields.updated_at);

        assert!(!store.upsert_token_fields("ghost", &fields).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_users_pages_in_insertion_order() {
        let store = MemoryUserStore::new();
        for i in 0..5 {
            store
                .insert_user(&record(&format!("u{}", i), &format!("{}@x.com", i), &format!("555010{}", i)))
                .await
                .unwrap();
        }

        let (page, total) = store.list_users(2, 2).await.unwrap();
        assert_eq!(total, 5);
        let ids: Vec<_> = page.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3"]);

        let (past_end, _) = store.list_users(10, 2).await.unwrap();
        assert!(past_end.is_empty());
    }
}
