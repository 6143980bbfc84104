//! Test doubles for the revocation store.
//!
//! The in-memory store lets the whole token lifecycle run in unit and
//! integration tests (and local development) without a Redis instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TokenError;
use crate::revocation::RevocationStore;

/// Mutex-guarded map mirroring the Redis contract: insert-if-absent with a
/// TTL, presence check that honors expiry.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: Mutex<HashMap<Uuid, Instant>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn insert_if_absent(&self, token_id: Uuid, ttl_secs: u64) -> Result<bool, TokenError> {
        let ttl_secs = ttl_secs.max(1);
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("revocation map poisoned");
        entries.retain(|_, expiry| *expiry > now);

        if entries.contains_key(&token_id) {
            return Ok(false);
        }
        entries.insert(token_id, now + Duration::from_secs(ttl_secs));
        Ok(true)
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenError> {
        let now = Instant::now();
        let entries = self.entries.lock().expect("revocation map poisoned");
        Ok(entries.get(&token_id).is_some_and(|expiry| *expiry > now))
    }
}

/// Store that fails every call, for exercising outage handling.
pub struct UnavailableRevocationStore;

#[async_trait]
impl RevocationStore for UnavailableRevocationStore {
    async fn insert_if_absent(&self, _token_id: Uuid, _ttl_secs: u64) -> Result<bool, TokenError> {
        Err(TokenError::StoreUnavailable("connection refused".into()))
    }

    async fn is_revoked(&self, _token_id: Uuid) -> Result<bool, TokenError> {
        Err(TokenError::StoreUnavailable("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_if_absent_single_winner() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();

        assert!(store.insert_if_absent(jti, 60).await.unwrap());
        assert!(!store.insert_if_absent(jti, 60).await.unwrap());
        assert!(store.is_revoked(jti).await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();

        // Insert directly with an already-elapsed expiry.
        store
            .entries
            .lock()
            .unwrap()
            .insert(jti, Instant::now() - Duration::from_secs(1));

        assert!(!store.is_revoked(jti).await.unwrap());
        // Expired entry does not block a fresh insert.
        assert!(store.insert_if_absent(jti, 60).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_is_not_revoked() {
        let store = InMemoryRevocationStore::new();
        assert!(!store.is_revoked(Uuid::new_v4()).await.unwrap());
    }
}
