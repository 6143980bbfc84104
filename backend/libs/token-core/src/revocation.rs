//! Revocation cache backing the token lifecycle.
//!
//! This is the only shared mutable resource in the subsystem. Everything the
//! core needs from the backing store is two operations: a conditional write
//! and an existence check. Rotation's single-winner guarantee rides entirely
//! on `insert_if_absent` being atomic in the store (`SET NX` in Redis), not
//! on any in-process lock, because rotation may be served by multiple
//! independent processes.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::error::TokenError;

/// Key format: `arclight:revoked:jti:{jti}`. The value is an ignorable
/// marker; presence means revoked. Entries carry a TTL equal to the token's
/// remaining lifetime so the cache self-prunes with no sweep job.
const REVOKED_KEY_PREFIX: &str = "arclight:revoked:jti:";

#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Conditional write: record `token_id` as revoked for `ttl_secs`.
    /// Returns `Ok(true)` iff this call created the entry, `Ok(false)` if it
    /// was already present. Store failures surface as
    /// [`TokenError::StoreUnavailable`], never as a verdict.
    async fn insert_if_absent(&self, token_id: Uuid, ttl_secs: u64) -> Result<bool, TokenError>;

    /// Existence check. Absence means "not revoked".
    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenError>;
}

/// Redis-backed revocation store shared by every process that validates
/// tokens.
#[derive(Clone)]
pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token_id: Uuid) -> String {
        format!("{REVOKED_KEY_PREFIX}{token_id}")
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn insert_if_absent(&self, token_id: Uuid, ttl_secs: u64) -> Result<bool, TokenError> {
        // SET .. NX EX replies OK when the key was created, nil when it
        // already existed. A zero TTL is invalid in Redis; clamp up so an
        // about-to-expire token still gets a revocation entry.
        let ttl_secs = ttl_secs.max(1);
        let mut conn = self.redis.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(token_id))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, TokenError> {
        let mut conn = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(Self::key(token_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))?;

        Ok(exists)
    }
}
