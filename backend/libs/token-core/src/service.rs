//! Token issuance, verification, rotation, and revocation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::claims::{Claims, Role, TokenPair, TokenType};
use crate::codec::TokenCodec;
use crate::error::TokenError;
use crate::revocation::RevocationStore;

/// Configured token lifetimes. Access lifetime must be much shorter than
/// refresh lifetime; access tokens expire on their own and are not
/// individually revocable in normal operation.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(30),
        }
    }
}

/// Single source of truth for token trust decisions, consumed by both the
/// HTTP gateway and the gRPC validation endpoint. Stateless per call except
/// for round trips to the revocation store.
pub struct TokenService {
    codec: TokenCodec,
    store: Arc<dyn RevocationStore>,
    lifetimes: TokenLifetimes,
}

impl TokenService {
    pub fn new(
        codec: TokenCodec,
        store: Arc<dyn RevocationStore>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            codec,
            store,
            lifetimes,
        }
    }

    /// Issue a fresh access + refresh pair for a subject. Each token gets
    /// its own `jti`; the role is snapshotted into the claims.
    pub fn issue(&self, subject_id: Uuid, role: Role) -> Result<TokenPair, TokenError> {
        let now = Utc::now();

        let access = Claims {
            sub: subject_id,
            role,
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.lifetimes.access).timestamp(),
        };
        let refresh = Claims {
            sub: subject_id,
            role,
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.lifetimes.refresh).timestamp(),
        };

        let pair = TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.lifetimes.access.num_seconds(),
        };

        info!(subject_id = %subject_id, %role, "issued token pair");
        Ok(pair)
    }

    /// Verify a token against policy: signature, type, expiry, revocation.
    ///
    /// Any failing check rejects. The signature is checked first so garbage
    /// input never costs a store lookup. The expiry boundary is hard:
    /// `now >= exp` is expired.
    pub async fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.codec.decode(token)?;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if self.store.is_revoked(claims.jti).await? {
            return Err(TokenError::Revoked);
        }

        Ok(claims)
    }

    /// Rotate a refresh token: revoke the old one, issue a new pair.
    ///
    /// The revocation insert is a check-and-set against the store, so two
    /// concurrent rotations of the same refresh token observe exactly one
    /// winner; the loser fails with `Revoked`. The insert is never rolled
    /// back if the caller aborts afterwards — erring toward rejection is the
    /// safe side.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token, TokenType::Refresh).await?;

        let won = self
            .store
            .insert_if_absent(claims.jti, remaining_ttl_secs(claims.exp))
            .await?;
        if !won {
            debug!(jti = %claims.jti, "refresh rotation lost the revocation race");
            return Err(TokenError::Revoked);
        }

        info!(subject_id = %claims.sub, old_jti = %claims.jti, "refresh token rotated");
        self.issue(claims.sub, claims.role)
    }

    /// Unconditional revocation, used for explicit logout.
    pub async fn revoke(&self, token_id: Uuid, ttl_secs: u64) -> Result<(), TokenError> {
        self.store.insert_if_absent(token_id, ttl_secs).await?;
        info!(jti = %token_id, ttl_secs, "token revoked");
        Ok(())
    }
}

/// Seconds until `exp`, floored at 1 so a revocation entry always outlives
/// the token it covers.
pub fn remaining_ttl_secs(exp: i64) -> u64 {
    (exp - Utc::now().timestamp()).max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryRevocationStore, UnavailableRevocationStore};

    const TEST_SECRET: &str = "service-test-signing-secret-0123456789abcdef";

    fn service_with(store: Arc<dyn RevocationStore>, lifetimes: TokenLifetimes) -> TokenService {
        TokenService::new(TokenCodec::new(TEST_SECRET).unwrap(), store, lifetimes)
    }

    fn default_service() -> TokenService {
        service_with(
            Arc::new(InMemoryRevocationStore::new()),
            TokenLifetimes::default(),
        )
    }

    #[tokio::test]
    async fn issue_then_verify_round_trips_subject_and_role() {
        let service = default_service();
        let subject = Uuid::new_v4();

        let pair = service.issue(subject, Role::Admin).unwrap();
        let claims = service
            .verify(&pair.access_token, TokenType::Access)
            .await
            .unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn wrong_type_rejected_both_ways() {
        let service = default_service();
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

        assert!(matches!(
            service.verify(&pair.access_token, TokenType::Refresh).await,
            Err(TokenError::WrongType { .. })
        ));
        match service.verify(&pair.refresh_token, TokenType::Access).await {
            Err(TokenError::WrongType { expected, actual }) => {
                assert_eq!(expected, TokenType::Access);
                assert_eq!(actual, TokenType::Refresh);
            }
            other => panic!("expected WrongType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_lifetime_token_is_expired_at_the_boundary() {
        // exp == iat == now, and `now >= exp` must reject.
        let service = service_with(
            Arc::new(InMemoryRevocationStore::new()),
            TokenLifetimes {
                access: Duration::seconds(0),
                refresh: Duration::seconds(0),
            },
        );
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

        assert!(matches!(
            service.verify(&pair.access_token, TokenType::Access).await,
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            service.verify(&pair.refresh_token, TokenType::Refresh).await,
            Err(TokenError::Expired)
        ));
    }

    #[tokio::test]
    async fn token_valid_strictly_before_expiry() {
        let service = service_with(
            Arc::new(InMemoryRevocationStore::new()),
            TokenLifetimes {
                access: Duration::seconds(60),
                refresh: Duration::seconds(120),
            },
        );
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(service
            .verify(&pair.access_token, TokenType::Access)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn rotation_revokes_the_old_refresh_token() {
        let service = default_service();
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

        let rotated = service.rotate(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // Second rotation of the original token loses to the revocation.
        assert!(matches!(
            service.rotate(&pair.refresh_token).await,
            Err(TokenError::Revoked)
        ));
        // Plain verification of the original refresh token also fails.
        assert!(matches!(
            service
                .verify(&pair.refresh_token, TokenType::Refresh)
                .await,
            Err(TokenError::Revoked)
        ));
        // The new pair stays usable.
        assert!(service
            .verify(&rotated.access_token, TokenType::Access)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn explicit_revoke_rejects_subsequent_verification() {
        let service = default_service();
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();
        let claims = service
            .verify(&pair.refresh_token, TokenType::Refresh)
            .await
            .unwrap();

        service
            .revoke(claims.jti, remaining_ttl_secs(claims.exp))
            .await
            .unwrap();

        assert!(matches!(
            service
                .verify(&pair.refresh_token, TokenType::Refresh)
                .await,
            Err(TokenError::Revoked)
        ));
    }

    #[tokio::test]
    async fn tampered_token_never_verifies() {
        let service = default_service();
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

        let mut bytes = pair.access_token.clone().into_bytes();
        let last = bytes.last_mut().unwrap();
        *last = if *last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            service.verify(&tampered, TokenType::Access).await,
            Err(TokenError::InvalidSignature) | Err(TokenError::Malformed)
        ));
    }

    #[tokio::test]
    async fn store_outage_is_not_a_verdict() {
        let service = service_with(
            Arc::new(UnavailableRevocationStore),
            TokenLifetimes::default(),
        );
        let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

        assert!(matches!(
            service.verify(&pair.access_token, TokenType::Access).await,
            Err(TokenError::StoreUnavailable(_))
        ));
        assert!(matches!(
            service.rotate(&pair.refresh_token).await,
            Err(TokenError::StoreUnavailable(_))
        ));
    }
}
