//! Concurrency tests for refresh-token rotation.
//!
//! Rotation must resolve races through the store's conditional write: when
//! several workers race on one refresh token, exactly one rotation wins and
//! every other attempt fails as revoked. No interleaving may mint two live
//! pairs from one original token.

use std::sync::Arc;

use token_core::test_utils::InMemoryRevocationStore;
use token_core::{Role, TokenCodec, TokenError, TokenLifetimes, TokenService, TokenType};
use uuid::Uuid;

const TEST_SECRET: &str = "rotation-race-signing-secret-0123456789abcdef";

fn build_service() -> Arc<TokenService> {
    let codec = TokenCodec::new(TEST_SECRET).expect("codec");
    Arc::new(TokenService::new(
        codec,
        Arc::new(InMemoryRevocationStore::new()),
        TokenLifetimes::default(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotations_have_exactly_one_winner() {
    let service = build_service();
    let pair = service.issue(Uuid::new_v4(), Role::User).unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        let refresh_token = pair.refresh_token.clone();
        handles.push(tokio::spawn(
            async move { service.rotate(&refresh_token).await },
        ));
    }

    let mut winners = Vec::new();
    let mut revoked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(new_pair) => winners.push(new_pair),
            Err(TokenError::Revoked) => revoked += 1,
            Err(other) => panic!("unexpected rotation failure: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one rotation may succeed");
    assert_eq!(revoked, 15);

    // The winning pair is live; the original refresh token is dead.
    let winner = &winners[0];
    assert!(service
        .verify(&winner.access_token, TokenType::Access)
        .await
        .is_ok());
    assert!(matches!(
        service
            .verify(&pair.refresh_token, TokenType::Refresh)
            .await,
        Err(TokenError::Revoked)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rotation_chains_stay_single_use() {
    let service = build_service();
    let subject = Uuid::new_v4();
    let mut pair = service.issue(subject, Role::Admin).unwrap();

    for _ in 0..5 {
        let old_refresh = pair.refresh_token.clone();
        pair = service.rotate(&old_refresh).await.unwrap();

        assert!(matches!(
            service.rotate(&old_refresh).await,
            Err(TokenError::Revoked)
        ));
    }

    let claims = service
        .verify(&pair.access_token, TokenType::Access)
        .await
        .unwrap();
    assert_eq!(claims.sub, subject);
    assert_eq!(claims.role, Role::Admin);
}
