use super::*;
use crate::state::test_helpers::{MemoryStore, seed_user};

// =============================================================================
// bytes_to_hex / generate_token
// =============================================================================

#[test]
fn bytes_to_hex_leading_zero_and_multi_byte() {
    assert_eq!(bytes_to_hex(&[]), "");
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionContext::resolve
// =============================================================================

#[tokio::test]
async fn resolve_without_token_is_anonymous() {
    let store = MemoryStore::new();
    let ctx = SessionContext::resolve(&store, &store, None).await.unwrap();
    assert!(!ctx.is_authenticated());
    assert!(ctx.token().is_none());

    let ctx = SessionContext::resolve(&store, &store, Some("")).await.unwrap();
    assert!(!ctx.is_authenticated());
}

#[tokio::test]
async fn resolve_unknown_token_is_anonymous() {
    let store = MemoryStore::new();
    let ctx = SessionContext::resolve(&store, &store, Some("feedface"))
        .await
        .unwrap();
    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.token(), Some("feedface"));
}

#[tokio::test]
async fn resolve_known_token_binds_user() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();
    let token = login(&store, &mut ctx, user.clone(), 24).await.unwrap();

    let resolved = SessionContext::resolve(&store, &store, Some(&token))
        .await
        .unwrap();
    assert_eq!(resolved.user().map(|u| u.id), Some(user.id));
    assert_eq!(resolved.token(), Some(token.as_str()));
}

#[tokio::test]
async fn resolve_inactive_user_is_anonymous() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();
    let token = login(&store, &mut ctx, user.clone(), 24).await.unwrap();
    store.make_inactive(user.id);

    let resolved = SessionContext::resolve(&store, &store, Some(&token))
        .await
        .unwrap();
    assert!(!resolved.is_authenticated());
    assert_eq!(resolved.token(), Some(token.as_str()));
}

#[tokio::test]
async fn logout_of_inactive_user_session_deletes_the_row() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();
    let token = login(&store, &mut ctx, user.clone(), 24).await.unwrap();
    store.make_inactive(user.id);

    let mut resolved = SessionContext::resolve(&store, &store, Some(&token))
        .await
        .unwrap();
    logout(&store, &mut resolved).await.unwrap();
    assert_eq!(store.session_count(), 0);

    // Reactivation must not revive the logged-out token.
    store.make_active(user.id);
    let revived = SessionContext::resolve(&store, &store, Some(&token))
        .await
        .unwrap();
    assert!(!revived.is_authenticated());
}

#[tokio::test]
async fn login_over_stale_token_replaces_it() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::resolve(&store, &store, Some("stale"))
        .await
        .unwrap();

    let token = login(&store, &mut ctx, user, 24).await.unwrap();

    assert_ne!(token, "stale");
    assert_eq!(ctx.token(), Some(token.as_str()));
    assert_eq!(store.session_count(), 1);
}

// =============================================================================
// login / logout
// =============================================================================

#[tokio::test]
async fn login_binds_context_and_stores_session() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();

    let token = login(&store, &mut ctx, user.clone(), 24).await.unwrap();

    assert!(ctx.is_authenticated());
    assert_eq!(ctx.token(), Some(token.as_str()));
    assert_eq!(store.session_count(), 1);
    assert_eq!(store.session_user(&token).await.unwrap(), Some(user.id));
}

#[tokio::test]
async fn login_revokes_previous_token() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();

    let first = login(&store, &mut ctx, user.clone(), 24).await.unwrap();
    let second = login(&store, &mut ctx, user, 24).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.session_count(), 1);
    assert!(store.session_user(&first).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_clears_binding_and_session_row() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();
    let token = login(&store, &mut ctx, user, 24).await.unwrap();

    logout(&store, &mut ctx).await.unwrap();

    assert!(!ctx.is_authenticated());
    assert!(ctx.token().is_none());
    assert!(store.session_user(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_twice_is_a_no_op() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "alice", "pw").await;
    let mut ctx = SessionContext::anonymous();
    login(&store, &mut ctx, user, 24).await.unwrap();

    assert!(logout(&store, &mut ctx).await.is_ok());
    assert!(logout(&store, &mut ctx).await.is_ok());
    assert!(!ctx.is_authenticated());
    assert_eq!(store.session_count(), 0);
}

#[test]
fn require_user_on_anonymous_is_unauthenticated() {
    let ctx = SessionContext::anonymous();
    assert!(matches!(ctx.require_user(), Err(AccountError::Unauthenticated)));
}
