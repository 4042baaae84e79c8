use sqlx::PgPool;
use std::sync::Arc;
use location_share::domain::repositories::TokenRepository;
use location_share::infrastructure::persistence::PgTokenRepository;

async fn last_used_at(pool: &PgPool, id: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    sqlx::query_scalar("SELECT last_used_at FROM api_tokens WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("test-token", "hash123").await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_hash_is_conflict(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("first", "samehash").await.unwrap();
    let result = repo.create_token("second", "samehash").await;

    assert!(matches!(
        result.unwrap_err(),
        location_share::error::AppError::Conflict { .. }
    ));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_validate_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("valid-token", "validhash").await.unwrap();

    assert!(repo.validate_token("validhash").await.unwrap());
    assert!(!repo.validate_token("nonexistent").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_validate_token_revoked(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token("revoked-token", "revokedhash")
        .await
        .unwrap();
    repo.revoke_token(token.id).await.unwrap();

    assert!(!repo.validate_token("revokedhash").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    let token = repo
        .create_token("update-token", "updatehash")
        .await
        .unwrap();
    assert!(last_used_at(&pool, token.id).await.is_none());

    repo.update_last_used("updatehash").await.unwrap();

    assert!(last_used_at(&pool, token.id).await.is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_and_find(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let created = repo.create_token("token1", "hash1").await.unwrap();
    repo.create_token("token2", "hash2").await.unwrap();

    assert_eq!(repo.list_tokens().await.unwrap().len(), 2);
    assert_eq!(
        repo.find_by_id(created.id).await.unwrap().unwrap().name,
        "token1"
    );
    assert_eq!(
        repo.find_by_name("token2").await.unwrap().unwrap().token_hash,
        "hash2"
    );
    assert!(repo.find_by_name("missing").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_is_idempotent(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token("double-revoke", "doublehash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();
    let first = repo.find_by_id(token.id).await.unwrap().unwrap().revoked_at;

    repo.revoke_token(token.id).await.unwrap();
    let second = repo.find_by_id(token.id).await.unwrap().unwrap().revoked_at;

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_missing_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    assert!(repo.revoke_token(9999).await.is_err());
}
