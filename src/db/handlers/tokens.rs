//! Database repository for auth tokens.
//!
//! Tokens are opaque random keys with the key as primary key. Each maintainer
//! holds at most one token; logging in returns the existing token when one is
//! already minted. Tokens never expire and are removed on logout or when the
//! owning maintainer is deleted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    auth::password,
    db::{errors::Result, models::tokens::TokenDBResponse},
    types::MaintainerId,
};

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Token {
    pub key: String,
    pub maintainer_id: MaintainerId,
    pub created: chrono::DateTime<Utc>,
}

pub struct Tokens<'c> {
    db: &'c mut SqliteConnection,
}

impl From<Token> for TokenDBResponse {
    fn from(t: Token) -> Self {
        Self {
            key: t.key,
            maintainer_id: t.maintainer_id,
            created: t.created,
        }
    }
}

impl<'c> Tokens<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Return the maintainer's token, minting one if none exists yet.
    #[instrument(skip(self), fields(maintainer_id = maintainer_id), err)]
    pub async fn get_or_create_for_maintainer(&mut self, maintainer_id: MaintainerId) -> Result<TokenDBResponse> {
        let existing = sqlx::query_as::<_, Token>("SELECT * FROM auth_tokens WHERE maintainer_id = ?")
            .bind(maintainer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(token) = existing {
            return Ok(TokenDBResponse::from(token));
        }

        let token = sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO auth_tokens (key, maintainer_id, created)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(password::generate_token())
        .bind(maintainer_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(TokenDBResponse::from(token))
    }

    /// Look up a token by its key.
    #[instrument(skip(self, key), err)]
    pub async fn get_by_key(&mut self, key: &str) -> Result<Option<TokenDBResponse>> {
        let token = sqlx::query_as::<_, Token>("SELECT * FROM auth_tokens WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(token.map(TokenDBResponse::from))
    }

    /// Delete the maintainer's token if one exists. Idempotent.
    #[instrument(skip(self), fields(maintainer_id = maintainer_id), err)]
    pub async fn delete_for_maintainer(&mut self, maintainer_id: MaintainerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE maintainer_id = ?")
            .bind(maintainer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Maintainers, Repository};
    use crate::db::models::maintainers::MaintainerCreateDBRequest;
    use sqlx::SqlitePool;

    async fn create_maintainer(conn: &mut SqliteConnection, email: &str) -> MaintainerId {
        let mut repo = Maintainers::new(conn);
        repo.create(&MaintainerCreateDBRequest {
            name: "Token Owner".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
        })
        .await
        .unwrap()
        .id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_or_create_is_idempotent(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let maintainer_id = create_maintainer(&mut conn, "tok1@example.com").await;

        let mut repo = Tokens::new(&mut conn);
        let first = repo.get_or_create_for_maintainer(maintainer_id).await.unwrap();
        let second = repo.get_or_create_for_maintainer(maintainer_id).await.unwrap();

        assert_eq!(first.key, second.key);
        assert_eq!(first.maintainer_id, maintainer_id);
        // 32 random bytes, base64 url-safe without padding
        assert_eq!(first.key.len(), 43);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resolve_and_delete(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let maintainer_id = create_maintainer(&mut conn, "tok2@example.com").await;

        let mut repo = Tokens::new(&mut conn);
        let token = repo.get_or_create_for_maintainer(maintainer_id).await.unwrap();

        let resolved = repo.get_by_key(&token.key).await.unwrap();
        assert_eq!(resolved.map(|t| t.maintainer_id), Some(maintainer_id));

        assert!(repo.delete_for_maintainer(maintainer_id).await.unwrap());
        // Second delete is a no-op
        assert!(!repo.delete_for_maintainer(maintainer_id).await.unwrap());

        let gone = repo.get_by_key(&token.key).await.unwrap();
        assert!(gone.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_maintainer_cascades_token(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let maintainer_id = create_maintainer(&mut conn, "tok3@example.com").await;

        let key = {
            let mut repo = Tokens::new(&mut conn);
            repo.get_or_create_for_maintainer(maintainer_id).await.unwrap().key
        };

        let mut maintainers = Maintainers::new(&mut conn);
        assert!(maintainers.delete(maintainer_id).await.unwrap());

        let mut repo = Tokens::new(&mut conn);
        assert!(repo.get_by_key(&key).await.unwrap().is_none());
    }
}
