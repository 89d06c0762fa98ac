//! Database repository for maintainers.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::maintainers::{MaintainerCreateDBRequest, MaintainerDBResponse, MaintainerUpdateDBRequest},
};
use crate::types::MaintainerId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing maintainers
#[derive(Debug, Clone)]
pub struct MaintainerFilter {
    pub skip: i64,
    pub limit: i64,
}

impl MaintainerFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

impl Default for MaintainerFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Maintainer {
    pub id: MaintainerId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

pub struct Maintainers<'c> {
    db: &'c mut SqliteConnection,
}

impl From<Maintainer> for MaintainerDBResponse {
    fn from(m: Maintainer) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            is_admin: m.is_admin,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Maintainers<'c> {
    type CreateRequest = MaintainerCreateDBRequest;
    type UpdateRequest = MaintainerUpdateDBRequest;
    type Response = MaintainerDBResponse;
    type Id = MaintainerId;
    type Filter = MaintainerFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Unique email constraint surfaces as DbError::UniqueViolation
        let maintainer = sqlx::query_as::<_, Maintainer>(
            r#"
            INSERT INTO maintainers (name, email, password_hash, is_admin)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.is_admin)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MaintainerDBResponse::from(maintainer))
    }

    #[instrument(skip(self), fields(maintainer_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let maintainer = sqlx::query_as::<_, Maintainer>("SELECT * FROM maintainers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(maintainer.map(MaintainerDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let maintainers = sqlx::query_as::<_, Maintainer>("SELECT * FROM maintainers ORDER BY id LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(maintainers.into_iter().map(MaintainerDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(maintainer_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM maintainers WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(maintainer_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let maintainer = sqlx::query_as::<_, Maintainer>(
            r#"
            UPDATE maintainers SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(MaintainerDBResponse::from(maintainer))
    }
}

impl<'c> Maintainers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<MaintainerDBResponse>> {
        let maintainer = sqlx::query_as::<_, Maintainer>("SELECT * FROM maintainers WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(maintainer.map(MaintainerDBResponse::from))
    }
}
