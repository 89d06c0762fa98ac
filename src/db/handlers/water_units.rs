//! Database repository for water units.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::water_units::{WaterUnitCreateDBRequest, WaterUnitDBResponse, WaterUnitUpdateDBRequest},
};
use crate::types::WaterUnitId;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing water units.
///
/// Unit listings have no query-side filters; everything is returned in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct WaterUnitFilter {}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct WaterUnit {
    pub id: WaterUnitId,
    pub location: String,
    pub name: String,
}

pub struct WaterUnits<'c> {
    db: &'c mut SqliteConnection,
}

impl From<WaterUnit> for WaterUnitDBResponse {
    fn from(unit: WaterUnit) -> Self {
        Self {
            id: unit.id,
            location: unit.location,
            name: unit.name,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for WaterUnits<'c> {
    type CreateRequest = WaterUnitCreateDBRequest;
    type UpdateRequest = WaterUnitUpdateDBRequest;
    type Response = WaterUnitDBResponse;
    type Id = WaterUnitId;
    type Filter = WaterUnitFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let unit = sqlx::query_as::<_, WaterUnit>(
            r#"
            INSERT INTO water_units (location, name)
            VALUES (?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.location)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(WaterUnitDBResponse::from(unit))
    }

    #[instrument(skip(self), fields(water_unit_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let unit = sqlx::query_as::<_, WaterUnit>("SELECT * FROM water_units WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(unit.map(WaterUnitDBResponse::from))
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let units = sqlx::query_as::<_, WaterUnit>("SELECT * FROM water_units ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(units.into_iter().map(WaterUnitDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(water_unit_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Child readings and reports go with the unit (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM water_units WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(water_unit_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let unit = sqlx::query_as::<_, WaterUnit>(
            r#"
            UPDATE water_units SET
                location = COALESCE(?, location),
                name = COALESCE(?, name)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.location)
        .bind(&request.name)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(WaterUnitDBResponse::from(unit))
    }
}

impl<'c> WaterUnits<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}
