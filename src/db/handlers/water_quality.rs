//! Database repository for water quality readings.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::water_quality::{WaterQualityCreateDBRequest, WaterQualityDBResponse, WaterQualityUpdateDBRequest},
};
use crate::types::{WaterQualityId, WaterUnitId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, query_builder::QueryBuilder};
use tracing::instrument;

/// Filter for listing water quality readings.
///
/// All set fields are combined with AND. `date` matches the calendar day of
/// the reading timestamp, `date_time` matches the exact instant, and the
/// `min_tds`/`max_tds` bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct WaterQualityFilter {
    pub water_unit_id: Option<WaterUnitId>,
    pub tds: Option<f64>,
    pub date: Option<NaiveDate>,
    pub date_time: Option<DateTime<Utc>>,
    pub min_tds: Option<f64>,
    pub max_tds: Option<f64>,
    /// Sort key, optionally prefixed with `-` for descending
    pub ordering: Option<String>,
}

impl WaterQualityFilter {
    /// Resolve the ordering request against the sortable columns.
    ///
    /// Unrecognized keys fall back to the default of newest reading first.
    fn order_clause(&self) -> &'static str {
        let raw = self.ordering.as_deref().unwrap_or("-date_time");
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };

        match (field, descending) {
            ("date_time", false) => "date_time",
            ("date_time", true) => "date_time DESC",
            ("tds", false) => "tds",
            ("tds", true) => "tds DESC",
            ("wu", false) => "water_unit_id",
            ("wu", true) => "water_unit_id DESC",
            _ => "date_time DESC",
        }
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct WaterQualityReading {
    pub id: WaterQualityId,
    pub water_unit_id: WaterUnitId,
    pub date_time: DateTime<Utc>,
    pub tds: f64,
}

pub struct WaterQuality<'c> {
    db: &'c mut SqliteConnection,
}

impl From<WaterQualityReading> for WaterQualityDBResponse {
    fn from(reading: WaterQualityReading) -> Self {
        Self {
            id: reading.id,
            water_unit_id: reading.water_unit_id,
            date_time: reading.date_time,
            tds: reading.tds,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for WaterQuality<'c> {
    type CreateRequest = WaterQualityCreateDBRequest;
    type UpdateRequest = WaterQualityUpdateDBRequest;
    type Response = WaterQualityDBResponse;
    type Id = WaterQualityId;
    type Filter = WaterQualityFilter;

    #[instrument(skip(self, request), fields(water_unit_id = request.water_unit_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let reading = sqlx::query_as::<_, WaterQualityReading>(
            r#"
            INSERT INTO water_quality (water_unit_id, date_time, tds)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.water_unit_id)
        .bind(request.date_time)
        .bind(request.tds)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(WaterQualityDBResponse::from(reading))
    }

    #[instrument(skip(self), fields(water_quality_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reading = sqlx::query_as::<_, WaterQualityReading>("SELECT * FROM water_quality WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(reading.map(WaterQualityDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM water_quality WHERE 1=1");

        if let Some(water_unit_id) = filter.water_unit_id {
            query.push(" AND water_unit_id = ");
            query.push_bind(water_unit_id);
        }

        if let Some(tds) = filter.tds {
            query.push(" AND tds = ");
            query.push_bind(tds);
        }

        // Calendar-day match on the timestamp column
        if let Some(date) = filter.date {
            query.push(" AND date(date_time) = ");
            query.push_bind(date);
        }

        if let Some(date_time) = filter.date_time {
            query.push(" AND date_time = ");
            query.push_bind(date_time);
        }

        if let Some(min_tds) = filter.min_tds {
            query.push(" AND tds >= ");
            query.push_bind(min_tds);
        }

        if let Some(max_tds) = filter.max_tds {
            query.push(" AND tds <= ");
            query.push_bind(max_tds);
        }

        query.push(" ORDER BY ");
        query.push(filter.order_clause());

        let readings = query
            .build_query_as::<WaterQualityReading>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(readings.into_iter().map(WaterQualityDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(water_quality_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM water_quality WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(water_quality_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // date_time is immutable after creation and never part of an update
        let reading = sqlx::query_as::<_, WaterQualityReading>(
            r#"
            UPDATE water_quality SET
                water_unit_id = COALESCE(?, water_unit_id),
                tds = COALESCE(?, tds)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.water_unit_id)
        .bind(request.tds)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(WaterQualityDBResponse::from(reading))
    }
}

impl<'c> WaterQuality<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}
