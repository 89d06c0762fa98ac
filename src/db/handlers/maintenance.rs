//! Database repository for maintenance reports.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::maintenance::{MaintenanceCreateDBRequest, MaintenanceDBResponse, MaintenanceUpdateDBRequest},
};
use crate::types::{MaintainerId, MaintenanceId, WaterUnitId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, query_builder::QueryBuilder};
use tracing::instrument;

/// Filter for listing maintenance reports.
///
/// All set fields are combined with AND. `date` matches the calendar day of
/// the report timestamp, `datetime` matches the exact instant, and
/// `problem_contains` is a case-insensitive substring match.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceFilter {
    pub water_unit_id: Option<WaterUnitId>,
    pub maintainer_id: Option<MaintainerId>,
    pub date: Option<NaiveDate>,
    pub datetime: Option<DateTime<Utc>>,
    pub problem_contains: Option<String>,
    /// Sort key, optionally prefixed with `-` for descending
    pub ordering: Option<String>,
}

impl MaintenanceFilter {
    /// Resolve the ordering request against the sortable columns.
    ///
    /// Unrecognized keys fall back to the default of newest report first.
    fn order_clause(&self) -> &'static str {
        let raw = self.ordering.as_deref().unwrap_or("-datetime");
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };

        match (field, descending) {
            ("datetime", false) => "datetime",
            ("datetime", true) => "datetime DESC",
            ("wu", false) => "water_unit_id",
            ("wu", true) => "water_unit_id DESC",
            ("maintainer", false) => "maintainer_id",
            ("maintainer", true) => "maintainer_id DESC",
            _ => "datetime DESC",
        }
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct MaintenanceReport {
    pub id: MaintenanceId,
    pub water_unit_id: WaterUnitId,
    pub datetime: DateTime<Utc>,
    pub problem: String,
    pub description: String,
    pub maintainer_id: Option<MaintainerId>,
}

pub struct Maintenance<'c> {
    db: &'c mut SqliteConnection,
}

impl From<MaintenanceReport> for MaintenanceDBResponse {
    fn from(report: MaintenanceReport) -> Self {
        Self {
            id: report.id,
            water_unit_id: report.water_unit_id,
            datetime: report.datetime,
            problem: report.problem,
            description: report.description,
            maintainer_id: report.maintainer_id,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Maintenance<'c> {
    type CreateRequest = MaintenanceCreateDBRequest;
    type UpdateRequest = MaintenanceUpdateDBRequest;
    type Response = MaintenanceDBResponse;
    type Id = MaintenanceId;
    type Filter = MaintenanceFilter;

    #[instrument(skip(self, request), fields(water_unit_id = request.water_unit_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let report = sqlx::query_as::<_, MaintenanceReport>(
            r#"
            INSERT INTO maintenance (water_unit_id, datetime, problem, description, maintainer_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.water_unit_id)
        .bind(request.datetime)
        .bind(&request.problem)
        .bind(&request.description)
        .bind(request.maintainer_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(MaintenanceDBResponse::from(report))
    }

    #[instrument(skip(self), fields(maintenance_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let report = sqlx::query_as::<_, MaintenanceReport>("SELECT * FROM maintenance WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(report.map(MaintenanceDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM maintenance WHERE 1=1");

        if let Some(water_unit_id) = filter.water_unit_id {
            query.push(" AND water_unit_id = ");
            query.push_bind(water_unit_id);
        }

        if let Some(maintainer_id) = filter.maintainer_id {
            query.push(" AND maintainer_id = ");
            query.push_bind(maintainer_id);
        }

        // Calendar-day match on the timestamp column
        if let Some(date) = filter.date {
            query.push(" AND date(datetime) = ");
            query.push_bind(date);
        }

        if let Some(datetime) = filter.datetime {
            query.push(" AND datetime = ");
            query.push_bind(datetime);
        }

        if let Some(ref problem) = filter.problem_contains {
            let pattern = format!("%{}%", problem.to_lowercase());
            query.push(" AND LOWER(problem) LIKE ");
            query.push_bind(pattern);
        }

        query.push(" ORDER BY ");
        query.push(filter.order_clause());

        let reports = query
            .build_query_as::<MaintenanceReport>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(reports.into_iter().map(MaintenanceDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(maintenance_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM maintenance WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(maintenance_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let report = sqlx::query_as::<_, MaintenanceReport>(
            r#"
            UPDATE maintenance SET
                water_unit_id = COALESCE(?, water_unit_id),
                datetime = COALESCE(?, datetime),
                problem = COALESCE(?, problem),
                description = COALESCE(?, description)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.water_unit_id)
        .bind(request.datetime)
        .bind(&request.problem)
        .bind(&request.description)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        // COALESCE cannot clear a column, so an explicit maintainer value
        // (including null) is applied in a second statement.
        let report = if let Some(maintainer_id) = request.maintainer_id {
            sqlx::query_as::<_, MaintenanceReport>(
                "UPDATE maintenance SET maintainer_id = ? WHERE id = ? RETURNING *",
            )
            .bind(maintainer_id)
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?
        } else {
            report
        };

        Ok(MaintenanceDBResponse::from(report))
    }
}

impl<'c> Maintenance<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::handlers::{Maintainers, WaterUnits};
    use crate::db::models::maintainers::MaintainerCreateDBRequest;
    use crate::db::models::water_units::WaterUnitCreateDBRequest;
    use chrono::TimeZone;
    use sqlx::SqlitePool;

    async fn create_unit(conn: &mut SqliteConnection) -> WaterUnitId {
        let mut repo = WaterUnits::new(conn);
        repo.create(&WaterUnitCreateDBRequest {
            location: "Test site".to_string(),
            name: "Unit".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    async fn create_maintainer(conn: &mut SqliteConnection, email: &str) -> MaintainerId {
        let mut repo = Maintainers::new(conn);
        repo.create(&MaintainerCreateDBRequest {
            name: "Tester".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
        })
        .await
        .unwrap()
        .id
    }

    fn report(
        unit: WaterUnitId,
        maintainer: Option<MaintainerId>,
        day: u32,
        problem: &str,
    ) -> MaintenanceCreateDBRequest {
        MaintenanceCreateDBRequest {
            water_unit_id: unit,
            datetime: Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap(),
            problem: problem.to_string(),
            description: "details".to_string(),
            maintainer_id: maintainer,
        }
    }

    #[test]
    fn test_order_clause_known_and_unknown_keys() {
        let mut filter = MaintenanceFilter::default();
        assert_eq!(filter.order_clause(), "datetime DESC");

        filter.ordering = Some("maintainer".to_string());
        assert_eq!(filter.order_clause(), "maintainer_id");

        filter.ordering = Some("-wu".to_string());
        assert_eq!(filter.order_clause(), "water_unit_id DESC");

        filter.ordering = Some("problem".to_string());
        assert_eq!(filter.order_clause(), "datetime DESC");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit = create_unit(&mut conn).await;
        let maintainer = create_maintainer(&mut conn, "fix@example.com").await;

        let mut repo = Maintenance::new(&mut conn);
        let created = repo.create(&report(unit, Some(maintainer), 20, "Leak")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.problem, "Leak");
        assert_eq!(fetched.maintainer_id, Some(maintainer));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_problem_contains_is_case_insensitive(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit = create_unit(&mut conn).await;

        let mut repo = Maintenance::new(&mut conn);
        repo.create(&report(unit, None, 18, "Motor issue")).await.unwrap();
        repo.create(&report(unit, None, 19, "Cracked casing")).await.unwrap();
        repo.create(&report(unit, None, 20, "burnt motor winding")).await.unwrap();

        let filter = MaintenanceFilter {
            problem_contains: Some("motor".to_string()),
            ..Default::default()
        };
        let reports = repo.list(&filter).await.unwrap();
        let problems: Vec<_> = reports.iter().map(|r| r.problem.as_str()).collect();
        assert_eq!(problems, vec!["burnt motor winding", "Motor issue"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filter_by_maintainer_and_unit(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit_a = create_unit(&mut conn).await;
        let unit_b = create_unit(&mut conn).await;
        let maintainer = create_maintainer(&mut conn, "both@example.com").await;

        let mut repo = Maintenance::new(&mut conn);
        repo.create(&report(unit_a, Some(maintainer), 18, "A1")).await.unwrap();
        repo.create(&report(unit_b, Some(maintainer), 19, "B1")).await.unwrap();
        repo.create(&report(unit_a, None, 20, "A2")).await.unwrap();

        let filter = MaintenanceFilter {
            water_unit_id: Some(unit_a),
            maintainer_id: Some(maintainer),
            ..Default::default()
        };
        let reports = repo.list(&filter).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].problem, "A1");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_can_clear_maintainer(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit = create_unit(&mut conn).await;
        let maintainer = create_maintainer(&mut conn, "clear@example.com").await;

        let mut repo = Maintenance::new(&mut conn);
        let created = repo.create(&report(unit, Some(maintainer), 20, "Leak")).await.unwrap();

        // Outer None leaves the maintainer untouched
        let updated = repo
            .update(
                created.id,
                &MaintenanceUpdateDBRequest {
                    problem: Some("Sealed leak".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.problem, "Sealed leak");
        assert_eq!(updated.maintainer_id, Some(maintainer));

        // Inner None clears it
        let updated = repo
            .update(
                created.id,
                &MaintenanceUpdateDBRequest {
                    maintainer_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.maintainer_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_maintainer_nulls_reports(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit = create_unit(&mut conn).await;
        let maintainer = create_maintainer(&mut conn, "gone@example.com").await;

        let report_id = {
            let mut repo = Maintenance::new(&mut conn);
            repo.create(&report(unit, Some(maintainer), 20, "Leak")).await.unwrap().id
        };

        let mut maintainers = Maintainers::new(&mut conn);
        assert!(maintainers.delete(maintainer).await.unwrap());

        let mut repo = Maintenance::new(&mut conn);
        let fetched = repo.get_by_id(report_id).await.unwrap().unwrap();
        assert_eq!(fetched.maintainer_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_unit_cascades_reports(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let unit = create_unit(&mut conn).await;

        let report_id = {
            let mut repo = Maintenance::new(&mut conn);
            repo.create(&report(unit, None, 20, "Leak")).await.unwrap().id
        };

        let mut units = WaterUnits::new(&mut conn);
        assert!(units.delete(unit).await.unwrap());

        let mut repo = Maintenance::new(&mut conn);
        assert!(repo.get_by_id(report_id).await.unwrap().is_none());
    }
}
