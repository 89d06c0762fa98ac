use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::debug;

use crate::{
    AppState,
    api::models::{
        maintainers::CurrentMaintainer,
        maintenance::{MaintenanceCreate, MaintenanceListQuery, MaintenanceResponse, MaintenanceUpdate},
    },
    db::{
        errors::DbError,
        handlers::{Maintainers, Maintenance, Repository, WaterUnits},
        models::maintenance::MaintenanceUpdateDBRequest,
    },
    errors::Error,
    types::{MaintainerId, MaintenanceId, WaterUnitId},
};

async fn ensure_unit_exists(db: &mut sqlx::SqliteConnection, id: WaterUnitId) -> Result<(), Error> {
    if WaterUnits::new(db).get_by_id(id).await?.is_none() {
        return Err(Error::validation("wu", format!("Invalid pk \"{id}\" - object does not exist.")));
    }
    Ok(())
}

async fn ensure_maintainer_exists(db: &mut sqlx::SqliteConnection, id: MaintainerId) -> Result<(), Error> {
    if Maintainers::new(db).get_by_id(id).await?.is_none() {
        return Err(Error::validation(
            "maintainer",
            format!("Invalid pk \"{id}\" - object does not exist."),
        ));
    }
    Ok(())
}

/// List maintenance reports
#[utoipa::path(
    get,
    path = "/api/maintenance/",
    tag = "maintenance",
    params(MaintenanceListQuery),
    responses(
        (status = 200, description = "Reports matching the filters, AND-combined", body = Vec<MaintenanceResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_maintenance(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceListQuery>,
) -> Result<Json<Vec<MaintenanceResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let reports = Maintenance::new(&mut conn).list(&query.into()).await?;

    Ok(Json(reports.into_iter().map(MaintenanceResponse::from).collect()))
}

/// File a maintenance report
#[utoipa::path(
    post,
    path = "/api/maintenance/",
    request_body = MaintenanceCreate,
    tag = "maintenance",
    responses(
        (status = 201, description = "Report filed, attributed to the caller", body = MaintenanceResponse),
        (status = 400, description = "Missing fields or unknown water unit"),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_maintenance(
    State(state): State<AppState>,
    current_maintainer: CurrentMaintainer,
    Json(request): Json<MaintenanceCreate>,
) -> Result<(StatusCode, Json<MaintenanceResponse>), Error> {
    // Reports are always attributed to the caller, whatever the payload says
    let create_request = request.validate(current_maintainer.id, Utc::now())?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    ensure_unit_exists(&mut tx, create_request.water_unit_id).await?;
    let report = Maintenance::new(&mut tx).create(&create_request).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    debug!("Maintainer {} filed report {}", current_maintainer.id, report.id);
    Ok((StatusCode::CREATED, Json(MaintenanceResponse::from(report))))
}

/// Get a maintenance report by ID
#[utoipa::path(
    get,
    path = "/api/maintenance/{id}/",
    tag = "maintenance",
    params(
        ("id" = MaintenanceId, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "The report", body = MaintenanceResponse),
        (status = 404, description = "Report not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<MaintenanceId>,
) -> Result<Json<MaintenanceResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let report = Maintenance::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Maintenance report".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(MaintenanceResponse::from(report)))
}

/// Update a maintenance report
#[utoipa::path(
    patch,
    path = "/api/maintenance/{id}/",
    request_body = MaintenanceUpdate,
    tag = "maintenance",
    params(
        ("id" = MaintenanceId, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Updated report", body = MaintenanceResponse),
        (status = 400, description = "Invalid fields or unknown references"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Report not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<MaintenanceId>,
    _current_maintainer: CurrentMaintainer,
    Json(request): Json<MaintenanceUpdate>,
) -> Result<Json<MaintenanceResponse>, Error> {
    request.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(wu) = request.wu {
        ensure_unit_exists(&mut tx, wu).await?;
    }
    // Reassignment is checked; clearing (explicit null) is always allowed
    if let Some(Some(maintainer_id)) = request.maintainer {
        ensure_maintainer_exists(&mut tx, maintainer_id).await?;
    }

    let update_request = MaintenanceUpdateDBRequest::new(request);
    let report = match Maintenance::new(&mut tx).update(id, &update_request).await {
        Ok(report) => report,
        Err(DbError::NotFound) => {
            return Err(Error::NotFound {
                resource: "Maintenance report".to_string(),
                id: id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(MaintenanceResponse::from(report)))
}

/// Delete a maintenance report
#[utoipa::path(
    delete,
    path = "/api/maintenance/{id}/",
    tag = "maintenance",
    params(
        ("id" = MaintenanceId, Path, description = "Report ID")
    ),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Report not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<MaintenanceId>,
    _current_maintainer: CurrentMaintainer,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    match Maintenance::new(&mut conn).delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(Error::NotFound {
            resource: "Maintenance report".to_string(),
            id: id.to_string(),
        }),
    }
}
