use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::{
    AppState,
    api::models::{
        maintainers::CurrentMaintainer,
        water_units::{WaterUnitCreate, WaterUnitResponse, WaterUnitUpdate},
    },
    db::{
        errors::DbError,
        handlers::{Repository, WaterUnits},
        models::water_units::WaterUnitUpdateDBRequest,
    },
    errors::Error,
    types::WaterUnitId,
};

/// List all water units
#[utoipa::path(
    get,
    path = "/api/water-unit/",
    tag = "water-unit",
    responses(
        (status = 200, description = "All registered water units", body = Vec<WaterUnitResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_water_units(State(state): State<AppState>) -> Result<Json<Vec<WaterUnitResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let units = WaterUnits::new(&mut conn).list(&Default::default()).await?;

    Ok(Json(units.into_iter().map(WaterUnitResponse::from).collect()))
}

/// Register a new water unit
#[utoipa::path(
    post,
    path = "/api/water-unit/",
    request_body = WaterUnitCreate,
    tag = "water-unit",
    responses(
        (status = 201, description = "Water unit registered", body = WaterUnitResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_water_unit(
    State(state): State<AppState>,
    current_maintainer: CurrentMaintainer,
    Json(request): Json<WaterUnitCreate>,
) -> Result<(StatusCode, Json<WaterUnitResponse>), Error> {
    let create_request = request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let unit = WaterUnits::new(&mut conn).create(&create_request).await?;

    debug!("Maintainer {} registered water unit {}", current_maintainer.id, unit.id);
    Ok((StatusCode::CREATED, Json(WaterUnitResponse::from(unit))))
}

/// Get a water unit by ID
#[utoipa::path(
    get,
    path = "/api/water-unit/{id}/",
    tag = "water-unit",
    params(
        ("id" = WaterUnitId, Path, description = "Water unit ID")
    ),
    responses(
        (status = 200, description = "The water unit", body = WaterUnitResponse),
        (status = 404, description = "Water unit not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_water_unit(
    State(state): State<AppState>,
    Path(id): Path<WaterUnitId>,
) -> Result<Json<WaterUnitResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let unit = WaterUnits::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Water unit".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(WaterUnitResponse::from(unit)))
}

/// Update a water unit
#[utoipa::path(
    patch,
    path = "/api/water-unit/{id}/",
    request_body = WaterUnitUpdate,
    tag = "water-unit",
    params(
        ("id" = WaterUnitId, Path, description = "Water unit ID")
    ),
    responses(
        (status = 200, description = "Updated water unit", body = WaterUnitResponse),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Water unit not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_water_unit(
    State(state): State<AppState>,
    Path(id): Path<WaterUnitId>,
    _current_maintainer: CurrentMaintainer,
    Json(request): Json<WaterUnitUpdate>,
) -> Result<Json<WaterUnitResponse>, Error> {
    request.validate()?;
    let update_request = WaterUnitUpdateDBRequest::new(request);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let unit = match WaterUnits::new(&mut conn).update(id, &update_request).await {
        Ok(unit) => unit,
        Err(DbError::NotFound) => {
            return Err(Error::NotFound {
                resource: "Water unit".to_string(),
                id: id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(WaterUnitResponse::from(unit)))
}

/// Delete a water unit and all its readings and reports
#[utoipa::path(
    delete,
    path = "/api/water-unit/{id}/",
    tag = "water-unit",
    params(
        ("id" = WaterUnitId, Path, description = "Water unit ID")
    ),
    responses(
        (status = 204, description = "Water unit deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Water unit not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_water_unit(
    State(state): State<AppState>,
    Path(id): Path<WaterUnitId>,
    _current_maintainer: CurrentMaintainer,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    match WaterUnits::new(&mut conn).delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(Error::NotFound {
            resource: "Water unit".to_string(),
            id: id.to_string(),
        }),
    }
}
