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
        water_quality::{WaterQualityCreate, WaterQualityListQuery, WaterQualityResponse, WaterQualityUpdate},
    },
    db::{
        errors::DbError,
        handlers::{Repository, WaterQuality, WaterUnits},
        models::water_quality::WaterQualityUpdateDBRequest,
    },
    errors::Error,
    types::{WaterQualityId, WaterUnitId},
};

async fn ensure_unit_exists(db: &mut sqlx::SqliteConnection, id: WaterUnitId) -> Result<(), Error> {
    if WaterUnits::new(db).get_by_id(id).await?.is_none() {
        return Err(Error::validation("wu", format!("Invalid pk \"{id}\" - object does not exist.")));
    }
    Ok(())
}

/// List water quality readings
#[utoipa::path(
    get,
    path = "/api/water-quality/",
    tag = "water-quality",
    params(WaterQualityListQuery),
    responses(
        (status = 200, description = "Readings matching the filters, AND-combined", body = Vec<WaterQualityResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_water_quality(
    State(state): State<AppState>,
    Query(query): Query<WaterQualityListQuery>,
) -> Result<Json<Vec<WaterQualityResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let readings = WaterQuality::new(&mut conn).list(&query.into()).await?;

    Ok(Json(readings.into_iter().map(WaterQualityResponse::from).collect()))
}

/// Record a water quality reading
#[utoipa::path(
    post,
    path = "/api/water-quality/",
    request_body = WaterQualityCreate,
    tag = "water-quality",
    responses(
        (status = 201, description = "Reading recorded with a server-assigned timestamp", body = WaterQualityResponse),
        (status = 400, description = "Missing fields or unknown water unit"),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_water_quality(
    State(state): State<AppState>,
    current_maintainer: CurrentMaintainer,
    Json(request): Json<WaterQualityCreate>,
) -> Result<(StatusCode, Json<WaterQualityResponse>), Error> {
    // The timestamp is assigned here; client-sent values never reach the row
    let create_request = request.validate(Utc::now())?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    ensure_unit_exists(&mut tx, create_request.water_unit_id).await?;
    let reading = WaterQuality::new(&mut tx).create(&create_request).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    debug!("Maintainer {} recorded reading {}", current_maintainer.id, reading.id);
    Ok((StatusCode::CREATED, Json(WaterQualityResponse::from(reading))))
}

/// Get a water quality reading by ID
#[utoipa::path(
    get,
    path = "/api/water-quality/{id}/",
    tag = "water-quality",
    params(
        ("id" = WaterQualityId, Path, description = "Reading ID")
    ),
    responses(
        (status = 200, description = "The reading", body = WaterQualityResponse),
        (status = 404, description = "Reading not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_water_quality(
    State(state): State<AppState>,
    Path(id): Path<WaterQualityId>,
) -> Result<Json<WaterQualityResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let reading = WaterQuality::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Water quality reading".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(WaterQualityResponse::from(reading)))
}

/// Update a water quality reading
#[utoipa::path(
    patch,
    path = "/api/water-quality/{id}/",
    request_body = WaterQualityUpdate,
    tag = "water-quality",
    params(
        ("id" = WaterQualityId, Path, description = "Reading ID")
    ),
    responses(
        (status = 200, description = "Updated reading; the timestamp is immutable", body = WaterQualityResponse),
        (status = 400, description = "Unknown water unit"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Reading not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_water_quality(
    State(state): State<AppState>,
    Path(id): Path<WaterQualityId>,
    _current_maintainer: CurrentMaintainer,
    Json(request): Json<WaterQualityUpdate>,
) -> Result<Json<WaterQualityResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(wu) = request.wu {
        ensure_unit_exists(&mut tx, wu).await?;
    }

    let update_request = WaterQualityUpdateDBRequest::new(request);
    let reading = match WaterQuality::new(&mut tx).update(id, &update_request).await {
        Ok(reading) => reading,
        Err(DbError::NotFound) => {
            return Err(Error::NotFound {
                resource: "Water quality reading".to_string(),
                id: id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(WaterQualityResponse::from(reading)))
}

/// Delete a water quality reading
#[utoipa::path(
    delete,
    path = "/api/water-quality/{id}/",
    tag = "water-quality",
    params(
        ("id" = WaterQualityId, Path, description = "Reading ID")
    ),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Reading not found"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_water_quality(
    State(state): State<AppState>,
    Path(id): Path<WaterQualityId>,
    _current_maintainer: CurrentMaintainer,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    match WaterQuality::new(&mut conn).delete(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(Error::NotFound {
            resource: "Water quality reading".to_string(),
            id: id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        db::{
            handlers::{Repository, WaterQuality, WaterUnits},
            models::{
                water_quality::{WaterQualityCreateDBRequest, WaterQualityDBResponse},
                water_units::WaterUnitCreateDBRequest,
            },
        },
        test_utils::{auth_header, create_test_app, create_test_maintainer, create_test_token},
        types::WaterUnitId,
    };
    use chrono::{DateTime, Utc};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn seed_unit(pool: &SqlitePool) -> WaterUnitId {
        let mut conn = pool.acquire().await.unwrap();
        WaterUnits::new(&mut conn)
            .create(&WaterUnitCreateDBRequest {
                location: "North field".to_string(),
                name: "Pump 1".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_reading(pool: &SqlitePool, unit: WaterUnitId, timestamp: &str, tds: f64) -> WaterQualityDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        WaterQuality::new(&mut conn)
            .create(&WaterQualityCreateDBRequest {
                water_unit_id: unit,
                date_time: timestamp.parse::<DateTime<Utc>>().unwrap(),
                tds,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_stamps_timestamp(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let before = Utc::now();
        let (name, value) = auth_header(&key);
        let response = app
            .post("/api/water-quality/")
            .add_header(name, value)
            .json(&json!({
                "wu": unit,
                "tds": 350.0,
                "date_time": "2000-01-01T00:00:00Z"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        let stamped: DateTime<Utc> = body["date_time"].as_str().unwrap().parse().unwrap();
        // The client-sent timestamp was discarded in favor of server time
        let sent: DateTime<Utc> = "2000-01-01T00:00:00Z".parse().unwrap();
        assert_ne!(stamped, sent);
        assert!(stamped >= before - chrono::Duration::seconds(1));
        assert_eq!(body["tds"], 350.0);
        assert_eq!(body["wu"], unit);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_unknown_unit(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        let response = app
            .post("/api/water-quality/")
            .add_header(name, value)
            .json(&json!({"wu": 999, "tds": 100.0}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["wu"][0], "Invalid pk \"999\" - object does not exist.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_requires_auth(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;

        let response = app.post("/api/water-quality/").json(&json!({"wu": unit, "tds": 100.0})).await;

        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_tds_range(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        seed_reading(&pool, unit, "2026-01-02T08:00:00Z", 200.0).await;
        seed_reading(&pool, unit, "2026-01-03T08:00:00Z", 300.0).await;

        let response = app.get("/api/water-quality/?min_tds=200").await;
        response.assert_status_ok();
        let readings: Vec<Value> = response.json();
        // Bounds are inclusive; default order is newest first
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0]["tds"], 300.0);
        assert_eq!(readings[1]["tds"], 200.0);

        let response = app.get("/api/water-quality/?min_tds=150&max_tds=250").await;
        response.assert_status_ok();
        let readings: Vec<Value> = response.json();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["tds"], 200.0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_ordering_and_unit_filter(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit_a = seed_unit(&pool).await;
        let unit_b = seed_unit(&pool).await;
        seed_reading(&pool, unit_a, "2026-01-01T08:00:00Z", 300.0).await;
        seed_reading(&pool, unit_a, "2026-01-02T08:00:00Z", 100.0).await;
        seed_reading(&pool, unit_b, "2026-01-03T08:00:00Z", 200.0).await;

        let response = app.get(&format!("/api/water-quality/?wu={unit_a}&ordering=-tds")).await;
        response.assert_status_ok();
        let readings: Vec<Value> = response.json();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0]["tds"], 300.0);
        assert_eq!(readings[1]["tds"], 100.0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_date_filter(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        seed_reading(&pool, unit, "2026-01-01T20:00:00Z", 150.0).await;
        seed_reading(&pool, unit, "2026-01-02T08:00:00Z", 200.0).await;

        let response = app.get("/api/water-quality/?date=2026-01-01").await;
        response.assert_status_ok();
        let readings: Vec<Value> = response.json();
        assert_eq!(readings.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_query_params_are_ignored(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;

        let response = app.get("/api/water-quality/?flavor=salty&ordering=sideways").await;

        // Unknown filter keys and unknown sort keys fall back silently
        response.assert_status_ok();
        let readings: Vec<Value> = response.json();
        assert_eq!(readings.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_patch_cannot_change_timestamp(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        let reading = seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        let response = app
            .patch(&format!("/api/water-quality/{}/", reading.id))
            .add_header(name, value)
            .json(&json!({"tds": 42.0, "date_time": "1999-12-31T23:59:59Z"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["tds"], 42.0);
        let unchanged: DateTime<Utc> = body["date_time"].as_str().unwrap().parse().unwrap();
        assert_eq!(unchanged, reading.date_time);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_patch_unknown_unit(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        let reading = seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        let response = app
            .patch(&format!("/api/water-quality/{}/", reading.id))
            .add_header(name, value)
            .json(&json!({"wu": 999}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["wu"][0], "Invalid pk \"999\" - object does not exist.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_reading(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        let reading = seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        let response = app
            .delete(&format!("/api/water-quality/{}/", reading.id))
            .add_header(name, value)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        let response = app.get(&format!("/api/water-quality/{}/", reading.id)).await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["detail"], format!("Water quality reading with ID {} not found", reading.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unit_delete_cascades_to_readings(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let unit = seed_unit(&pool).await;
        let reading = seed_reading(&pool, unit, "2026-01-01T08:00:00Z", 100.0).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        app.delete(&format!("/api/water-unit/{unit}/"))
            .add_header(name, value)
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);

        app.get(&format!("/api/water-quality/{}/", reading.id)).await.assert_status_not_found();
    }
}
