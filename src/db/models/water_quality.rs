//! Database models for water quality readings.

use crate::api::models::water_quality::WaterQualityUpdate;
use crate::types::{WaterQualityId, WaterUnitId};
use chrono::{DateTime, Utc};

/// Database request for creating a new water quality reading.
///
/// The reading timestamp is stamped by the caller at creation time, never
/// taken from client input.
#[derive(Debug, Clone)]
pub struct WaterQualityCreateDBRequest {
    pub water_unit_id: WaterUnitId,
    pub date_time: DateTime<Utc>,
    pub tds: f64,
}

/// Database request for updating a water quality reading.
///
/// `date_time` is immutable after creation, so it has no update field.
#[derive(Debug, Clone, Default)]
pub struct WaterQualityUpdateDBRequest {
    pub water_unit_id: Option<WaterUnitId>,
    pub tds: Option<f64>,
}

impl WaterQualityUpdateDBRequest {
    pub fn new(update: WaterQualityUpdate) -> Self {
        Self {
            water_unit_id: update.wu,
            tds: update.tds,
        }
    }
}

/// Database response for a water quality reading
#[derive(Debug, Clone)]
pub struct WaterQualityDBResponse {
    pub id: WaterQualityId,
    pub water_unit_id: WaterUnitId,
    pub date_time: DateTime<Utc>,
    pub tds: f64,
}
