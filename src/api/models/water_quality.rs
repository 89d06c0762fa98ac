//! API models for water quality readings.
//!
//! The reading timestamp is server-assigned. Neither [`WaterQualityCreate`]
//! nor [`WaterQualityUpdate`] carries a `date_time` field, so any client
//! attempt to set one is dropped during deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::handlers::water_quality::WaterQualityFilter;
use crate::db::models::water_quality::{WaterQualityCreateDBRequest, WaterQualityDBResponse};
use crate::errors::{Error, ValidationErrors};
use crate::types::{WaterQualityId, WaterUnitId};

/// Request to record a water quality reading.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WaterQualityCreate {
    /// Water unit the reading belongs to
    pub wu: Option<WaterUnitId>,
    /// Total dissolved solids, in ppm
    pub tds: Option<f64>,
}

impl WaterQualityCreate {
    /// Check required fields and stamp the reading with the given timestamp.
    pub fn validate(self, date_time: DateTime<Utc>) -> Result<WaterQualityCreateDBRequest, Error> {
        let mut errors = ValidationErrors::new();

        if self.wu.is_none() {
            errors.add("wu", "This field is required.");
        }
        if self.tds.is_none() {
            errors.add("tds", "This field is required.");
        }

        match (self.wu, self.tds) {
            (Some(wu), Some(tds)) if errors.is_empty() => Ok(WaterQualityCreateDBRequest {
                water_unit_id: wu,
                date_time,
                tds,
            }),
            _ => Err(Error::Validation { errors }),
        }
    }
}

/// Partial update to a reading. Absent fields are left unchanged; the
/// timestamp cannot be changed at all.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct WaterQualityUpdate {
    /// Move the reading to another water unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wu: Option<WaterUnitId>,
    /// New TDS value, in ppm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tds: Option<f64>,
}

/// Water quality reading as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WaterQualityResponse {
    /// Reading ID
    pub id: WaterQualityId,
    /// Water unit the reading belongs to
    pub wu: WaterUnitId,
    /// When the reading was recorded (server-assigned)
    pub date_time: DateTime<Utc>,
    /// Total dissolved solids, in ppm
    pub tds: f64,
}

impl From<WaterQualityDBResponse> for WaterQualityResponse {
    fn from(reading: WaterQualityDBResponse) -> Self {
        Self {
            id: reading.id,
            wu: reading.water_unit_id,
            date_time: reading.date_time,
            tds: reading.tds,
        }
    }
}

/// Query parameters for listing readings. Filters combine with AND;
/// unrecognized parameters are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WaterQualityListQuery {
    /// Only readings for this water unit
    pub wu: Option<WaterUnitId>,
    /// Only readings with exactly this TDS value
    pub tds: Option<f64>,
    /// Only readings taken on this calendar day (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Only readings taken at exactly this instant
    pub date_time: Option<DateTime<Utc>>,
    /// Only readings with TDS at or above this value
    pub min_tds: Option<f64>,
    /// Only readings with TDS at or below this value
    pub max_tds: Option<f64>,
    /// Sort key: `date_time`, `tds`, or `wu`, with a `-` prefix for
    /// descending. Defaults to newest first.
    pub ordering: Option<String>,
}

impl From<WaterQualityListQuery> for WaterQualityFilter {
    fn from(query: WaterQualityListQuery) -> Self {
        Self {
            water_unit_id: query.wu,
            tds: query.tds,
            date: query.date,
            date_time: query.date_time,
            min_tds: query.min_tds,
            max_tds: query.max_tds,
            ordering: query.ordering,
        }
    }
}
