//! Database models for maintenance reports.

use crate::api::models::maintenance::MaintenanceUpdate;
use crate::types::{MaintainerId, MaintenanceId, WaterUnitId};
use chrono::{DateTime, Utc};

/// Database request for creating a new maintenance report.
///
/// `maintainer_id` is stamped from the authenticated caller, and `datetime`
/// carries the client value when supplied or the current time otherwise.
#[derive(Debug, Clone)]
pub struct MaintenanceCreateDBRequest {
    pub water_unit_id: WaterUnitId,
    pub datetime: DateTime<Utc>,
    pub problem: String,
    pub description: String,
    pub maintainer_id: Option<MaintainerId>,
}

/// Database request for updating a maintenance report.
///
/// `maintainer_id` distinguishes "leave unchanged" (outer `None`) from
/// "set to NULL" (inner `None`).
#[derive(Debug, Clone, Default)]
pub struct MaintenanceUpdateDBRequest {
    pub water_unit_id: Option<WaterUnitId>,
    pub datetime: Option<DateTime<Utc>>,
    pub problem: Option<String>,
    pub description: Option<String>,
    pub maintainer_id: Option<Option<MaintainerId>>,
}

impl MaintenanceUpdateDBRequest {
    pub fn new(update: MaintenanceUpdate) -> Self {
        Self {
            water_unit_id: update.wu,
            datetime: update.datetime,
            problem: update.problem,
            description: update.description,
            maintainer_id: update.maintainer,
        }
    }
}

/// Database response for a maintenance report
#[derive(Debug, Clone)]
pub struct MaintenanceDBResponse {
    pub id: MaintenanceId,
    pub water_unit_id: WaterUnitId,
    pub datetime: DateTime<Utc>,
    pub problem: String,
    pub description: String,
    pub maintainer_id: Option<MaintainerId>,
}
