//! API models for maintenance reports.
//!
//! On creation the reporting maintainer is always the authenticated caller;
//! [`MaintenanceCreate`] has no `maintainer` field. Updates may reassign or
//! clear the maintainer, so [`MaintenanceUpdate`] distinguishes an absent
//! field from an explicit `null` with a double option.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::{IntoParams, ToSchema};

use crate::db::handlers::maintenance::MaintenanceFilter;
use crate::db::models::maintenance::{MaintenanceCreateDBRequest, MaintenanceDBResponse};
use crate::errors::{Error, ValidationErrors};
use crate::types::{MaintainerId, MaintenanceId, WaterUnitId};

/// Request to file a maintenance report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceCreate {
    /// Water unit the report is about
    pub wu: Option<WaterUnitId>,
    /// When the problem occurred. Defaults to the time of the request.
    pub datetime: Option<DateTime<Utc>>,
    /// Short problem summary
    pub problem: Option<String>,
    /// Free-form details
    pub description: Option<String>,
}

impl MaintenanceCreate {
    /// Check required fields, attributing the report to `maintainer_id` and
    /// defaulting the timestamp to `now`.
    pub fn validate(self, maintainer_id: MaintainerId, now: DateTime<Utc>) -> Result<MaintenanceCreateDBRequest, Error> {
        let mut errors = ValidationErrors::new();

        if self.wu.is_none() {
            errors.add("wu", "This field is required.");
        }

        if let Some(problem) = &self.problem {
            if problem.chars().count() > 255 {
                errors.add("problem", "Ensure this field has no more than 255 characters.");
            }
        } else {
            errors.add("problem", "This field is required.");
        }

        if self.description.is_none() {
            errors.add("description", "This field is required.");
        }

        match (self.wu, self.problem, self.description) {
            (Some(wu), Some(problem), Some(description)) if errors.is_empty() => Ok(MaintenanceCreateDBRequest {
                water_unit_id: wu,
                datetime: self.datetime.unwrap_or(now),
                problem,
                description,
                maintainer_id: Some(maintainer_id),
            }),
            _ => Err(Error::Validation { errors }),
        }
    }
}

/// Partial update to a maintenance report. Absent fields are left unchanged.
///
/// `maintainer` uses a double option: absent leaves the attribution alone,
/// `null` clears it, and an ID reassigns it.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceUpdate {
    /// Move the report to another water unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wu: Option<WaterUnitId>,
    /// New occurrence time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    /// New problem summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    /// New details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reassign (ID) or clear (null) the reporting maintainer
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub maintainer: Option<Option<MaintainerId>>,
}

impl MaintenanceUpdate {
    /// Check lengths on the fields that carry them.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();

        if let Some(problem) = &self.problem {
            if problem.chars().count() > 255 {
                errors.add("problem", "Ensure this field has no more than 255 characters.");
            }
        }

        errors.into_result()
    }
}

/// Maintenance report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceResponse {
    /// Report ID
    pub id: MaintenanceId,
    /// Water unit the report is about
    pub wu: WaterUnitId,
    /// When the problem occurred
    pub datetime: DateTime<Utc>,
    /// Short problem summary
    pub problem: String,
    /// Free-form details
    pub description: String,
    /// Maintainer who filed the report, if still attributed
    pub maintainer: Option<MaintainerId>,
}

impl From<MaintenanceDBResponse> for MaintenanceResponse {
    fn from(report: MaintenanceDBResponse) -> Self {
        Self {
            id: report.id,
            wu: report.water_unit_id,
            datetime: report.datetime,
            problem: report.problem,
            description: report.description,
            maintainer: report.maintainer_id,
        }
    }
}

/// Query parameters for listing reports. Filters combine with AND;
/// unrecognized parameters are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MaintenanceListQuery {
    /// Only reports for this water unit
    pub wu: Option<WaterUnitId>,
    /// Only reports filed by this maintainer
    pub maintainer: Option<MaintainerId>,
    /// Only reports from this calendar day (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Only reports with exactly this occurrence time
    pub datetime: Option<DateTime<Utc>>,
    /// Only reports whose problem contains this text (case-insensitive)
    pub problem_contains: Option<String>,
    /// Sort key: `datetime`, `wu`, or `maintainer`, with a `-` prefix for
    /// descending. Defaults to newest first.
    pub ordering: Option<String>,
}

impl From<MaintenanceListQuery> for MaintenanceFilter {
    fn from(query: MaintenanceListQuery) -> Self {
        Self {
            water_unit_id: query.wu,
            maintainer_id: query.maintainer,
            date: query.date,
            datetime: query.datetime,
            problem_contains: query.problem_contains,
            ordering: query.ordering,
        }
    }
}
