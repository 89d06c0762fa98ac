//! API models for water units.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::water_units::{WaterUnitCreateDBRequest, WaterUnitDBResponse};
use crate::errors::{Error, ValidationErrors};
use crate::types::WaterUnitId;

/// Request to register a new water unit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WaterUnitCreate {
    /// Where the unit is installed
    pub location: Option<String>,
    /// Human-readable unit name
    pub name: Option<String>,
}

impl WaterUnitCreate {
    /// Check required fields and lengths, producing the database request.
    pub fn validate(self) -> Result<WaterUnitCreateDBRequest, Error> {
        let mut errors = ValidationErrors::new();

        if let Some(location) = &self.location {
            if location.chars().count() > 255 {
                errors.add("location", "Ensure this field has no more than 255 characters.");
            }
        } else {
            errors.add("location", "This field is required.");
        }

        if let Some(name) = &self.name {
            if name.chars().count() > 255 {
                errors.add("name", "Ensure this field has no more than 255 characters.");
            }
        } else {
            errors.add("name", "This field is required.");
        }

        match (self.location, self.name) {
            (Some(location), Some(name)) if errors.is_empty() => Ok(WaterUnitCreateDBRequest { location, name }),
            _ => Err(Error::Validation { errors }),
        }
    }
}

/// Partial update to a water unit. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct WaterUnitUpdate {
    /// New location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WaterUnitUpdate {
    /// Check lengths on the fields that carry them.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();

        if let Some(location) = &self.location {
            if location.chars().count() > 255 {
                errors.add("location", "Ensure this field has no more than 255 characters.");
            }
        }
        if let Some(name) = &self.name {
            if name.chars().count() > 255 {
                errors.add("name", "Ensure this field has no more than 255 characters.");
            }
        }

        errors.into_result()
    }
}

/// Water unit as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WaterUnitResponse {
    /// Unit ID
    pub id: WaterUnitId,
    /// Where the unit is installed
    pub location: String,
    /// Human-readable unit name
    pub name: String,
}

impl From<WaterUnitDBResponse> for WaterUnitResponse {
    fn from(unit: WaterUnitDBResponse) -> Self {
        Self {
            id: unit.id,
            location: unit.location,
            name: unit.name,
        }
    }
}
