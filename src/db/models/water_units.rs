//! Database models for water units.

use crate::api::models::water_units::WaterUnitUpdate;
use crate::types::WaterUnitId;

/// Database request for creating a new water unit
#[derive(Debug, Clone)]
pub struct WaterUnitCreateDBRequest {
    pub location: String,
    pub name: String,
}

/// Database request for updating a water unit
#[derive(Debug, Clone, Default)]
pub struct WaterUnitUpdateDBRequest {
    pub location: Option<String>,
    pub name: Option<String>,
}

impl WaterUnitUpdateDBRequest {
    pub fn new(update: WaterUnitUpdate) -> Self {
        Self {
            location: update.location,
            name: update.name,
        }
    }
}

/// Database response for a water unit
#[derive(Debug, Clone)]
pub struct WaterUnitDBResponse {
    pub id: WaterUnitId,
    pub location: String,
    pub name: String,
}
