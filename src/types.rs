//! Common type definitions.
//!
//! This module defines type aliases for entity IDs. All entities use
//! database-assigned integer primary keys, wrapped in aliases so signatures
//! say which entity they refer to:
//!
//! - [`MaintainerId`]: Maintainer account identifier
//! - [`WaterUnitId`]: Water unit identifier
//! - [`WaterQualityId`]: Quality reading identifier
//! - [`MaintenanceId`]: Maintenance record identifier

// Type aliases for IDs
pub type MaintainerId = i64;
pub type WaterUnitId = i64;
pub type WaterQualityId = i64;
pub type MaintenanceId = i64;
