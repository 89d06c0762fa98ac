//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Model Categories
//!
//! ## Identity
//!
//! - [`maintainers`]: Maintainer accounts and credentials
//! - [`tokens`]: Opaque bearer tokens, one per maintainer
//!
//! ## Resources
//!
//! - [`water_units`]: Monitored water installations
//! - [`water_quality`]: Timestamped sensor readings per unit
//! - [`maintenance`]: Maintenance visit reports per unit
//!
//! # Conversion to API Models
//!
//! Database models typically implement `From` or `Into` conversions to API models:
//!
//! ```ignore
//! use aquamon::db::models::water_units::WaterUnitDBResponse;
//! use aquamon::api::models::water_units::WaterUnitResponse;
//!
//! let db_unit: WaterUnitDBResponse = /* ... */;
//! let api_response: WaterUnitResponse = db_unit.into();
//! ```

pub mod maintainers;
pub mod maintenance;
pub mod tokens;
pub mod water_quality;
pub mod water_units;
