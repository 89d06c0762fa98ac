//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Maintainers`]: Maintainer accounts and credential lookups
//! - [`Tokens`]: Opaque auth token lifecycle (one per maintainer)
//! - [`WaterUnits`]: Monitored water installations
//! - [`WaterQuality`]: Sensor readings with filtering and ordering
//! - [`Maintenance`]: Maintenance reports with filtering and ordering
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use aquamon::db::handlers::{WaterUnits, Repository};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = WaterUnits::new(&mut tx);
//!
//!     // Perform operations
//!     let units = repo.list(&WaterUnitFilter::default()).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod maintainers;
pub mod maintenance;
pub mod repository;
pub mod tokens;
pub mod water_quality;
pub mod water_units;

pub use maintainers::Maintainers;
pub use maintenance::Maintenance;
pub use repository::Repository;
pub use tokens::Tokens;
pub use water_quality::WaterQuality;
pub use water_units::WaterUnits;
