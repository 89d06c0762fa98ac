//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries & filtering)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Repositories borrow a SQLx connection or transaction. Create them from a
//! transaction when an operation spans multiple statements:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = WaterUnits::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/`
//! directory. The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! aquamon::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
