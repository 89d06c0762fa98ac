//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication checks (via the [`CurrentMaintainer`] extractor)
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout, CSRF, and the caller's profile
//! - [`water_units`]: Water unit CRUD
//! - [`water_quality`]: Water quality reading CRUD with filtering/ordering
//! - [`maintenance`]: Maintenance report CRUD with filtering/ordering
//!
//! # Authorization
//!
//! Read endpoints are open. Write endpoints take a
//! [`CurrentMaintainer`] argument, which rejects unauthenticated requests
//! with 401 before the handler body runs.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the
//! appropriate HTTP status code and JSON error body.
//!
//! [`CurrentMaintainer`]: crate::api::models::maintainers::CurrentMaintainer

pub mod auth;
pub mod maintenance;
pub mod water_quality;
pub mod water_units;
