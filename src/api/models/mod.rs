//! API request/response models.
//!
//! This module contains the data structures used for HTTP request and
//! response bodies, separate from the database models in
//! [`crate::db::models`]. Request models for create operations carry
//! `Option` fields and a `validate` step so that missing required fields
//! produce field-level 400 responses instead of deserialization rejections.
//!
//! # Model Categories
//!
//! - [`auth`]: Registration, login, logout, and CSRF payloads
//! - [`maintainers`]: Maintainer identity as seen by clients
//! - [`water_units`]: Water unit CRUD payloads
//! - [`water_quality`]: Reading CRUD payloads and list filters
//! - [`maintenance`]: Report CRUD payloads and list filters

pub mod auth;
pub mod maintainers;
pub mod maintenance;
pub mod water_quality;
pub mod water_units;
