//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/register/`, `/api/login/`, `/api/logout/`,
//!   `/api/user/`, `/api/csrf/`): session lifecycle and the caller's profile
//! - **Water units** (`/api/water-unit/`): the monitored installations
//! - **Water quality** (`/api/water-quality/`): TDS readings per unit
//! - **Maintenance** (`/api/maintenance/`): problem reports per unit
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The generated
//! document is served at `/api-docs/openapi.json` with a Scalar UI at `/docs`.

pub mod handlers;
pub mod models;
