//! Database models for maintainers.

use crate::types::MaintainerId;

/// Database request for creating a new maintainer
#[derive(Debug, Clone)]
pub struct MaintainerCreateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Database request for updating a maintainer
#[derive(Debug, Clone, Default)]
pub struct MaintainerUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Database response for a maintainer
#[derive(Debug, Clone)]
pub struct MaintainerDBResponse {
    pub id: MaintainerId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}
