//! API models for maintainer identity.

use crate::db::models::maintainers::MaintainerDBResponse;
use crate::types::MaintainerId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated maintainer, extracted from request credentials.
///
/// Taking this as a handler argument is what makes an endpoint require
/// authentication; handlers without it are open.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentMaintainer {
    pub id: MaintainerId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Maintainer profile returned by the user-info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintainerResponse {
    pub id: MaintainerId,
    pub name: String,
    pub email: String,
}

impl From<MaintainerDBResponse> for CurrentMaintainer {
    fn from(db: MaintainerDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            is_admin: db.is_admin,
        }
    }
}

impl From<MaintainerDBResponse> for MaintainerResponse {
    fn from(db: MaintainerDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
        }
    }
}

impl From<CurrentMaintainer> for MaintainerResponse {
    fn from(current: CurrentMaintainer) -> Self {
        Self {
            id: current.id,
            name: current.name,
            email: current.email,
        }
    }
}
