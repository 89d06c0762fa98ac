//! Database models for auth tokens.
//!
//! Tokens are opaque random keys. The key itself is the primary key, and each
//! maintainer holds at most one token at a time.

use crate::types::MaintainerId;
use chrono::{DateTime, Utc};

/// Database response for an auth token
#[derive(Debug, Clone)]
pub struct TokenDBResponse {
    pub key: String,
    pub maintainer_id: MaintainerId,
    pub created: DateTime<Utc>,
}
