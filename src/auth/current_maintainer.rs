//! Extraction of the authenticated maintainer from request credentials.

use crate::{
    AppState,
    api::models::maintainers::CurrentMaintainer,
    config::Config,
    db::{
        errors::DbError,
        handlers::{Maintainers, Repository, Tokens},
    },
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use sqlx::SqlitePool;
use tracing::{debug, instrument, trace};

/// Extract the token key from the Authorization header if present.
/// Returns:
/// - None: No Authorization header, or a scheme other than `Token`
/// - Some(Ok(key)): Token credential found
/// - Some(Err(error)): Header present but malformed
pub(crate) fn token_from_header(headers: &HeaderMap) -> Option<Result<String>> {
    let auth_header = headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    let key = auth_str.strip_prefix("Token ")?;
    Some(Ok(key.trim().to_string()))
}

/// Extract the token key from the session cookie if present.
/// Returns:
/// - None: No cookie with the configured session name
/// - Some(Ok(key)): Cookie found
/// - Some(Err(error)): Cookie header present but malformed
pub(crate) fn token_from_cookie(headers: &HeaderMap, config: &Config) -> Option<Result<String>> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name && !value.is_empty() {
                return Some(Ok(value.to_string()));
            }
        }
    }
    None
}

/// Resolve a token key to its owning maintainer.
#[instrument(skip(db, key))]
async fn resolve_token(db: &SqlitePool, key: &str) -> Result<CurrentMaintainer> {
    let mut conn = db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;

    let token = Tokens::new(&mut conn).get_by_key(key).await?;
    let Some(token) = token else {
        return Err(Error::Unauthenticated {
            message: Some("Invalid token.".to_string()),
        });
    };

    // Token rows cascade with their maintainer, so the owner lookup can only
    // miss if the maintainer was deleted in between.
    let maintainer = Maintainers::new(&mut conn).get_by_id(token.maintainer_id).await?;
    let Some(maintainer) = maintainer else {
        return Err(Error::Unauthenticated {
            message: Some("Invalid token.".to_string()),
        });
    };

    Ok(CurrentMaintainer {
        id: maintainer.id,
        name: maintainer.name,
        email: maintainer.email,
        is_admin: maintainer.is_admin,
    })
}

impl FromRequestParts<AppState> for CurrentMaintainer {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Header credentials are checked before the cookie. Once a credential
        // is present it decides the outcome: an invalid key is rejected
        // rather than falling through to the next method.
        match token_from_header(&parts.headers) {
            Some(Ok(key)) => {
                let maintainer = resolve_token(&state.db, &key).await?;
                debug!("Authenticated maintainer {} via Authorization header", maintainer.id);
                return Ok(maintainer);
            }
            Some(Err(e)) => return Err(e),
            None => trace!("No Authorization token credential"),
        }

        match token_from_cookie(&parts.headers, &state.config) {
            Some(Ok(key)) => {
                let maintainer = resolve_token(&state.db, &key).await?;
                debug!("Authenticated maintainer {} via session cookie", maintainer.id);
                return Ok(maintainer);
            }
            Some(Err(e)) => return Err(e),
            None => trace!("No session cookie credential"),
        }

        Err(Error::Unauthenticated { message: None })
    }
}
