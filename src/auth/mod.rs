//! Authentication system.
//!
//! Identity is a maintainer account with an email and an Argon2-hashed
//! password. A successful register or login mints (or returns) the
//! maintainer's single opaque token, which the client presents on later
//! requests.
//!
//! # Authentication Methods
//!
//! The same token is accepted from two places:
//!
//! ## 1. Session Cookie
//!
//! Browser-based flow using an HTTP-only cookie:
//! - Clients register or log in via `/api/register/` and `/api/login/`
//! - The token key is stored in a secure, HTTP-only cookie
//! - Logout deletes the token server-side and expires the cookie
//!
//! ## 2. Authorization Header
//!
//! Header-based flow for programmatic access:
//! - Passed as `Authorization: Token <key>`
//! - No expiration (revoked on logout)
//!
//! # Authorization
//!
//! Write operations (create, update, delete) require an authenticated
//! maintainer; reads are open. Handlers opt into the requirement by taking a
//! [`CurrentMaintainer`](crate::api::models::maintainers::CurrentMaintainer)
//! argument.
//!
//! # Modules
//!
//! - [`current_maintainer`]: Extractor for the authenticated maintainer in handlers
//! - [`password`]: Password hashing and token minting using Argon2 and OS randomness
//! - [`session`]: Session and CSRF cookie assembly
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use aquamon::api::models::maintainers::CurrentMaintainer;
//! use axum::extract::State;
//!
//! async fn protected_handler(
//!     State(state): State<AppState>,
//!     maintainer: CurrentMaintainer,
//! ) -> Result<String, Error> {
//!     Ok(format!("Hello, {}!", maintainer.name))
//! }
//! ```

pub mod current_maintainer;
pub mod password;
pub mod session;
