//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- Requires a valid session token.
//! - [`auth::MaybeAuthUser`] -- Accepts anonymous requests.

pub mod auth;
