//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 session-token validation.

pub mod jwt;
