//! Core domain logic for the Marginalia comment system.
//!
//! Everything in here is pure: the rich-content model, the text projector,
//! the content validator, request schemas and the HTML renderer. None of it
//! touches storage or HTTP.

pub mod content;
pub mod error;
pub mod render;
pub mod roles;
pub mod schemas;
pub mod types;
