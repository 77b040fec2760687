//! HTTP API surface.
//!
//! - [`handlers`]: axum request handlers, one module per resource
//! - [`models`]: request/response DTOs with their validation rules
//!
//! Handlers authorize via [`crate::auth::permissions`], open a repository on
//! a pool connection or transaction, and convert database responses into API
//! responses. Validation errors surface before any store access.

pub mod handlers;
pub mod models;
