//! Authentication and authorization.
//!
//! # Authentication
//!
//! Requests authenticate with a JWT session token, presented either as a
//! `Bearer` token in the `Authorization` header (API clients) or as an
//! HTTP-only session cookie set by the login endpoint (browser clients).
//! The token carries only the user id and expiry; [`current_user`] resolves
//! the subject against the database on every request, so permission-flag
//! changes take effect without re-login. Inactive users are rejected.
//!
//! # Authorization
//!
//! Authorization is flag-based: each user row carries independent boolean
//! role flags, and every route requires a [`crate::types::Capability`]
//! derived from the (resource, operation) pair by the single policy function
//! in [`permissions`]. Routes that gate before touching data use the
//! [`permissions::RequiresPermission`] extractor; item routes check
//! existence first and call the policy function afterwards.
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`session`]: JWT session token creation and verification
//! - [`current_user`]: the `CurrentUser` request extractor
//! - [`permissions`]: capability policy and the `RequiresPermission` extractor

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
