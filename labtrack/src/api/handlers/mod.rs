//! API request handlers, one module per resource.

pub mod auth;
pub mod items;
pub mod rooms;
pub mod users;
