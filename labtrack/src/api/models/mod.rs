//! API request/response models.
//!
//! DTOs are distinct from the database models in [`crate::db::models`]; the
//! conversions live on the database side so API types stay plain serde
//! structs. Update payloads distinguish "absent" from "explicitly null" with
//! `Option<Option<T>>` fields deserialized through
//! `serde_with::rust::double_option`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod auth;
pub mod items;
pub mod pagination;
pub mod rooms;
pub mod users;

/// Maximum length for user-supplied string fields, matching the VARCHAR(255)
/// columns.
pub const MAX_STRING_LENGTH: usize = 255;

/// Generic confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Reject a required string that is empty or over the column cap.
pub(crate) fn validate_required_string(field: &str, value: &str) -> Result<(), crate::errors::Error> {
    if value.is_empty() {
        return Err(crate::errors::Error::BadRequest {
            message: format!("{field} must not be empty"),
        });
    }
    validate_optional_string(field, value)
}

/// Reject a string over the column cap.
pub(crate) fn validate_optional_string(field: &str, value: &str) -> Result<(), crate::errors::Error> {
    if value.chars().count() > MAX_STRING_LENGTH {
        return Err(crate::errors::Error::BadRequest {
            message: format!("{field} must be at most {MAX_STRING_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Minimal shape check for email addresses; real validation happens when the
/// address is used.
pub(crate) fn validate_email(value: &str) -> Result<(), crate::errors::Error> {
    validate_required_string("email", value)?;
    let Some((local, domain)) = value.split_once('@') else {
        return Err(crate::errors::Error::BadRequest {
            message: "email is not a valid email address".to_string(),
        });
    };
    if local.is_empty() || domain.is_empty() {
        return Err(crate::errors::Error::BadRequest {
            message: "email is not a valid email address".to_string(),
        });
    }
    Ok(())
}
