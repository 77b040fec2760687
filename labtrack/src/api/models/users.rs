//! API request/response models for users.

use super::pagination::Pagination;
use crate::db::models::users::UserDBResponse;
use crate::errors::Error;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Admin-supplied user creation payload. Role flags default to off.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_part_of_lab: bool,
    #[serde(default)]
    pub can_edit_items: bool,
    #[serde(default)]
    pub can_edit_labs: bool,
    #[serde(default)]
    pub can_edit_users: bool,
}

fn default_true() -> bool {
    true
}

/// Self-registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Update of one's own profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserUpdateMe {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Sparse update of the lab permission flags. Only supplied flags change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserPermissionsUpdate {
    pub is_part_of_lab: Option<bool>,
    pub can_edit_items: Option<bool>,
    pub can_edit_labs: Option<bool>,
    pub can_edit_users: Option<bool>,
}

/// User response model (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, as resolved by the request extractor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), Error> {
        super::validate_email(&self.email)?;
        if let Some(full_name) = &self.full_name {
            super::validate_optional_string("full_name", full_name)?;
        }
        Ok(())
    }
}

impl UserRegister {
    pub fn validate(&self) -> Result<(), Error> {
        super::validate_email(&self.email)?;
        if let Some(full_name) = &self.full_name {
            super::validate_optional_string("full_name", full_name)?;
        }
        Ok(())
    }
}

impl UserUpdateMe {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(email) = &self.email {
            super::validate_email(email)?;
        }
        if let Some(full_name) = &self.full_name {
            super::validate_optional_string("full_name", full_name)?;
        }
        Ok(())
    }
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            full_name: db.full_name,
            is_active: db.is_active,
            is_superuser: db.is_superuser,
            is_part_of_lab: db.is_part_of_lab,
            can_edit_items: db.can_edit_items,
            can_edit_labs: db.can_edit_labs,
            can_edit_users: db.can_edit_users,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            full_name: db.full_name,
            is_active: db.is_active,
            is_superuser: db.is_superuser,
            is_part_of_lab: db.is_part_of_lab,
            can_edit_items: db.can_edit_items,
            can_edit_labs: db.can_edit_labs,
            can_edit_users: db.can_edit_users,
        }
    }
}
