//! Database models for users.

use crate::api::models::users::{UserCreate, UserPermissionsUpdate, UserRegister, UserUpdateMe};
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
}

impl UserCreateDBRequest {
    /// Build a create request from an admin-supplied payload and a precomputed hash.
    pub fn from_create(api: UserCreate, hashed_password: String) -> Self {
        Self {
            email: api.email,
            full_name: api.full_name,
            hashed_password,
            is_active: api.is_active,
            is_superuser: false, // API users cannot create superusers
            is_part_of_lab: api.is_part_of_lab,
            can_edit_items: api.can_edit_items,
            can_edit_labs: api.can_edit_labs,
            can_edit_users: api.can_edit_users,
        }
    }

    /// Build a create request from a self-registration payload.
    ///
    /// Self-registered users start active with every lab flag off; flags are
    /// granted later through the permission-update operation.
    pub fn from_register(api: UserRegister, hashed_password: String) -> Self {
        Self {
            email: api.email,
            full_name: api.full_name,
            hashed_password,
            is_active: true,
            is_superuser: false,
            is_part_of_lab: false,
            can_edit_items: false,
            can_edit_labs: false,
            can_edit_users: false,
        }
    }
}

/// Database request for updating a user.
///
/// Absent fields are left untouched. `full_name` is the only nullable column
/// reachable here, hence the double option.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub email: Option<String>,
    pub full_name: Option<Option<String>>,
    pub hashed_password: Option<String>,
    pub is_part_of_lab: Option<bool>,
    pub can_edit_items: Option<bool>,
    pub can_edit_labs: Option<bool>,
    pub can_edit_users: Option<bool>,
}

impl From<UserUpdateMe> for UserUpdateDBRequest {
    fn from(api: UserUpdateMe) -> Self {
        Self {
            email: api.email,
            full_name: api.full_name.map(Some),
            ..Default::default()
        }
    }
}

impl From<UserPermissionsUpdate> for UserUpdateDBRequest {
    fn from(api: UserPermissionsUpdate) -> Self {
        Self {
            is_part_of_lab: api.is_part_of_lab,
            can_edit_items: api.can_edit_items,
            can_edit_labs: api.can_edit_labs,
            can_edit_users: api.can_edit_users,
            ..Default::default()
        }
    }
}

/// Database response for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
