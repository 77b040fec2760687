//! API request/response models for rooms.

use super::pagination::Pagination;
use crate::db::models::rooms::RoomDBResponse;
use crate::errors::Error;
use crate::types::{RoomId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Room creation payload. When `room_owner_id` is omitted, the creator
/// becomes the owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomCreate {
    pub room_number: String,
    pub room_place: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_owner_id: Option<UserId>,
}

/// Partial update of a room. Absent fields are untouched; the owner can be
/// explicitly cleared with `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RoomUpdate {
    pub room_number: Option<String>,
    pub room_place: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_owner_id: Option<Option<UserId>>,
}

/// Room response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomId,
    pub room_number: String,
    pub room_place: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing rooms
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListRoomsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl RoomCreate {
    pub fn validate(&self) -> Result<(), Error> {
        super::validate_required_string("room_number", &self.room_number)?;
        super::validate_required_string("room_place", &self.room_place)?;
        Ok(())
    }
}

impl RoomUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(room_number) = &self.room_number {
            super::validate_required_string("room_number", room_number)?;
        }
        if let Some(room_place) = &self.room_place {
            super::validate_required_string("room_place", room_place)?;
        }
        Ok(())
    }
}

impl From<RoomDBResponse> for RoomResponse {
    fn from(db: RoomDBResponse) -> Self {
        Self {
            id: db.id,
            room_number: db.room_number,
            room_place: db.room_place,
            room_owner_id: db.room_owner_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
