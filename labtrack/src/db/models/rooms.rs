//! Database models for rooms.

use crate::api::models::rooms::{RoomCreate, RoomUpdate};
use crate::types::{RoomId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new room
#[derive(Debug, Clone)]
pub struct RoomCreateDBRequest {
    pub room_number: String,
    pub room_place: String,
    pub room_owner_id: Option<UserId>,
}

/// Rooms without an explicit owner belong to whoever created them.
impl From<(RoomCreate, UserId)> for RoomCreateDBRequest {
    fn from((api, creator): (RoomCreate, UserId)) -> Self {
        Self {
            room_number: api.room_number,
            room_place: api.room_place,
            room_owner_id: Some(api.room_owner_id.unwrap_or(creator)),
        }
    }
}

/// Database request for updating a room. Absent fields are left untouched;
/// the owner can be explicitly cleared.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdateDBRequest {
    pub room_number: Option<String>,
    pub room_place: Option<String>,
    pub room_owner_id: Option<Option<UserId>>,
}

impl From<RoomUpdate> for RoomUpdateDBRequest {
    fn from(api: RoomUpdate) -> Self {
        Self {
            room_number: api.room_number,
            room_place: api.room_place,
            room_owner_id: api.room_owner_id,
        }
    }
}

/// Database response for a room
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomDBResponse {
    pub id: RoomId,
    pub room_number: String,
    pub room_place: String,
    pub room_owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
