//! Database models for inventory items.

use crate::api::models::items::{ItemCreate, ItemTake, ItemUpdate};
use crate::types::{ItemId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new item
#[derive(Debug, Clone)]
pub struct ItemCreateDBRequest {
    pub item_name: String,
    pub current_room: Option<String>,
    pub table_name: Option<String>,
    pub system_name: Option<String>,
    pub current_owner_id: Option<UserId>,
    pub taken_at: Option<DateTime<Utc>>,
    pub item_img_url: Option<String>,
    pub item_vendor: Option<String>,
    pub item_params: Option<String>,
    pub is_available: bool,
}

impl From<ItemCreate> for ItemCreateDBRequest {
    fn from(api: ItemCreate) -> Self {
        Self {
            item_name: api.item_name,
            current_room: api.current_room,
            table_name: api.table_name,
            system_name: api.system_name,
            current_owner_id: None, // New items are always unheld, regardless of input
            taken_at: api.taken_at,
            item_img_url: api.item_img_url,
            item_vendor: api.item_vendor,
            item_params: api.item_params,
            is_available: api.is_available.unwrap_or(true),
        }
    }
}

/// Database request for updating an item.
///
/// Covers both the edit and take paths: absent fields are left untouched,
/// `Option<Option<T>>` fields can be explicitly set to null.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdateDBRequest {
    pub item_name: Option<String>,
    pub current_room: Option<Option<String>>,
    pub table_name: Option<Option<String>>,
    pub system_name: Option<Option<String>>,
    pub current_owner_id: Option<Option<UserId>>,
    pub taken_at: Option<Option<DateTime<Utc>>>,
    pub item_img_url: Option<Option<String>>,
    pub item_vendor: Option<Option<String>>,
    pub item_params: Option<Option<String>>,
    pub is_available: Option<bool>,
}

impl From<ItemUpdate> for ItemUpdateDBRequest {
    fn from(api: ItemUpdate) -> Self {
        Self {
            item_name: api.item_name,
            item_img_url: api.item_img_url,
            item_vendor: api.item_vendor,
            item_params: api.item_params,
            ..Default::default()
        }
    }
}

/// Taking (or returning) an item is an update where omitted fields default to
/// "the caller takes it now": owner becomes the caller, `taken_at` becomes the
/// current time, the item becomes unavailable. Explicitly supplied fields,
/// including explicit nulls, are applied verbatim - returning an item means
/// sending `current_owner_id: null, is_available: true`.
impl From<(ItemTake, UserId)> for ItemUpdateDBRequest {
    fn from((take, taker): (ItemTake, UserId)) -> Self {
        Self {
            item_name: None,
            current_room: take.current_room,
            table_name: take.table_name,
            system_name: take.system_name,
            current_owner_id: Some(take.current_owner_id.unwrap_or(Some(taker))),
            taken_at: Some(take.taken_at.unwrap_or_else(|| Some(Utc::now()))),
            is_available: Some(take.is_available.unwrap_or(false)),
            item_img_url: None,
            item_vendor: None,
            item_params: None,
        }
    }
}

/// Database response for an item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemDBResponse {
    pub id: ItemId,
    pub item_name: String,
    pub current_room: Option<String>,
    pub table_name: Option<String>,
    pub system_name: Option<String>,
    pub current_owner_id: Option<UserId>,
    pub taken_at: Option<DateTime<Utc>>,
    pub item_img_url: Option<String>,
    pub item_vendor: Option<String>,
    pub item_params: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
