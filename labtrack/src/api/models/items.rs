//! API request/response models for inventory items.

use super::pagination::Pagination;
use crate::db::models::items::ItemDBResponse;
use crate::errors::Error;
use crate::types::{ItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Item creation payload. Whatever the caller supplies for the owner is
/// discarded - new items always start unheld.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemCreate {
    pub item_name: String,
    pub current_room: Option<String>,
    pub table_name: Option<String>,
    pub system_name: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub current_owner_id: Option<UserId>,
    pub taken_at: Option<DateTime<Utc>>,
    pub item_img_url: Option<String>,
    pub item_vendor: Option<String>,
    pub item_params: Option<String>,
    pub is_available: Option<bool>,
}

/// Partial update of item metadata. Absent fields are untouched; the three
/// nullable fields can be explicitly cleared with `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemUpdate {
    pub item_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub item_img_url: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub item_vendor: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub item_params: Option<Option<String>>,
}

/// Take-or-return payload. Any supplied field (including an explicit null)
/// is applied verbatim; for omitted fields the handler defaults the owner to
/// the caller, `taken_at` to now, and `is_available` to false.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemTake {
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub current_room: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub table_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub system_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub current_owner_id: Option<Option<UserId>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub taken_at: Option<Option<DateTime<Utc>>>,
    pub is_available: Option<bool>,
}

/// Item response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ItemId,
    pub item_name: String,
    pub current_room: Option<String>,
    pub table_name: Option<String>,
    pub system_name: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub current_owner_id: Option<UserId>,
    pub taken_at: Option<DateTime<Utc>>,
    pub item_img_url: Option<String>,
    pub item_vendor: Option<String>,
    pub item_params: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing items
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListItemsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl ItemCreate {
    pub fn validate(&self) -> Result<(), Error> {
        super::validate_required_string("item_name", &self.item_name)?;
        for (field, value) in [
            ("current_room", &self.current_room),
            ("table_name", &self.table_name),
            ("system_name", &self.system_name),
            ("item_img_url", &self.item_img_url),
            ("item_vendor", &self.item_vendor),
            ("item_params", &self.item_params),
        ] {
            if let Some(value) = value {
                super::validate_optional_string(field, value)?;
            }
        }
        Ok(())
    }
}

impl ItemUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(item_name) = &self.item_name {
            super::validate_required_string("item_name", item_name)?;
        }
        for (field, value) in [
            ("item_img_url", &self.item_img_url),
            ("item_vendor", &self.item_vendor),
            ("item_params", &self.item_params),
        ] {
            if let Some(Some(value)) = value {
                super::validate_optional_string(field, value)?;
            }
        }
        Ok(())
    }
}

impl ItemTake {
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("current_room", &self.current_room),
            ("table_name", &self.table_name),
            ("system_name", &self.system_name),
        ] {
            if let Some(Some(value)) = value {
                super::validate_optional_string(field, value)?;
            }
        }
        Ok(())
    }
}

impl From<ItemDBResponse> for ItemResponse {
    fn from(db: ItemDBResponse) -> Self {
        Self {
            id: db.id,
            item_name: db.item_name,
            current_room: db.current_room,
            table_name: db.table_name,
            system_name: db.system_name,
            current_owner_id: db.current_owner_id,
            taken_at: db.taken_at,
            item_img_url: db.item_img_url,
            item_vendor: db.item_vendor,
            item_params: db.item_params,
            is_available: db.is_available,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
