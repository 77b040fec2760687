//! Database repository for inventory items.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::items::{ItemCreateDBRequest, ItemDBResponse, ItemUpdateDBRequest},
};
use crate::types::{ItemId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing items
#[derive(Debug, Clone)]
pub struct ItemFilter {
    pub skip: i64,
    pub limit: i64,
}

impl ItemFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Items<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Items<'c> {
    type CreateRequest = ItemCreateDBRequest;
    type UpdateRequest = ItemUpdateDBRequest;
    type Response = ItemDBResponse;
    type Id = ItemId;
    type Filter = ItemFilter;

    #[instrument(skip(self, request), fields(item_name = %request.item_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item_id = Uuid::new_v4();

        let item = sqlx::query_as::<_, ItemDBResponse>(
            r#"
            INSERT INTO items (id, item_name, current_room, table_name, system_name,
                               current_owner_id, taken_at, item_img_url, item_vendor,
                               item_params, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(&request.item_name)
        .bind(&request.current_room)
        .bind(&request.table_name)
        .bind(&request.system_name)
        .bind(request.current_owner_id)
        .bind(request.taken_at)
        .bind(&request.item_img_url)
        .bind(&request.item_vendor)
        .bind(&request.item_params)
        .bind(request.is_available)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, ItemDBResponse>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(item)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = sqlx::query_as::<_, ItemDBResponse>("SELECT * FROM items ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Each nullable column gets a set-flag/value pair so that "absent" and
        // "explicitly null" stay distinguishable all the way into SQL.
        let item = sqlx::query_as::<_, ItemDBResponse>(
            r#"
            UPDATE items SET
                item_name = COALESCE($2, item_name),
                current_room = CASE WHEN $3 THEN $4 ELSE current_room END,
                table_name = CASE WHEN $5 THEN $6 ELSE table_name END,
                system_name = CASE WHEN $7 THEN $8 ELSE system_name END,
                current_owner_id = CASE WHEN $9 THEN $10 ELSE current_owner_id END,
                taken_at = CASE WHEN $11 THEN $12 ELSE taken_at END,
                item_img_url = CASE WHEN $13 THEN $14 ELSE item_img_url END,
                item_vendor = CASE WHEN $15 THEN $16 ELSE item_vendor END,
                item_params = CASE WHEN $17 THEN $18 ELSE item_params END,
                is_available = COALESCE($19, is_available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.item_name)
        .bind(request.current_room.is_some())
        .bind(request.current_room.clone().flatten())
        .bind(request.table_name.is_some())
        .bind(request.table_name.clone().flatten())
        .bind(request.system_name.is_some())
        .bind(request.system_name.clone().flatten())
        .bind(request.current_owner_id.is_some())
        .bind(request.current_owner_id.flatten())
        .bind(request.taken_at.is_some())
        .bind(request.taken_at.flatten())
        .bind(request.item_img_url.is_some())
        .bind(request.item_img_url.clone().flatten())
        .bind(request.item_vendor.is_some())
        .bind(request.item_vendor.clone().flatten())
        .bind(request.item_params.is_some())
        .bind(request.item_params.clone().flatten())
        .bind(request.is_available)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(item)
    }
}

impl<'c> Items<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total number of items, independent of pagination.
    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
