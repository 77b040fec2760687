//! Request handlers for inventory items.
//!
//! Item routes check existence before permission, so the single-item
//! handlers extract [`CurrentUser`] and consult the policy after the fetch.
//! Listing is the one soft-denying route: callers outside the lab get an
//! empty page with a zero count instead of a 403.

use crate::api::models::items::{ItemCreate, ItemResponse, ItemTake, ItemUpdate, ListItemsQuery};
use crate::api::models::pagination::ListResponse;
use crate::api::models::users::CurrentUser;
use crate::api::models::Message;
use crate::auth::permissions::{self, RequiresPermission, operation, resource};
use crate::db::handlers::{Items, Repository, items::ItemFilter};
use crate::db::models::items::{ItemCreateDBRequest, ItemUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Capability, ItemId, Operation, Resource};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    summary = "List items",
    responses(
        (status = 200, description = "One page of items plus the total count; empty for callers outside the lab", body = ListResponse<ItemResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    params(ListItemsQuery),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_items(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ListResponse<ItemResponse>>> {
    // Non-members get an empty page, not an error. Rooms hard-deny instead;
    // both behaviors are part of the API contract.
    if !permissions::check(&user, Capability::LabMember) {
        return Ok(Json(ListResponse::empty()));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let items = repo.list(&ItemFilter::new(skip, limit)).await?;
    let count = repo.count().await?;

    Ok(Json(ListResponse::new(items.into_iter().map(ItemResponse::from).collect(), count)))
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    summary = "Get item by ID",
    responses(
        (status = 200, description = "The item", body = ItemResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a lab member"),
        (status = 404, description = "Item not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Item ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_item(State(state): State<AppState>, user: CurrentUser, Path(id): Path<ItemId>) -> Result<Json<ItemResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut conn);

    // Existence is checked before permission on item routes
    let item = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Item".to_string(),
        id: id.to_string(),
    })?;

    permissions::require(&user, Resource::Items, Operation::Read)?;

    Ok(Json(item.into()))
}

#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    summary = "Create a new item",
    request_body = ItemCreate,
    responses(
        (status = 200, description = "The created item", body = ItemResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot edit items"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_item(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Items, operation::Create>,
    Json(item): Json<ItemCreate>,
) -> Result<Json<ItemResponse>> {
    item.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut tx);

    let created = repo.create(&ItemCreateDBRequest::from(item)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(created.into()))
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    summary = "Update an item",
    request_body = ItemUpdate,
    responses(
        (status = 200, description = "The updated item", body = ItemResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot edit items"),
        (status = 404, description = "Item not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Item ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ItemId>,
    Json(update): Json<ItemUpdate>,
) -> Result<Json<ItemResponse>> {
    update.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut tx);

    if repo.get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Item".to_string(),
            id: id.to_string(),
        });
    }

    permissions::require(&user, Resource::Items, Operation::Update)?;

    let updated = repo.update(id, &ItemUpdateDBRequest::from(update)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/items/{id}/take",
    tag = "items",
    summary = "Take or return an item",
    description = "Applies the supplied fields, then defaults the owner to the caller, `taken_at` to now \
                   and `is_available` to false for fields omitted from the payload. Returning an item means \
                   explicitly sending `current_owner_id: null` and `is_available: true`.",
    request_body = ItemTake,
    responses(
        (status = 200, description = "The updated item", body = ItemResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a lab member"),
        (status = 404, description = "Item not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Item ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn take_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ItemId>,
    Json(take): Json<ItemTake>,
) -> Result<Json<ItemResponse>> {
    take.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut tx);

    if repo.get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Item".to_string(),
            id: id.to_string(),
        });
    }

    permissions::require(&user, Resource::Items, Operation::Take)?;

    let taken = repo.update(id, &ItemUpdateDBRequest::from((take, user.id))).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(taken.into()))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    summary = "Delete an item",
    responses(
        (status = 200, description = "Deletion confirmation", body = Message),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot edit items"),
        (status = 404, description = "Item not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Item ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_item(State(state): State<AppState>, user: CurrentUser, Path(id): Path<ItemId>) -> Result<Json<Message>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Items::new(&mut tx);

    if repo.get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Item".to_string(),
            id: id.to_string(),
        });
    }

    permissions::require(&user, Resource::Items, Operation::Delete)?;

    repo.delete(id).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(Message::new("Item deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{items::ItemResponse, pagination::ListResponse},
        db::handlers::{Items, Repository},
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_items_soft_denies_non_members(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let outsider = create_test_user(&pool, TestFlags::default()).await;

        create_test_item(&pool, "Oscilloscope").await;
        create_test_item(&pool, "Multimeter").await;

        // Outsiders get an empty page with a zero count, not an error
        let response = app
            .get("/api/v1/items")
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .await;

        response.assert_status_ok();
        let body: ListResponse<ItemResponse> = response.json();
        assert!(body.data.is_empty());
        assert_eq!(body.count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_items_with_pagination(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;

        for i in 0..5 {
            create_test_item(&pool, &format!("Item {i}")).await;
        }

        let response = app
            .get("/api/v1/items?skip=2&limit=2")
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;

        response.assert_status_ok();
        let body: ListResponse<ItemResponse> = response.json();
        assert_eq!(body.data.len(), 2);
        // Count is the total, not the page size
        assert_eq!(body.count, 5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_item_checks_existence_before_permission(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let outsider = create_test_user(&pool, TestFlags::default()).await;
        let item = create_test_item(&pool, "Camera").await;

        // Missing id: 404 even for a caller who would be denied anyway
        let response = app
            .get(&format!("/api/v1/items/{}", uuid::Uuid::new_v4()))
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Existing id: the outsider is then denied
        let response = app
            .get(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // A member can read it
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let response = app
            .get(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status_ok();
        let fetched: ItemResponse = response.json();
        assert_eq!(fetched.id, item.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_item_requires_edit_flag(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        // Lab member without can_edit_items is denied
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let response = app
            .post("/api/v1/items")
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"item_name": "Function generator"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let editor = create_test_user(&pool, TestFlags::item_editor()).await;
        let response = app
            .post("/api/v1/items")
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_name": "Function generator", "item_vendor": "Keysight"}))
            .await;
        response.assert_status_ok();
        let created: ItemResponse = response.json();
        assert_eq!(created.item_name, "Function generator");
        assert_eq!(created.item_vendor, Some("Keysight".to_string()));
        assert!(created.is_available);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_item_forces_owner_to_null(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let editor = create_test_user(&pool, TestFlags::item_editor()).await;

        let response = app
            .post("/api/v1/items")
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_name": "Probe", "current_owner_id": editor.id}))
            .await;

        response.assert_status_ok();
        let created: ItemResponse = response.json();
        assert_eq!(created.current_owner_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_item_validates_name(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let editor = create_test_user(&pool, TestFlags::item_editor()).await;

        let response = app
            .post("/api/v1/items")
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_name": ""}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .post("/api/v1/items")
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_name": "x".repeat(256)}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_item_partial_semantics(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let editor = create_test_user(&pool, TestFlags::item_editor()).await;
        let item = create_test_item(&pool, "Spectrometer").await;

        // Set the vendor only
        let response = app
            .put(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_vendor": "Ocean Optics"}))
            .await;
        response.assert_status_ok();
        let updated: ItemResponse = response.json();
        assert_eq!(updated.item_name, "Spectrometer");
        assert_eq!(updated.item_vendor, Some("Ocean Optics".to_string()));

        // An empty update changes nothing
        let response = app
            .put(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({}))
            .await;
        response.assert_status_ok();
        let unchanged: ItemResponse = response.json();
        assert_eq!(unchanged.item_name, updated.item_name);
        assert_eq!(unchanged.item_vendor, updated.item_vendor);

        // An explicit null clears the field
        let response = app
            .put(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .json(&json!({"item_vendor": null}))
            .await;
        response.assert_status_ok();
        let cleared: ItemResponse = response.json();
        assert_eq!(cleared.item_vendor, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_item_order_of_checks(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let item = create_test_item(&pool, "Laser").await;

        // Missing item: 404 before the permission check
        let response = app
            .put(&format!("/api/v1/items/{}", uuid::Uuid::new_v4()))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"item_name": "Laser II"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Existing item, member without the edit flag: 403
        let response = app
            .put(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"item_name": "Laser II"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_take_item_empty_payload_defaults(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let item = create_test_item(&pool, "Thermal camera").await;

        let before = chrono::Utc::now();
        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({}))
            .await;

        response.assert_status_ok();
        let taken: ItemResponse = response.json();
        assert_eq!(taken.current_owner_id, Some(member.id));
        assert!(!taken.is_available);
        assert!(taken.taken_at.expect("taken_at should be set") >= before);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_take_item_explicit_owner_not_overwritten(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let colleague = create_test_user(&pool, TestFlags::lab_member()).await;
        let item = create_test_item(&pool, "Signal analyzer").await;

        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"current_owner_id": colleague.id}))
            .await;

        response.assert_status_ok();
        let taken: ItemResponse = response.json();
        assert_eq!(taken.current_owner_id, Some(colleague.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_take_item_return_flow(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let item = create_test_item(&pool, "Microscope").await;

        // Take it
        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({}))
            .await;
        response.assert_status_ok();

        // Return it: explicit nulls must not be overridden by the defaults
        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"current_owner_id": null, "taken_at": null, "is_available": true}))
            .await;

        response.assert_status_ok();
        let returned: ItemResponse = response.json();
        assert_eq!(returned.current_owner_id, None);
        assert_eq!(returned.taken_at, None);
        assert!(returned.is_available);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_take_item_requires_lab_membership_only(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let outsider = create_test_user(&pool, TestFlags::default()).await;
        let item = create_test_item(&pool, "Caliper").await;

        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Plain membership is enough - no edit flag needed
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let response = app
            .put(&format!("/api/v1/items/{}/take", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({}))
            .await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_item(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let editor = create_test_user(&pool, TestFlags::item_editor()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let item = create_test_item(&pool, "Old scope").await;

        // Deleting a missing id is 404, never a silent success
        let response = app
            .delete(&format!("/api/v1/items/{}", uuid::Uuid::new_v4()))
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // A plain member cannot delete
        let response = app
            .delete(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = app
            .delete(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&editor).0, auth_header(&editor).1)
            .await;
        response.assert_status_ok();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Items::new(&mut conn);
        assert!(repo.get_by_id(item.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_items_require_authentication(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app.get("/api/v1/items").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
