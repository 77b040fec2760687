//! Request handlers for rooms.
//!
//! Room routes authorize before touching data, so every handler declares its
//! requirement with the [`RequiresPermission`] extractor. Unlike items,
//! listing rooms hard-denies callers outside the lab.

use crate::api::models::Message;
use crate::api::models::pagination::ListResponse;
use crate::api::models::rooms::{ListRoomsQuery, RoomCreate, RoomResponse, RoomUpdate};
use crate::auth::permissions::{RequiresPermission, operation, resource};
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Rooms, rooms::RoomFilter};
use crate::db::models::rooms::{RoomCreateDBRequest, RoomUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::RoomId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    summary = "Create a new room",
    description = "The room owner defaults to the creator when `room_owner_id` is omitted.",
    request_body = RoomCreate,
    responses(
        (status = 200, description = "The created room", body = RoomResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer the lab"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_room(
    State(state): State<AppState>,
    RequiresPermission { user, .. }: RequiresPermission<resource::Rooms, operation::Create>,
    Json(room): Json<RoomCreate>,
) -> Result<Json<RoomResponse>> {
    room.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut tx);

    let created = repo.create(&RoomCreateDBRequest::from((room, user.id))).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(created.into()))
}

#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    summary = "List rooms",
    responses(
        (status = 200, description = "One page of rooms plus the total count", body = ListResponse<RoomResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a lab member"),
    ),
    params(ListRoomsQuery),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_rooms(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Rooms, operation::Read>,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<ListResponse<RoomResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let rooms = repo.list(&RoomFilter::new(skip, limit)).await?;
    let count = repo.count().await?;

    Ok(Json(ListResponse::new(rooms.into_iter().map(RoomResponse::from).collect(), count)))
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    summary = "Get room by ID",
    responses(
        (status = 200, description = "The room", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a lab member"),
        (status = 404, description = "Room not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Room ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_room(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Rooms, operation::Read>,
    Path(id): Path<RoomId>,
) -> Result<Json<RoomResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    let room = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Room".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(room.into()))
}

#[utoipa::path(
    put,
    path = "/rooms/{id}",
    tag = "rooms",
    summary = "Update a room",
    request_body = RoomUpdate,
    responses(
        (status = 200, description = "The updated room", body = RoomResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer the lab"),
        (status = 404, description = "Room not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Room ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_room(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Rooms, operation::Update>,
    Path(id): Path<RoomId>,
    Json(update): Json<RoomUpdate>,
) -> Result<Json<RoomResponse>> {
    update.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut tx);

    let updated = repo.update(id, &RoomUpdateDBRequest::from(update)).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            resource: "Room".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "rooms",
    summary = "Delete a room",
    responses(
        (status = 200, description = "Deletion confirmation", body = Message),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer the lab"),
        (status = 404, description = "Room not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "Room ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_room(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Rooms, operation::Delete>,
    Path(id): Path<RoomId>,
) -> Result<Json<Message>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut tx);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Room".to_string(),
            id: id.to_string(),
        });
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(Message::new("Room deleted successfully")))
}
