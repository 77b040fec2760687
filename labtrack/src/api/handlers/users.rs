//! Request handlers for user management.

use crate::api::models::pagination::ListResponse;
use crate::api::models::users::{CurrentUser, ListUsersQuery, UserCreate, UserPermissionsUpdate, UserResponse, UserUpdateMe};
use crate::auth::password;
use crate::auth::permissions::{RequiresPermission, operation, resource};
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Users, users::UserFilter};
use crate::db::models::users::{UserCreateDBRequest, UserUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::UserId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    responses(
        (status = 200, description = "One page of users plus the total count", body = ListResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer users"),
    ),
    params(ListUsersQuery),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::Read>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListResponse<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let users = repo.list(&UserFilter::new(skip, limit)).await?;
    let count = repo.count().await?;

    Ok(Json(ListResponse::new(users.into_iter().map(UserResponse::from).collect(), count)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create a new user",
    request_body = UserCreate,
    responses(
        (status = 200, description = "The created user", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer users"),
        (status = 409, description = "Email already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::Create>,
    Json(user): Json<UserCreate>,
) -> Result<Json<UserResponse>> {
    user.validate()?;

    let password_config = &state.config.auth.password;
    if user.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if user.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let password = user.password.clone();
    let hashed_password = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let created = repo.create(&UserCreateDBRequest::from_create(user, hashed_password)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(created.into()))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    summary = "Get the current user",
    responses(
        (status = 200, description = "The current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let me = repo.get_by_id(user.id).await?.ok_or(Error::Unauthenticated {
        message: Some("User no longer exists".to_string()),
    })?;

    Ok(Json(me.into()))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    tag = "users",
    summary = "Update the current user's profile",
    request_body = UserUpdateMe,
    responses(
        (status = 200, description = "The updated user", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_me(State(state): State<AppState>, user: CurrentUser, Json(update): Json<UserUpdateMe>) -> Result<Json<UserResponse>> {
    update.validate()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let updated = repo.update(user.id, &UserUpdateDBRequest::from(update)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user by ID",
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer users"),
        (status = 404, description = "User not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<AppState>, user: CurrentUser, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    // Users may always read themselves; anyone else needs user administration
    if id != user.id {
        crate::auth::permissions::require(&user, crate::types::Resource::Users, crate::types::Operation::Read)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let found = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(found.into()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/permissions",
    tag = "users",
    summary = "Update a user's lab permission flags",
    description = "Sparse update: only flags present in the payload change.",
    request_body = UserPermissionsUpdate,
    responses(
        (status = 200, description = "The updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot administer users"),
        (status = 404, description = "User not found"),
    ),
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user_permissions(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::Update>,
    Path(id): Path<UserId>,
    Json(update): Json<UserPermissionsUpdate>,
) -> Result<Json<UserResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let updated = repo.update(id, &UserUpdateDBRequest::from(update)).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{pagination::ListResponse, users::UserResponse},
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_users_requires_user_admin(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;

        let response = app
            .get("/api/v1/users")
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let admin = create_test_user(&pool, TestFlags::user_admin()).await;
        let response = app
            .get("/api/v1/users")
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .await;
        response.assert_status_ok();
        let body: ListResponse<UserResponse> = response.json();
        assert_eq!(body.count, 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_superuser_can_list_users(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let superuser = create_test_user(
            &pool,
            TestFlags {
                is_superuser: true,
                ..TestFlags::default()
            },
        )
        .await;

        let response = app
            .get("/api/v1/users")
            .add_header(auth_header(&superuser).0, auth_header(&superuser).1)
            .await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_with_flags(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, TestFlags::user_admin()).await;

        let response = app
            .post("/api/v1/users")
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .json(&json!({
                "email": "newmember@example.com",
                "password": "correct-horse-battery",
                "full_name": "New Member",
                "is_part_of_lab": true,
                "can_edit_items": true
            }))
            .await;

        response.assert_status_ok();
        let created: UserResponse = response.json();
        assert_eq!(created.email, "newmember@example.com");
        assert!(created.is_part_of_lab);
        assert!(created.can_edit_items);
        assert!(!created.can_edit_labs);
        assert!(!created.is_superuser);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_me_and_update_me(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;

        let response = app
            .get("/api/v1/users/me")
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status_ok();
        let me: UserResponse = response.json();
        assert_eq!(me.id, member.id);

        let response = app
            .patch("/api/v1/users/me")
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .json(&json!({"full_name": "Renamed"}))
            .await;
        response.assert_status_ok();
        let updated: UserResponse = response.json();
        assert_eq!(updated.full_name, Some("Renamed".to_string()));
        assert_eq!(updated.email, member.email);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_user_self_or_admin(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let member = create_test_user(&pool, TestFlags::lab_member()).await;
        let other = create_test_user(&pool, TestFlags::lab_member()).await;

        // Reading oneself is always allowed
        let response = app
            .get(&format!("/api/v1/users/{}", member.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status_ok();

        // Reading someone else requires user administration
        let response = app
            .get(&format!("/api/v1/users/{}", other.id))
            .add_header(auth_header(&member).0, auth_header(&member).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let admin = create_test_user(&pool, TestFlags::user_admin()).await;
        let response = app
            .get(&format!("/api/v1/users/{}", other.id))
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .await;
        response.assert_status_ok();

        let response = app
            .get(&format!("/api/v1/users/{}", uuid::Uuid::new_v4()))
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_permission_update_is_sparse(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, TestFlags::user_admin()).await;
        let subject = create_test_user(&pool, TestFlags::item_editor()).await;

        let response = app
            .patch(&format!("/api/v1/users/{}/permissions", subject.id))
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .json(&json!({"can_edit_labs": true}))
            .await;

        response.assert_status_ok();
        let updated: UserResponse = response.json();
        // Only the supplied flag changed
        assert!(updated.can_edit_labs);
        assert!(updated.is_part_of_lab);
        assert!(updated.can_edit_items);
        assert!(!updated.can_edit_users);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_permission_update_takes_effect_without_new_token(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, TestFlags::user_admin()).await;
        let outsider = create_test_user(&pool, TestFlags::default()).await;
        let item = create_test_item(&pool, "Scope").await;

        // The outsider cannot read the item
        let response = app
            .get(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Grant lab membership
        let response = app
            .patch(&format!("/api/v1/users/{}/permissions", outsider.id))
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .json(&json!({"is_part_of_lab": true}))
            .await;
        response.assert_status_ok();

        // The same token now works - flags are read fresh per request
        let response = app
            .get(&format!("/api/v1/items/{}", item.id))
            .add_header(auth_header(&outsider).0, auth_header(&outsider).1)
            .await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_permission_update_missing_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, TestFlags::user_admin()).await;

        let response = app
            .patch(&format!("/api/v1/users/{}/permissions", uuid::Uuid::new_v4()))
            .add_header(auth_header(&admin).0, auth_header(&admin).1)
            .json(&json!({"is_part_of_lab": true}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
