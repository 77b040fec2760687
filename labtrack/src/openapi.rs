//! OpenAPI documentation for the management API.
//!
//! The generated document is served at `/api-docs/openapi.json` and rendered
//! interactively at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
};

use crate::api::models::{
    Message,
    auth::{LoginRequest, Token},
    items::{ItemCreate, ItemResponse, ItemTake, ItemUpdate},
    rooms::{RoomCreate, RoomResponse, RoomUpdate},
    users::{UserCreate, UserPermissionsUpdate, UserRegister, UserResponse, UserUpdateMe},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "labtrack",
        description = "Lab inventory tracking backend: items, rooms, and member permissions."
    ),
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::register,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::create_user,
        crate::api::handlers::users::get_me,
        crate::api::handlers::users::update_me,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::update_user_permissions,
        crate::api::handlers::items::list_items,
        crate::api::handlers::items::get_item,
        crate::api::handlers::items::create_item,
        crate::api::handlers::items::update_item,
        crate::api::handlers::items::take_item,
        crate::api::handlers::items::delete_item,
        crate::api::handlers::rooms::create_room,
        crate::api::handlers::rooms::list_rooms,
        crate::api::handlers::rooms::get_room,
        crate::api::handlers::rooms::update_room,
        crate::api::handlers::rooms::delete_room,
    ),
    components(schemas(
        Message,
        LoginRequest,
        Token,
        UserCreate,
        UserRegister,
        UserUpdateMe,
        UserPermissionsUpdate,
        UserResponse,
        ItemCreate,
        ItemUpdate,
        ItemTake,
        ItemResponse,
        RoomCreate,
        RoomUpdate,
        RoomResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Login, logout and registration"),
        (name = "users", description = "User management and permission flags"),
        (name = "items", description = "Inventory items and the take/return transition"),
        (name = "rooms", description = "Rooms and their owners"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("BearerAuth", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
            components.add_security_scheme(
                "CookieAuth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("labtrack_session"))),
            );
        }
    }
}
