//! Test utilities: app/user factories and authentication helpers.

use crate::db::handlers::{Items, Repository, Rooms, Users};
use crate::db::models::items::{ItemCreateDBRequest, ItemDBResponse};
use crate::db::models::rooms::{RoomCreateDBRequest, RoomDBResponse};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;
use crate::{AppState, auth::session};
use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

pub fn create_test_config() -> crate::config::Config {
    crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "overridden-by-test-pool".to_string(),
        first_superuser_email: "admin@test.com".to_string(),
        first_superuser_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig::default(),
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let app = crate::Application::new_with_pool(create_test_config(), pool)
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

/// Role flags for a test user.
#[derive(Debug, Clone, Copy)]
pub struct TestFlags {
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
}

impl Default for TestFlags {
    /// An active account with no lab flags at all.
    fn default() -> Self {
        Self {
            is_active: true,
            is_superuser: false,
            is_part_of_lab: false,
            can_edit_items: false,
            can_edit_labs: false,
            can_edit_users: false,
        }
    }
}

impl TestFlags {
    pub fn lab_member() -> Self {
        Self {
            is_part_of_lab: true,
            ..Self::default()
        }
    }

    pub fn item_editor() -> Self {
        Self {
            is_part_of_lab: true,
            can_edit_items: true,
            ..Self::default()
        }
    }

    pub fn lab_admin() -> Self {
        Self {
            is_part_of_lab: true,
            can_edit_labs: true,
            ..Self::default()
        }
    }

    pub fn user_admin() -> Self {
        Self {
            can_edit_users: true,
            ..Self::default()
        }
    }
}

pub async fn create_test_user(pool: &PgPool, flags: TestFlags) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let email = format!("testuser_{}@example.com", Uuid::new_v4().simple());

    users_repo
        .create(&UserCreateDBRequest {
            email,
            full_name: Some("Test User".to_string()),
            hashed_password: "not-a-real-hash".to_string(),
            is_active: flags.is_active,
            is_superuser: flags.is_superuser,
            is_part_of_lab: flags.is_part_of_lab,
            can_edit_items: flags.can_edit_items,
            can_edit_labs: flags.can_edit_labs,
            can_edit_users: flags.can_edit_users,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_item(pool: &PgPool, name: &str) -> ItemDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut items_repo = Items::new(&mut conn);

    items_repo
        .create(&ItemCreateDBRequest {
            item_name: name.to_string(),
            current_room: None,
            table_name: None,
            system_name: None,
            current_owner_id: None,
            taken_at: None,
            item_img_url: None,
            item_vendor: None,
            item_params: None,
            is_available: true,
        })
        .await
        .expect("Failed to create test item")
}

pub async fn create_test_room(pool: &PgPool, room_number: &str, owner: Option<UserId>) -> RoomDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut rooms_repo = Rooms::new(&mut conn);

    rooms_repo
        .create(&RoomCreateDBRequest {
            room_number: room_number.to_string(),
            room_place: "Test wing".to_string(),
            room_owner_id: owner,
        })
        .await
        .expect("Failed to create test room")
}

/// Bearer authorization header for a test user.
pub fn auth_header(user: &UserDBResponse) -> (String, String) {
    let token = session::create_session_token(user.id, &create_test_config()).expect("Failed to create session token");
    ("authorization".to_string(), format!("Bearer {token}"))
}
