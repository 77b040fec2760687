//! Authentication handlers: login, logout, registration.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::AppendHeaders,
};

use crate::{
    AppState,
    api::models::{
        Message,
        auth::{LoginRequest, Token},
        users::{UserRegister, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};

/// Log in with email and password.
///
/// On success the session token is returned in the body and also set as an
/// HTTP-only cookie, so both API clients and browsers are served.
#[utoipa::path(
    post,
    path = "/authentication/login",
    tag = "authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token", body = Token),
        (status = 400, description = "Incorrect credentials or inactive user"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<Token>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // A missing user and a wrong password are indistinguishable to the caller
    let user = users.get_by_email(&request.email).await?.ok_or_else(|| Error::BadRequest {
        message: "Incorrect email or password".to_string(),
    })?;

    // Verify on a blocking thread - argon2 is deliberately expensive
    let supplied = request.password.clone();
    let stored_hash = user.hashed_password.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_string(&supplied, &stored_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !verified {
        return Err(Error::BadRequest {
            message: "Incorrect email or password".to_string(),
        });
    }

    if !user.is_active {
        return Err(Error::BadRequest {
            message: "Inactive user".to_string(),
        });
    }

    let token = session::create_session_token(user.id, &state.config)?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        state.config.auth.session.cookie_name,
        token,
        state.config.auth.session.jwt_expiry.as_secs()
    );

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(Token::bearer(token))))
}

/// Log out by clearing the session cookie.
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logged out", body = Message),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> (AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<Message>) {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        state.config.auth.session.cookie_name
    );

    (AppendHeaders([(SET_COOKIE, cookie)]), Json(Message::new("Logged out")))
}

/// Register a new user account.
///
/// Self-registered users start active with every lab flag off; flags are
/// granted later by a user administrator.
#[utoipa::path(
    post,
    path = "/authentication/register",
    tag = "authentication",
    request_body = UserRegister,
    responses(
        (status = 200, description = "The registered user", body = UserResponse),
        (status = 400, description = "Invalid input or registration disabled"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<UserRegister>) -> Result<Json<UserResponse>> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    request.validate()?;

    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut tx);

    if users.get_by_email(&request.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "An account with this email address already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let hashed_password = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = users.create(&UserCreateDBRequest::from_register(request, hashed_password)).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(created.into()))
}
