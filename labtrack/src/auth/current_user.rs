use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::{errors::DbError, handlers::{Repository, Users}},
    errors::{Error, Result},
    types::UserId,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract the session token from the Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user_id)): Valid token found and verified
/// - Some(Err(error)): Bearer token present but invalid/expired
#[instrument(skip(parts, config))]
fn try_bearer_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<UserId>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Not a Bearer token, let other auth methods have a go
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(session::verify_session_token(token, config))
}

/// Extract the session token from the session cookie if present and valid
/// Returns:
/// - None: No session cookie present (or only invalid/expired ones)
/// - Some(Ok(user_id)): Valid cookie found and verified
/// - Some(Err(error)): Cookie header malformed
#[instrument(skip(parts, config))]
fn try_cookie_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<UserId>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user_id) => return Some(Ok(user_id)),
                    Err(_) => {
                        // Expired tokens are expected here, keep checking other cookies
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Authenticate the request and load the current user.
    ///
    /// Tries the Authorization header first, then the session cookie. The
    /// decoded subject is re-fetched from the database on every request so
    /// permission changes apply immediately; inactive users are rejected.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user_id = match try_bearer_auth(parts, &state.config) {
            Some(Ok(user_id)) => {
                debug!("Authenticated via bearer token: {}", user_id);
                user_id
            }
            Some(Err(e)) => return Err(e),
            None => match try_cookie_auth(parts, &state.config) {
                Some(Ok(user_id)) => {
                    debug!("Authenticated via session cookie: {}", user_id);
                    user_id
                }
                Some(Err(e)) => return Err(e),
                None => {
                    trace!("No authentication credentials found in request");
                    return Err(Error::Unauthenticated { message: None });
                }
            },
        };

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
        let mut users = Users::new(&mut conn);

        let user = users.get_by_id(user_id).await?.ok_or(Error::Unauthenticated {
            message: Some("User no longer exists".to_string()),
        })?;

        if !user.is_active {
            return Err(Error::BadRequest {
                message: "Inactive user".to_string(),
            });
        }

        Ok(CurrentUser::from(user))
    }
}
