use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, LogoutResponse, PublicUser, SignupRequest},
        extractors::AuthUser,
        repo::UserRepo,
        services::{check_new_password, create_identity, normalize_username, verify},
        session::SessionKeys,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(get_me))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Issues the session for `username` as both cookie and body token.
fn session_response(
    keys: &SessionKeys,
    jar: CookieJar,
    username: String,
) -> Result<impl IntoResponse, AppError> {
    let token = keys.issue(&username)?;
    Ok((
        jar.add(keys.cookie(token.clone())),
        Json(AuthResponse {
            success: true,
            username,
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let (Some(username), Some(password), Some(confirm)) = (
        present(payload.username),
        present(payload.password),
        present(payload.password_confirm),
    ) else {
        warn!("signup with missing fields");
        return Err(AppError::validation("all fields are required"));
    };

    let username = normalize_username(&username)?;
    check_new_password(&password, &confirm)?;

    let user = create_identity(state.users.as_ref(), &username, &password).await?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    session_response(&SessionKeys::from_ref(&state), jar, user.username)
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let (Some(username), Some(password)) = (present(payload.username), present(payload.password))
    else {
        return Err(AppError::validation("username and password are required"));
    };
    let username = username.trim().to_lowercase();

    if !verify(state.users.as_ref(), &username, &password).await? {
        return Err(AppError::InvalidCredentials);
    }

    info!(%username, "user logged in");
    session_response(&SessionKeys::from_ref(&state), jar, username)
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let keys = SessionKeys::from_ref(&state);
    (jar.remove(keys.revoke()), Json(LogoutResponse { success: true }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    // a valid token for a user that no longer exists is still unauthenticated
    let user = UserRepo::find_by_username(state.users.as_ref(), &username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(PublicUser {
        username: user.username,
        created_at: user.created_at,
    }))
}
