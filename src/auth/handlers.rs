use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, PublicUser, RefreshRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, is_valid_username, verify_stored_password, MIN_PASSWORD_LEN},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, username: String) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&username)?;
    let refresh_token = keys.sign_refresh(&username)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser { username },
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::BadRequest("Invalid username".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if state.users.find_by_username(&payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("Username already registered".into()));
    }

    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let user = state.users.create(&payload.username, &hash).await?;

    info!(username = %user.username, "user registered");
    issue_tokens(&state, user.username)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = payload.username.trim();

    let user = state.users.find_by_username(username).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());

    let verified = verify_stored_password(payload.password, hash).await?;
    let user = match user {
        Some(user) if verified => user,
        other => {
            warn!(username, known = other.is_some(), "login rejected");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
    };

    info!(username = %user.username, "user logged in");
    issue_tokens(&state, user.username)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = state
        .users
        .find_by_username(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    issue_tokens(&state, user.username)
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(username): AuthUser) -> Json<PublicUser> {
    Json(PublicUser { username })
}
