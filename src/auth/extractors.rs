use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use base64ct::{Base64, Encoding};
use tracing::{debug, warn};

use crate::{
    auth::{claims::TokenKind, jwt::JwtKeys, password::verify_stored_password},
    error::ApiError,
    state::AppState,
};

/// Authenticated caller, carrying the username that owns cards.
///
/// Accepts `Bearer <access token>` or `Basic <base64(user:password)>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let (scheme, credentials) = auth
            .split_once(' ')
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        if scheme.eq_ignore_ascii_case("bearer") {
            bearer(state, credentials.trim())
        } else if scheme.eq_ignore_ascii_case("basic") {
            basic(state, credentials.trim()).await
        } else {
            Err(ApiError::Unauthorized("Unsupported auth scheme".into()))
        }
    }
}

fn bearer(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    if claims.kind != TokenKind::Access {
        return Err(ApiError::Unauthorized("Access token required".into()));
    }

    Ok(AuthUser(claims.sub))
}

async fn basic(state: &AppState, encoded: &str) -> Result<AuthUser, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let decoded = Base64::decode_vec(encoded).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (username, password) = decoded.split_once(':').ok_or_else(invalid)?;

    let user = state.users.find_by_username(username).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());

    let verified = verify_stored_password(password.to_string(), hash).await?;
    let user = match user {
        Some(user) if verified => user,
        other => {
            warn!(username, known = other.is_some(), "basic auth rejected");
            return Err(invalid());
        }
    };

    debug!(username, "basic auth accepted");
    Ok(AuthUser(user.username))
}
