use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::session::{session_token, SessionKeys};
use crate::error::AppError;

/// The resolved owner of the request. Rejects with a bare 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        match keys.resolve(session_token(&jar, &parts.headers).as_deref()) {
            Some(session) => Ok(AuthUser(session.username)),
            None => {
                warn!(uri = %parts.uri, "request without a valid session");
                Err(AppError::Unauthorized)
            }
        }
    }
}
