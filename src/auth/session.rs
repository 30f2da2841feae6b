//! Stateless sessions: a signed JWT held by the client, no server table.

use axum::{
    extract::FromRef,
    http::{header, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// JWT payload. `sub` is the lowercased username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// The identity a request was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

/// Signing and verification keys with their config.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    secure_cookie: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::new(&state.config.jwt, state.config.production)
    }
}

impl SessionKeys {
    pub fn new(cfg: &JwtConfig, secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::days(cfg.ttl_days.max(0)),
            secure_cookie,
        }
    }

    /// Signs a token bound to `username` with an absolute expiry.
    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%username, "session token signed");
        Ok(token)
    }

    fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }

    /// Never fails: anything that is not a valid, unexpired token is `None`.
    pub fn resolve(&self, token: Option<&str>) -> Option<Session> {
        let token = token?.trim();
        if token.is_empty() {
            return None;
        }
        match self.verify(token) {
            Ok(claims) if !claims.sub.is_empty() => {
                debug!(username = %claims.sub, "session resolved");
                Some(Session { username: claims.sub })
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            }
        }
    }

    /// Session cookie carrying a freshly issued token.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(self.ttl)
            .build()
    }

    /// Cookie matching the session one by name and path, for `CookieJar::remove`.
    pub fn revoke(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .build()
    }
}

/// Finds the session token in the `session` cookie, falling back to
/// `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    let from_cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value_trimmed().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        auth.strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::to_string)
    })
}
