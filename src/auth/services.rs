use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_against_dummy, verify_password},
        repo::UserRepo,
        repo_types::User,
    },
    error::AppError,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Trims and lowercases, then checks the allowed alphabet.
pub(crate) fn normalize_username(raw: &str) -> Result<String, AppError> {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9_.\-]{3,32}$").unwrap();
    }
    let username = raw.trim().to_lowercase();
    if !USERNAME_RE.is_match(&username) {
        return Err(AppError::validation(
            "username must be 3-32 characters of letters, digits, '_', '.' or '-'",
        ));
    }
    Ok(username)
}

pub(crate) fn check_new_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password != confirm {
        return Err(AppError::validation("passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Stores a new identity under the lowercased username.
pub async fn create_identity(
    users: &dyn UserRepo,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let username = username.to_lowercase();
    if users.find_by_username(&username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::UsernameTaken);
    }

    let hash = hash_password(password)?;
    let user = User::new(&username, hash)?;
    users.insert(&user).await?;

    info!(user_id = %user.id, username = %user.username, "identity created");
    Ok(user)
}

/// `false` for both an unknown username and a wrong password.
pub async fn verify(users: &dyn UserRepo, username: &str, password: &str) -> Result<bool, AppError> {
    let username = username.to_lowercase();
    let Some(user) = users.find_by_username(&username).await? else {
        verify_against_dummy(password);
        warn!(%username, "login for unknown username");
        return Ok(false);
    };

    let ok = verify_password(password, &user.password_hash)?;
    if !ok {
        warn!(%username, user_id = %user.id, "login with wrong password");
    }
    Ok(ok)
}
