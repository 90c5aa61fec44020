use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{
        AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, ProfileResponse,
        RegisterRequest, UpdateProfileRequest,
    },
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::User,
};
use crate::error::{is_unique_violation, ApiError};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(get_profile).put(update_profile))
        .route("/auth/change-password", put(change_password))
}

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(ApiError::validation("Username must be 3-30 characters"));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Valid email required"));
    }
    check_username(&username)?;
    check_password(&payload.password)?;

    let hash = hash_password(&payload.password)
        .map_err(|e| ApiError::internal("Error registering user", e))?;

    // No advisory pre-check: the unique constraint is the authoritative
    // duplicate signal, including under concurrent registrations.
    let user = match User::create(&state.db, &payload.email, &username, &hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "registration hit an existing email or username");
            return Err(ApiError::conflict("Email or username already exists"));
        }
        Err(e) => return Err(ApiError::internal("Error registering user", e)),
    };

    let token = JwtKeys::from_ref(&state)
        .sign(&user)
        .map_err(|e| ApiError::internal("Error registering user", e))?;

    info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Valid email required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password required"));
    }

    // Unknown email and wrong password answer identically so the error
    // text cannot be used to enumerate accounts.
    let user = User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let valid = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal("Error logging in", e))?;
    if !valid {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    User::touch_last_login(&state.db, user.id)
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))?;

    let token = JwtKeys::from_ref(&state)
        .sign(&user)
        .map_err(|e| ApiError::internal("Error logging in", e))?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await
        .map_err(|e| ApiError::internal("Error fetching profile", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let username = payload.username.trim().to_string();
    check_username(&username)?;

    let user = match User::update_username(&state.db, auth.id, &username).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::not_found("User not found")),
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Username already taken"));
        }
        Err(e) => return Err(ApiError::internal("Error updating profile", e)),
    };

    info!(user_id = user.id, old = %auth.username, new = %user.username, "profile updated");
    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // New password obeys the same minimum as registration
    check_password(&payload.new_password)?;

    let user = User::find_by_id(&state.db, auth.id)
        .await
        .map_err(|e| ApiError::internal("Error changing password", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let valid = verify_password(&payload.current_password, &user.password_hash)
        .map_err(|e| ApiError::internal("Error changing password", e))?;
    if !valid {
        warn!(user_id = user.id, email = %auth.email, "change-password with wrong current password");
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let hash = hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal("Error changing password", e))?;
    User::update_password(&state.db, user.id, &hash)
        .await
        .map_err(|e| ApiError::internal("Error changing password", e))?;

    info!(user_id = user.id, "password changed");
    Ok(Json(MessageResponse {
        success: true,
        message: "Password changed successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_ordinary_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn username_bounds_are_inclusive() {
        assert!(check_username("abc").is_ok());
        assert!(check_username(&"a".repeat(30)).is_ok());
        assert!(check_username("ab").is_err());
        assert!(check_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn password_minimum_is_six_characters() {
        assert!(check_password("secret").is_ok());
        assert!(check_password("five5").is_err());
    }
}
