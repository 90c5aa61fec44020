use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The part of a user the API exposes. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Returned by register and login: a fresh token plus the public user.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_password_request_uses_camel_case_keys() {
        let parsed: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword":"old-secret","newPassword":"new-secret"}"#,
        )
        .expect("deserialize");
        assert_eq!(parsed.current_password, "old-secret");
        assert_eq!(parsed.new_password, "new-secret");
    }

    #[test]
    fn auth_response_shape() {
        let user = User {
            id: 7,
            email: "a@x.com".into(),
            username: "alice".into(),
            password_hash: "hash".into(),
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
        };
        let response = AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token: "jwt".into(),
            user: user.into(),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["user"]["username"], serde_json::json!("alice"));
        assert!(json["user"].get("password_hash").is_none());
    }
}
