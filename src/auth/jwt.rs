use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::state::AppState;

/// JWT payload: the identity a bearer token proves, plus expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signing/verification keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::days(config.expire_days),
        }
    }

    /// Issue a bearer token for a user. Expiry is the only invalidation
    /// mechanism; there is no server-side revocation.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = user.id, "jwt signed");
        Ok(token)
    }

    /// Malformed, tampered and expired tokens all come back as `Err`;
    /// callers collapse them into one Unauthorized outcome.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            expire_days: 7,
        })
    }

    fn make_user() -> User {
        User {
            id: 42,
            email: "a@x.com".into(),
            username: "alice".into(),
            password_hash: "unused".into(),
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    #[test]
    fn sign_then_verify_round_trips_the_identity() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(&make_user()).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_a_token_signed_with_another_secret() {
        let token = make_keys("secret-a").sign(&make_user()).expect("sign");
        assert!(make_keys("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_an_expired_token() {
        let keys = make_keys("dev-secret");
        // Hand-build claims well past expiry (beyond the default leeway)
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: 42,
            email: "a@x.com".into(),
            username: "alice".into(),
            iat: (now - Duration::days(8)).unix_timestamp() as usize,
            exp: (now - Duration::days(1)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }
}
