use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::routes::user::model::Role;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hashed)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

fn issue_token(claims: &Claims, config: &Config) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn issue_parent_token(
    user_id: i64,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(
            config.parent_token_expiration().as_secs() as i64,
        ))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        role: Role::Parent,
        parent_id: None,
        exp: expiration,
        iat: now.timestamp(),
    };

    issue_token(&claims, config)
}

pub fn issue_child_token(
    user_id: i64,
    parent_id: i64,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(
            config.child_token_expiration().as_secs() as i64,
        ))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        role: Role::Child,
        parent_id: Some(parent_id),
        exp: expiration,
        iat: now.timestamp(),
    };

    issue_token(&claims, config)
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_host: "::".to_string(),
            server_port: 8080,
            api_base_uri: "/api".to_string(),
            parent_token_expiration_secs: 24 * 3600,
            child_token_expiration_secs: 12 * 3600,
        }
    }

    #[test]
    fn parent_token_round_trip() {
        let config = test_config();
        let token = issue_parent_token(7, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::Parent);
        assert_eq!(claims.parent_id, None);
    }

    #[test]
    fn child_token_carries_parent_id() {
        let config = test_config();
        let token = issue_child_token(12, 7, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 12);
        assert_eq!(claims.role, Role::Child);
        assert_eq!(claims.parent_id, Some(7));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now();
        let claims = Claims {
            sub: 7,
            role: Role::Parent,
            parent_id: None,
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(26)).timestamp(),
        };
        let token = issue_token(&claims, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_parent_token(7, &config).unwrap();
        let mut other = test_config();
        other.jwt_secret = "other-secret".to_string();
        assert!(verify_token(&token, &other).is_err());
    }
}
