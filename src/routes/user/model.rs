use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::utils::verify_password;

/// Account role. Stored as the Postgres enum `user_role`; no string
/// comparisons outside this mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

/// A parent or child account. A child always has `parent_id` set; a parent
/// never does (enforced by a table CHECK).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterParentResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ParentLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChildLoginRequest {
    #[serde(rename = "childId")]
    pub child_id: i64,
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChildRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct ChildResponse {
    pub id: i64,
    pub name: String,
}

const USER_COLUMNS: &str =
    "id, name, role, email, password_hash, pin_hash, age, parent_id, created_at, updated_at";

impl User {
    pub async fn create_parent(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, role, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(Role::Parent)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn create_child(
        pool: &PgPool,
        name: &str,
        age: i32,
        pin_hash: &str,
        parent_id: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, role, age, pin_hash, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(Role::Child)
        .bind(age)
        .bind(pin_hash)
        .bind(parent_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_parent_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2"
        ))
        .bind(email)
        .bind(Role::Parent)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_child(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(Role::Child)
        .fetch_optional(pool)
        .await
    }

    /// Resolves a child only when it belongs to the given parent.
    pub async fn find_child_of(
        pool: &PgPool,
        id: i64,
        parent_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND parent_id = $2 AND role = $3"
        ))
        .bind(id)
        .bind(parent_id)
        .bind(Role::Child)
        .fetch_optional(pool)
        .await
    }

    pub async fn children_of(pool: &PgPool, parent_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE parent_id = $1 AND role = $2 ORDER BY id"
        ))
        .bind(parent_id)
        .bind(Role::Child)
        .fetch_all(pool)
        .await
    }

    pub fn verify_login_password(&self, password: &str) -> Result<bool, bcrypt::BcryptError> {
        match &self.password_hash {
            Some(hash) => verify_password(password, hash),
            None => Ok(false),
        }
    }

    pub fn verify_login_pin(&self, pin: &str) -> Result<bool, bcrypt::BcryptError> {
        match &self.pin_hash {
            Some(hash) => verify_password(pin, hash),
            None => Ok(false),
        }
    }
}
