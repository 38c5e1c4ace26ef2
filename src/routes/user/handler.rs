use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    middleware::Principal,
    utils::{hash_password, issue_child_token, issue_parent_token},
};

use super::model::{
    ChildLoginRequest, ChildResponse, CreateChildRequest, LoginResponse, ParentLoginRequest,
    RegisterParentRequest, RegisterParentResponse, User,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterParentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidArgument(
            "Name, email, and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;

    let parent = User::create_parent(&state.pool, &req.name, &req.email, &password_hash)
        .await
        .map_err(|e| {
            // Duplicate registrations race through to the unique index.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AppError::AlreadyExists("Email already registered".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    tracing::info!("Registered parent account {}", parent.id);
    Ok((
        StatusCode::CREATED,
        Json(RegisterParentResponse {
            message: "Parent registered successfully".to_string(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn parent_login(
    State(state): State<AppState>,
    Json(req): Json<ParentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let parent = User::find_parent_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid credentials".to_string()))?;

    if !parent.verify_login_password(&req.password)? {
        return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
    }

    let token = issue_parent_token(parent.id, &state.config)
        .map_err(|_| AppError::Internal("Could not generate token".to_string()))?;

    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn child_login(
    State(state): State<AppState>,
    Json(req): Json<ChildLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let child = User::find_child(&state.pool, req.child_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid credentials".to_string()))?;

    if !child.verify_login_pin(&req.pin)? {
        return Err(AppError::Unauthenticated("Invalid PIN".to_string()));
    }

    let parent_id = child
        .parent_id
        .ok_or_else(|| AppError::Internal("Child record has no parent".to_string()))?;

    let token = issue_child_token(child.id, parent_id, &state.config)
        .map_err(|_| AppError::Internal("Could not generate token".to_string()))?;

    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn list_children(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let parent_id = principal.require_parent()?;
    let children = User::children_of(&state.pool, parent_id).await?;
    Ok(Json(children))
}

#[axum::debug_handler]
pub async fn create_child(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Json(req): Json<CreateChildRequest>,
) -> Result<impl IntoResponse, AppError> {
    let parent_id = principal.require_parent()?;

    if req.name.is_empty() || req.pin.is_empty() || req.age <= 0 {
        return Err(AppError::InvalidArgument(
            "Name, age, and PIN are required".to_string(),
        ));
    }

    let pin_hash = hash_password(&req.pin)?;
    let child = User::create_child(&state.pool, &req.name, req.age, &pin_hash, parent_id).await?;

    tracing::info!("Parent {} created child account {}", parent_id, child.id);
    Ok(Json(ChildResponse {
        id: child.id,
        name: child.name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sqlx::PgPool;

    fn test_state(pool: PgPool) -> AppState {
        AppState {
            pool,
            config: Config {
                database_url: "postgres://localhost/unused".to_string(),
                jwt_secret: "test-secret".to_string(),
                server_host: "::".to_string(),
                server_port: 8080,
                api_base_uri: "/api".to_string(),
                parent_token_expiration_secs: 24 * 3600,
                child_token_expiration_secs: 12 * 3600,
            },
        }
    }

    fn register_request(email: &str) -> RegisterParentRequest {
        RegisterParentRequest {
            name: "Sam".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_email_registration_conflicts(pool: PgPool) {
        let state = test_state(pool);

        let first = register(
            State(state.clone()),
            Json(register_request("sam@example.com")),
        )
        .await;
        assert!(first.is_ok());

        let err = register(State(state), Json(register_request("sam@example.com")))
            .await
            .err()
            .expect("second registration with the same email must fail");
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn registration_requires_all_fields(pool: PgPool) {
        let state = test_state(pool);

        let mut req = register_request("sam@example.com");
        req.password = String::new();

        let err = register(State(state), Json(req))
            .await
            .err()
            .expect("registration with an empty password must fail");
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn child_login_rejects_wrong_pin_and_unknown_id(pool: PgPool) {
        let state = test_state(pool.clone());

        let password_hash = hash_password("hunter2").unwrap();
        let parent = User::create_parent(&pool, "Sam", "sam@example.com", &password_hash)
            .await
            .unwrap();
        let pin_hash = hash_password("4321").unwrap();
        let child = User::create_child(&pool, "Maya", 8, &pin_hash, parent.id)
            .await
            .unwrap();

        let err = child_login(
            State(state.clone()),
            Json(ChildLoginRequest {
                child_id: child.id,
                pin: "0000".to_string(),
            }),
        )
        .await
        .err()
        .expect("wrong PIN must fail");
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let err = child_login(
            State(state.clone()),
            Json(ChildLoginRequest {
                child_id: child.id + 999,
                pin: "4321".to_string(),
            }),
        )
        .await
        .err()
        .expect("unknown child id must fail");
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let ok = child_login(
            State(state),
            Json(ChildLoginRequest {
                child_id: child.id,
                pin: "4321".to_string(),
            }),
        )
        .await;
        assert!(ok.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn parent_login_rejects_bad_credentials(pool: PgPool) {
        let state = test_state(pool.clone());

        let password_hash = hash_password("hunter2").unwrap();
        User::create_parent(&pool, "Sam", "sam@example.com", &password_hash)
            .await
            .unwrap();

        let err = parent_login(
            State(state.clone()),
            Json(ParentLoginRequest {
                email: "sam@example.com".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await
        .err()
        .expect("wrong password must fail");
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let ok = parent_login(
            State(state),
            Json(ParentLoginRequest {
                email: "sam@example.com".to_string(),
                password: "hunter2".to_string(),
            }),
        )
        .await;
        assert!(ok.is_ok());
    }
}
