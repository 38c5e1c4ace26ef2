use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    routes::user::model::Role,
    utils::{Claims, verify_token},
};

/// The verified caller of a protected route, derived from token claims and
/// passed to handlers explicitly as a request extension.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
    pub parent_id: Option<i64>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.sub,
            role: claims.role,
            parent_id: claims.parent_id,
        }
    }
}

impl Principal {
    /// Returns the parent's user id, or rejects child callers.
    pub fn require_parent(&self) -> Result<i64, AppError> {
        match self.role {
            Role::Parent => Ok(self.user_id),
            Role::Child => Err(AppError::Unauthenticated(
                "Parent account required".to_string(),
            )),
        }
    }

    /// Returns the child's user id, or rejects parent callers.
    pub fn require_child(&self) -> Result<i64, AppError> {
        match self.role {
            Role::Child => Ok(self.user_id),
            Role::Parent => Err(AppError::Unauthenticated(
                "Child account required".to_string(),
            )),
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = token
        .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;

    let claims = verify_token(token, &state.config)
        .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(Principal::from(claims));
    Ok(next.run(request).await)
}
