use axum::{
    Json,
    extract::{Extension, Query, State},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, middleware::Principal, routes::user::model::User};

use super::model::{ChildLogsQuery, CreateReadingLogRequest, ReadingLog};

#[axum::debug_handler]
pub async fn create_log(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Json(req): Json<CreateReadingLogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let child_id = principal.require_child()?;
    let new = req.validate()?;

    User::find_child(&state.pool, child_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

    let log = ReadingLog::create(&state.pool, child_id, new).await?;
    Ok(Json(log))
}

#[axum::debug_handler]
pub async fn list_own_logs(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let child_id = principal.require_child()?;

    User::find_child(&state.pool, child_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

    let logs = ReadingLog::list_for_child(&state.pool, child_id).await?;
    Ok(Json(logs))
}

/// Parent view over one of their children's logs.
#[axum::debug_handler]
pub async fn list_child_logs(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(query): Query<ChildLogsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let parent_id = principal.require_parent()?;

    User::find_child_of(&state.pool, query.child_id, parent_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Child not found or unauthorized".to_string()))?;

    let logs = ReadingLog::list_for_child(&state.pool, query.child_id).await?;
    Ok(Json(logs))
}
