use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    AppState,
    error::AppError,
    middleware::Principal,
    routes::reading_log::model::ReadingLog,
    routes::user::model::{Role, User},
};

use super::model::ReadingSummary;

/// Reading summary for one child. The token must belong to the child itself
/// or to the child's parent; anyone else learns nothing about the child id.
#[axum::debug_handler]
pub async fn get_summary(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(child_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let child = match principal.role {
        Role::Child if principal.user_id == child_id => {
            User::find_child(&state.pool, child_id).await?
        }
        Role::Parent => User::find_child_of(&state.pool, child_id, principal.user_id).await?,
        Role::Child => None,
    }
    .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

    let logs = ReadingLog::list_for_child(&state.pool, child.id).await?;
    let today = Utc::now().date_naive();

    Ok(Json(ReadingSummary::compute(
        child.id, child.name, logs, today,
    )))
}
