use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn is_admin(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<ApiSuccess<IsAdminResponseData>, ApiError> {
    let user_id = UserId::new(user_id).map_err(AuthError::from)?;

    state
        .auth_service
        .is_admin(user_id)
        .await
        .map_err(ApiError::from)
        .map(|is_admin| {
            ApiSuccess::new(
                StatusCode::OK,
                IsAdminResponseData {
                    user_id: user_id.0,
                    is_admin,
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsAdminResponseData {
    pub user_id: i64,
    pub is_admin: bool,
}
