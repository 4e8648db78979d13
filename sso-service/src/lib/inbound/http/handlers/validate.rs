use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::bearer::BearerToken;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AppId;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn validate(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<ValidateRequestBody>,
) -> Result<ApiSuccess<ValidateResponseData>, ApiError> {
    let app_id = AppId::new(body.app_id).map_err(AuthError::from)?;

    state
        .auth_service
        .validate(&token, app_id)
        .await
        .map_err(ApiError::from)
        .map(|claims| ApiSuccess::new(StatusCode::OK, claims.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateRequestBody {
    app_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateResponseData {
    pub uid: i64,
    pub email: String,
    pub app_id: i32,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<auth::Claims> for ValidateResponseData {
    fn from(claims: auth::Claims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.email,
            app_id: claims.app_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
