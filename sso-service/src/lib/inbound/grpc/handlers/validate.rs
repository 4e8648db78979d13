use tonic::Status;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AppId;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::ValidateRequest;
use crate::proto::ValidateResponse;

pub async fn validate(
    service: &dyn AuthServicePort,
    request: ValidateRequest,
) -> Result<ValidateResponse, Status> {
    let app_id = AppId::new(request.app_id).map_err(AuthError::from)?;
    let claims = service.validate(&request.token, app_id).await?;

    Ok(claims.into())
}
