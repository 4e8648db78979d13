use tonic::Status;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::Password;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;

pub async fn login(
    service: &dyn AuthServicePort,
    request: LoginRequest,
) -> Result<LoginResponse, Status> {
    let email = EmailAddress::new(&request.email).map_err(AuthError::from)?;
    let password = Password::new(request.password).map_err(AuthError::from)?;
    let app_id = AppId::new(request.app_id).map_err(AuthError::from)?;

    let session = service
        .login(LoginCommand::new(email, password, app_id))
        .await?;

    Ok(LoginResponse {
        token: session.token,
    })
}
