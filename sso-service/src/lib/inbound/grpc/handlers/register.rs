use tonic::Status;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::Password;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::RegisterRequest;
use crate::proto::RegisterResponse;

pub async fn register(
    service: &dyn AuthServicePort,
    request: RegisterRequest,
) -> Result<RegisterResponse, Status> {
    let email = EmailAddress::new(&request.email).map_err(AuthError::from)?;
    let password = Password::new(request.password).map_err(AuthError::from)?;

    let user_id = service
        .register(RegisterCommand::new(email, password))
        .await?;

    Ok(RegisterResponse { user_id: user_id.0 })
}
