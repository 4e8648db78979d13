use std::sync::Arc;

use tonic::Request;
use tonic::Response;
use tonic::Status;

use super::handlers::is_admin;
use super::handlers::login;
use super::handlers::register;
use super::handlers::validate;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::auth_server::Auth;
use crate::proto::IsAdminRequest;
use crate::proto::IsAdminResponse;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;
use crate::proto::RegisterRequest;
use crate::proto::RegisterResponse;
use crate::proto::ValidateRequest;
use crate::proto::ValidateResponse;

pub struct AuthGrpcService {
    service: Arc<dyn AuthServicePort>,
}

impl AuthGrpcService {
    pub fn new(service: Arc<dyn AuthServicePort>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl Auth for AuthGrpcService {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let response = register::register(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let response = login::login(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> Result<Response<IsAdminResponse>, Status> {
        let response = is_admin::is_admin(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn validate(
        &self,
        request: Request<ValidateRequest>,
    ) -> Result<Response<ValidateResponse>, Status> {
        let response = validate::validate(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
