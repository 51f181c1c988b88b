use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use shared::{LoginRequest, LoginResponse};

use crate::domain::mappers::SessionMapper;
use crate::domain::session::SessionUser;
use crate::io::{ApiClient, ApiError};
use crate::storage::AuthGateway;

/// Logs in against `/auth/login` and keeps the bearer token in the shared client
#[derive(Clone)]
pub struct RestAuthGateway {
    client: Arc<ApiClient>,
}

impl RestAuthGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for RestAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<Option<SessionUser>> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = match self.client.post_json("/auth/login", &request).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let user = SessionMapper::from_dto(response.user)?;
        self.client.set_token(response.token);
        debug!("Stored bearer token for {}", user.username);
        Ok(Some(user))
    }

    async fn validate(&self, _user: &SessionUser) -> Result<bool> {
        if !self.client.has_token() {
            return Ok(false);
        }
        match self.client.get_json::<Value>("/auth/validar", &[]).await {
            Ok(_) => Ok(true),
            Err(ApiError::Unauthorized(_)) | Err(ApiError::Forbidden(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn logout(&self) -> Result<()> {
        self.client.clear_token();
        Ok(())
    }
}
