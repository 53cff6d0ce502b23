use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::Role;

use super::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub password_change_required: bool,
}

/// Claims of the current access token as echoed by `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub usr: String,
    pub role: Role,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    async fn refresh(&self) -> Result<(), ApiError>;

    async fn current_user(&self) -> Result<CurrentUser, ApiError>;

    async fn change_password(&self, old_password: &str, new_password: &str)
    -> Result<(), ApiError>;
}
