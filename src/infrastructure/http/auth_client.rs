use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::application::ports::{ApiError, AuthGateway, CurrentUser, LoginResponse};

use super::api_client::{ApiClient, decode};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

pub struct HttpAuthClient {
    client: ApiClient,
}

impl HttpAuthClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { username, password };
        let response = self
            .client
            .send(Method::POST, "/auth/login", |r| r.json(&body))
            .await?;
        decode(response).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.client
            .send(Method::POST, "/auth/logout", |r| r)
            .await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), ApiError> {
        self.client
            .send(Method::POST, "/auth/refresh", |r| r)
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.client.get_json("/users/me").await
    }

    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = ChangePasswordRequest {
            old_password,
            new_password,
        };
        self.client
            .send(Method::POST, "/users/me/change-password", |r| r.json(&body))
            .await?;
        Ok(())
    }
}
