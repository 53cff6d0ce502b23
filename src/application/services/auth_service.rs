use std::sync::Arc;

use crate::application::ports::{ApiError, AuthGateway};
use crate::domain::Session;

/// Turns the service's cookie-based login into explicit [`Session`] values.
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self { gateway }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AuthServiceError> {
        let response = match self.gateway.login(username, password).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized(_)) => return Err(AuthServiceError::InvalidCredentials),
            Err(e) => return Err(AuthServiceError::Api(e)),
        };

        if !response.ok {
            return Err(AuthServiceError::InvalidCredentials);
        }
        let role = response.role.ok_or(AuthServiceError::MissingRole)?;

        tracing::info!(role = %role, "Signed in");
        Ok(Session {
            username: username.to_string(),
            role,
            password_change_required: response.password_change_required,
        })
    }

    /// Picks up a session from a still-valid cookie. `None` means the caller
    /// has to sign in.
    pub async fn restore(&self) -> Result<Option<Session>, AuthServiceError> {
        match self.gateway.current_user().await {
            Ok(user) => Ok(Some(Session::new(user.usr, user.role))),
            Err(ApiError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(AuthServiceError::Api(e)),
        }
    }

    pub async fn refresh(&self) -> Result<(), AuthServiceError> {
        self.gateway.refresh().await.map_err(|e| match e {
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) => AuthServiceError::SessionExpired,
            other => AuthServiceError::Api(other),
        })
    }

    /// Changes the password. On success the service drops the session
    /// cookies, so the session ends here; on failure it stays signed in.
    pub async fn change_password(
        &self,
        session: Session,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        match self.gateway.change_password(old_password, new_password).await {
            Ok(()) => {
                tracing::info!(username = %session.username, "Password changed");
                Ok(())
            }
            Err(ApiError::Unauthorized(_)) => Err(AuthServiceError::InvalidCredentials),
            Err(e) => Err(AuthServiceError::Api(e)),
        }
    }

    pub async fn sign_out(&self, session: Session) -> Result<(), AuthServiceError> {
        self.gateway.logout().await.map_err(AuthServiceError::Api)?;
        tracing::info!(username = %session.username, "Signed out");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session expired, sign in again")]
    SessionExpired,
    #[error("login response did not include a role")]
    MissingRole,
    #[error("auth api: {0}")]
    Api(ApiError),
}
