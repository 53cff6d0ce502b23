use std::sync::Arc;

use crate::application::ports::{AdminApi, ApiError};
use crate::domain::{
    AnalyticsSummary, NewUser, Permission, Role, Session, UsageSeries, UserAccount,
};

pub const DEFAULT_USAGE_DAYS: u32 = 30;

/// Admin-only user management and analytics, gated on the session role.
pub struct AdminService {
    session: Session,
    api: Arc<dyn AdminApi>,
}

impl AdminService {
    pub fn new(session: Session, api: Arc<dyn AdminApi>) -> Result<Self, AdminServiceError> {
        if !session.can(Permission::AdminAccess) {
            return Err(AdminServiceError::NotAdmin(session.role));
        }
        Ok(Self { session, api })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn list_users(&self) -> Result<Vec<UserAccount>, AdminServiceError> {
        Ok(self.api.list_users().await?)
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username, role = %user.role))]
    pub async fn create_user(&self, user: NewUser) -> Result<(), AdminServiceError> {
        if user.username.trim().len() < 3 {
            return Err(AdminServiceError::InvalidUsername(user.username));
        }
        if user.password.is_empty() {
            return Err(AdminServiceError::EmptyPassword);
        }
        self.api.create_user(&user).await?;
        tracing::info!("User created");
        Ok(())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), AdminServiceError> {
        self.api.delete_user(user_id).await?;
        tracing::info!(user_id, "User deleted");
        Ok(())
    }

    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary, AdminServiceError> {
        Ok(self.api.analytics_summary().await?)
    }

    pub async fn usage_over_time(&self, days: u32) -> Result<UsageSeries, AdminServiceError> {
        Ok(self.api.usage_over_time(days.max(1)).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    #[error("role {0} is not allowed to use admin endpoints")]
    NotAdmin(Role),
    #[error("username must be at least 3 characters: {0:?}")]
    InvalidUsername(String),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("admin api: {0}")]
    Api(#[from] ApiError),
}
