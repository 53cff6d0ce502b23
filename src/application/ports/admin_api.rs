use async_trait::async_trait;

use crate::domain::{AnalyticsSummary, NewUser, UsageSeries, UserAccount};

use super::ApiError;

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError>;

    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError>;

    async fn delete_user(&self, user_id: i64) -> Result<(), ApiError>;

    async fn analytics_summary(&self) -> Result<AnalyticsSummary, ApiError>;

    async fn usage_over_time(&self, days: u32) -> Result<UsageSeries, ApiError>;
}
