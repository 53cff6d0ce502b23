use async_trait::async_trait;
use reqwest::Method;

use crate::application::ports::{AdminApi, ApiError};
use crate::domain::{AnalyticsSummary, NewUser, UsageSeries, UserAccount};

use super::api_client::{ApiClient, decode};

pub struct HttpAdminClient {
    client: ApiClient,
}

impl HttpAdminClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.client.get_json("/admin/users").await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.client
            .send(Method::POST, "/admin/users", |r| r.json(user))
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.client
            .send(Method::DELETE, &format!("/admin/users/{}", user_id), |r| r)
            .await?;
        Ok(())
    }

    async fn analytics_summary(&self) -> Result<AnalyticsSummary, ApiError> {
        self.client.get_json("/admin/analytics/summary").await
    }

    async fn usage_over_time(&self, days: u32) -> Result<UsageSeries, ApiError> {
        let response = self
            .client
            .send(Method::GET, "/admin/analytics/usage_over_time", |r| {
                r.query(&[("days", days)])
            })
            .await?;
        decode(response).await
    }
}
