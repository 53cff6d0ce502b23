use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyticsSummary {
    pub total_users: u64,
    pub files_processed_last_7d: u64,
    pub login_success: u64,
    pub login_failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsageSeries {
    pub granularity: String,
    pub points: Vec<UsagePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsagePoint {
    pub bucket: NaiveDate,
    #[serde(default)]
    pub jobs_count: u64,
    #[serde(default)]
    pub logins_count: u64,
}
