mod admin_api;
mod api_error;
mod auth_gateway;
mod document_api;
mod job_cache;
mod notifier;

pub use admin_api::AdminApi;
pub use api_error::ApiError;
pub use auth_gateway::{AuthGateway, CurrentUser, LoginResponse};
pub use document_api::DocumentApi;
pub use job_cache::{JobCache, JobCacheError};
pub use notifier::{Notification, NotificationLevel, Notifier};
