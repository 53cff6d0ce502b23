mod admin_client;
mod api_client;
mod auth_client;
mod document_client;

pub use admin_client::HttpAdminClient;
pub use api_client::{ApiClient, DEFAULT_REQUEST_TIMEOUT, REQUEST_ID_HEADER, error_from_status};
pub use auth_client::HttpAuthClient;
pub use document_client::{HttpDocumentClient, UploadResponse};
