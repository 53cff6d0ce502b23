use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::application::ports::ApiError;
use crate::infrastructure::observability::sanitize_detail;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared HTTP plumbing for the service adapters.
///
/// Clones share one connection pool and one cookie jar, so a login through
/// [`super::HttpAuthClient`] authenticates every other adapter built from the
/// same client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base url {base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Transport(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            base: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` into a request path relative to the base url. Each
    /// segment is percent-encoded, so a server-issued id containing `/`, `?`
    /// or `#` stays inside its own segment.
    pub fn route(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::Transport(format!("base url cannot carry a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        let base_path = self.base.path().trim_end_matches('/');
        let path = url.path();
        Ok(path.strip_prefix(base_path).unwrap_or(path).to_string())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and maps any non-2xx status to an [`ApiError`].
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let request = self
            .http
            .request(method.clone(), self.url(path))
            .header(REQUEST_ID_HEADER, &request_id);

        let response = build(request).send().await.map_err(|e| {
            tracing::debug!(request_id = %request_id, method = %method, path, error = %e, "Request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path,
            status = status.as_u16(),
            "Service call"
        );

        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        decode(response).await
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Maps an error status to an [`ApiError`], surfacing FastAPI's `detail`
/// field when the body has one. The detail is trimmed and redacted.
pub fn error_from_status(status: StatusCode, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.to_string(),
    };
    let detail = sanitize_detail(&detail);

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
        StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::CONFLICT => ApiError::Conflict(detail),
        other => ApiError::Status {
            status: other.as_u16(),
            detail,
        },
    }
}
