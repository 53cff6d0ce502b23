use std::time::Duration;

use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::json;

use noctrix::application::ports::{AdminApi, ApiError, AuthGateway, DocumentApi};
use noctrix::domain::{AssetId, JobId, JobStatus, ResultArtifact, Role, StagedFile};
use noctrix::infrastructure::http::{
    ApiClient, HttpAdminClient, HttpAuthClient, HttpDocumentClient, error_from_status,
};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

#[test]
fn given_unsupported_scheme_when_building_client_then_returns_error() {
    assert!(ApiClient::new("ftp://example.com", Duration::from_secs(5)).is_err());
    assert!(ApiClient::new("not a url", Duration::from_secs(5)).is_err());
}

#[test]
fn given_trailing_slash_when_building_client_then_base_url_is_normalised() {
    let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();

    assert_eq!(client.base_url(), "http://localhost:8000");
}

#[test]
fn given_job_id_with_reserved_characters_when_building_route_then_each_segment_is_encoded() {
    let client = ApiClient::new("http://localhost:8000", Duration::from_secs(5)).unwrap();

    let path = client.route(&["jobs", "a/b?c#d", "status"]).unwrap();

    assert_eq!(path, "/jobs/a%2Fb%3Fc%23d/status");
}

#[test]
fn given_base_url_with_path_prefix_when_building_route_then_prefix_is_not_repeated() {
    let client = ApiClient::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();

    let path = client.route(&["jobs", "abc", "report.pdf"]).unwrap();

    assert_eq!(path, "/jobs/abc/report.pdf");
    assert_eq!(client.base_url(), "http://localhost:8000/api");
}

#[test]
fn given_detail_body_when_mapping_status_then_detail_is_surfaced() {
    let error = error_from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Not authenticated"}"#);

    assert!(matches!(error, ApiError::Unauthorized(ref d) if d == "Not authenticated"));
    assert!(error.is_auth_failure());
}

#[test]
fn given_each_status_when_mapping_then_variant_matches() {
    assert!(matches!(
        error_from_status(StatusCode::FORBIDDEN, ""),
        ApiError::Forbidden(ref d) if d == "Forbidden"
    ));
    assert!(matches!(
        error_from_status(StatusCode::NOT_FOUND, r#"{"detail":"Job not found"}"#),
        ApiError::NotFound(_)
    ));
    assert!(matches!(
        error_from_status(StatusCode::CONFLICT, "duplicate"),
        ApiError::Conflict(ref d) if d == "duplicate"
    ));
    assert!(matches!(
        error_from_status(StatusCode::BAD_GATEWAY, "upstream down"),
        ApiError::Status { status: 502, .. }
    ));
}

#[test]
fn given_validation_error_list_when_mapping_status_then_detail_is_kept_as_json() {
    let body = r#"{"detail": [{"loc": ["body", "username"], "msg": "field required"}]}"#;

    let error = error_from_status(StatusCode::UNPROCESSABLE_ENTITY, body);

    match error {
        ApiError::Status { status, detail } => {
            assert_eq!(status, 422);
            assert!(detail.contains("field required"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn given_file_when_uploading_then_multipart_is_posted_and_asset_id_returned() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload")
                .header_exists("x-request-id")
                .body_contains("filename=\"a.pdf\"")
                .body_contains("%PDF-1.4");
            then.status(200)
                .json_body(json!({"asset_id": 42, "message": "File uploaded successfully"}));
        })
        .await;
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("a.pdf");
    std::fs::write(&path, b"%PDF-1.4 test").unwrap();
    let file = StagedFile::from_path(&path).await.unwrap();
    let api = HttpDocumentClient::new(client_for(&server));

    let asset_id = api.upload(&file).await.unwrap();

    mock.assert_async().await;
    assert_eq!(asset_id, AssetId::new(42));
}

#[tokio::test]
async fn given_asset_when_processing_then_job_is_returned() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/process/42");
            then.status(200).json_body(json!({
                "job_id": "6b1f",
                "asset_id": 42,
                "file_name": "a.pdf",
                "status": "pending",
                "message": "Job has been queued."
            }));
        })
        .await;
    let api = HttpDocumentClient::new(client_for(&server));

    let job = api.process(AssetId::new(42)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(job.job_id, JobId::new("6b1f"));
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn given_job_when_polling_status_then_extra_fields_are_ignored() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/jobs/6b1f/status");
            then.status(200).json_body(json!({
                "_id": 3,
                "job_id": "6b1f",
                "asset_id": 42,
                "file_name": "a.pdf",
                "status": "complete",
                "message": "Done",
                "updated_at": "2024-05-01T10:00:00Z"
            }));
        })
        .await;
    let api = HttpDocumentClient::new(client_for(&server));

    let job = api.job_status(&JobId::new("6b1f")).await.unwrap();

    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.message, "Done");
}

#[tokio::test]
async fn given_unknown_job_when_polling_status_then_returns_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/jobs/nope/status");
            then.status(404).json_body(json!({"detail": "Job not found"}));
        })
        .await;
    let api = HttpDocumentClient::new(client_for(&server));

    let result = api.job_status(&JobId::new("nope")).await;

    assert!(matches!(result, Err(ApiError::NotFound(ref d)) if d == "Job not found"));
}

#[tokio::test]
async fn given_unexpected_body_when_polling_status_then_returns_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/jobs/6b1f/status");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;
    let api = HttpDocumentClient::new(client_for(&server));

    let result = api.job_status(&JobId::new("6b1f")).await;

    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}

#[tokio::test]
async fn given_complete_job_when_fetching_artifact_then_raw_bytes_are_returned() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/jobs/6b1f/report.pdf");
            then.status(200).body("%PDF-report");
        })
        .await;
    let api = HttpDocumentClient::new(client_for(&server));

    let bytes = api
        .fetch_artifact(&JobId::new("6b1f"), ResultArtifact::ReportPdf)
        .await
        .unwrap();

    assert_eq!(&bytes[..], b"%PDF-report");
}

#[tokio::test]
async fn given_unreachable_server_when_calling_then_returns_transport_error() {
    let api = HttpDocumentClient::new(
        ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap(),
    );

    let result = api.job_status(&JobId::new("6b1f")).await;

    assert!(matches!(result, Err(ApiError::Transport(_))));
}

#[tokio::test]
async fn given_credentials_when_logging_in_then_json_body_is_sent_and_role_parsed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"username": "alice", "password": "secret"}));
            then.status(200)
                .json_body(json!({"ok": true, "role": "Analyst", "password_change_required": false}));
        })
        .await;
    let auth = HttpAuthClient::new(client_for(&server));

    let response = auth.login("alice", "secret").await.unwrap();

    mock.assert_async().await;
    assert!(response.ok);
    assert_eq!(response.role, Some(Role::Analyst));
}

#[tokio::test]
async fn given_login_cookie_when_calling_other_adapters_then_cookie_is_sent_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200)
                .header("set-cookie", "access_token=abc123; Path=/; HttpOnly")
                .json_body(json!({"ok": true, "role": "Admin"}));
        })
        .await;
    let me = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/me")
                .header("cookie", "access_token=abc123");
            then.status(200).json_body(json!({"usr": "root", "role": "Admin"}));
        })
        .await;
    let client = client_for(&server);
    let auth = HttpAuthClient::new(client.clone());
    auth.login("root", "secret").await.unwrap();

    let user = HttpAuthClient::new(client).current_user().await.unwrap();

    me.assert_async().await;
    assert_eq!(user.usr, "root");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn given_no_session_when_fetching_current_user_then_returns_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/me");
            then.status(401).json_body(json!({"detail": "Not authenticated"}));
        })
        .await;
    let auth = HttpAuthClient::new(client_for(&server));

    let result = auth.current_user().await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
}

#[tokio::test]
async fn given_new_password_when_changing_then_both_passwords_are_posted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/users/me/change-password")
                .json_body(json!({"old_password": "old", "new_password": "new"}));
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    let auth = HttpAuthClient::new(client_for(&server));

    auth.change_password("old", "new").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn given_session_when_logging_out_and_refreshing_then_endpoints_are_hit() {
    let server = MockServer::start_async().await;
    let logout = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/logout");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/refresh");
            then.status(403)
                .json_body(json!({"detail": "Invalid or expired refresh token"}));
        })
        .await;
    let auth = HttpAuthClient::new(client_for(&server));

    auth.logout().await.unwrap();
    let refreshed = auth.refresh().await;

    logout.assert_async().await;
    refresh.assert_async().await;
    assert!(matches!(refreshed, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn given_admin_when_listing_users_then_accounts_are_parsed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/users");
            then.status(200).json_body(json!([
                {"id": 1, "username": "root", "role": "Admin", "last_login": "2024-05-01T10:00:00Z"},
                {"id": 2, "username": "vera", "role": "Viewer"}
            ]));
        })
        .await;
    let admin = HttpAdminClient::new(client_for(&server));

    let users = admin.list_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[1].role, Role::Viewer);
    assert!(users[1].last_login.is_none());
}

#[tokio::test]
async fn given_user_id_when_deleting_then_delete_request_is_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/admin/users/7");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    let admin = HttpAdminClient::new(client_for(&server));

    admin.delete_user(7).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn given_days_when_requesting_usage_then_query_parameter_is_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/admin/analytics/usage_over_time")
                .query_param("days", "7");
            then.status(200).json_body(json!({
                "granularity": "day",
                "points": [
                    {"bucket": "2024-05-01", "jobs_count": 3, "logins_count": 5},
                    {"bucket": "2024-05-02"}
                ]
            }));
        })
        .await;
    let admin = HttpAdminClient::new(client_for(&server));

    let series = admin.usage_over_time(7).await.unwrap();

    mock.assert_async().await;
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.points[0].jobs_count, 3);
    assert_eq!(series.points[1].logins_count, 0);
}

#[tokio::test]
async fn given_viewer_when_calling_admin_endpoint_then_returns_forbidden() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/analytics/summary");
            then.status(403).json_body(json!({"detail": "Forbidden"}));
        })
        .await;
    let admin = HttpAdminClient::new(client_for(&server));

    let result = admin.analytics_summary().await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}
