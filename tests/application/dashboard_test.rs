use std::sync::Arc;
use std::time::Duration;

use noctrix::application::services::{ArtifactError, Dashboard, DashboardDeps, PollPolicy};
use noctrix::domain::{JobCacheKey, JobId, JobStatus, ResultArtifact};
use noctrix::infrastructure::cache::InMemoryJobCache;

use crate::helpers::{MockDocumentApi, RecordingNotifier, analyst, job, staged};

fn deps(api: Arc<MockDocumentApi>, cache: Arc<InMemoryJobCache>) -> DashboardDeps {
    DashboardDeps {
        api,
        cache,
        notifier: Arc::new(RecordingNotifier::new()),
        poll_policy: PollPolicy::default(),
        upload_concurrency: 1,
    }
}

#[tokio::test(start_paused = true)]
async fn given_submitted_file_when_poller_runs_then_job_settles_as_complete() {
    let api = Arc::new(MockDocumentApi::new());
    let cache = Arc::new(InMemoryJobCache::new());
    let mut dashboard = Dashboard::open(analyst("alice"), deps(api.clone(), cache.clone())).await;

    dashboard.stager_mut().stage([staged("a.pdf", 1000)]);
    let report = dashboard.stager_mut().submit().await.unwrap();
    let job_id = report.jobs[0].job_id.clone();
    api.push_status(
        job_id.as_str(),
        Ok(job(job_id.as_str(), "a.pdf", JobStatus::Processing)),
    );
    api.push_status(
        job_id.as_str(),
        Ok(job(job_id.as_str(), "a.pdf", JobStatus::Complete)),
    );

    dashboard.wait_until_settled(Duration::from_millis(500)).await;

    assert_eq!(
        dashboard.store().get(&job_id).await.unwrap().status,
        JobStatus::Complete
    );
    assert_eq!(api.status_calls_for(job_id.as_str()), 2);
    dashboard.close().await;
}

#[tokio::test]
async fn given_open_dashboard_when_closing_then_session_is_handed_back() {
    let dashboard = Dashboard::open(
        analyst("alice"),
        deps(Arc::new(MockDocumentApi::new()), Arc::new(InMemoryJobCache::new())),
    )
    .await;

    let session = dashboard.close().await;

    assert_eq!(session.username, "alice");
}

#[tokio::test]
async fn given_user_switch_when_reopening_then_previous_jobs_stay_with_their_owner() {
    let api = Arc::new(MockDocumentApi::new());
    let cache = Arc::new(InMemoryJobCache::new());

    let mut alice = Dashboard::open(analyst("alice"), deps(api.clone(), cache.clone())).await;
    alice.stager_mut().stage([staged("a.pdf", 1)]);
    alice.stager_mut().submit().await.unwrap();
    alice.close().await;

    let bob = Dashboard::open(analyst("bob"), deps(api.clone(), cache.clone())).await;

    assert!(bob.store().jobs().await.is_empty());
    assert!(cache.contains(&JobCacheKey::for_user("alice")).await);
    assert!(!cache.contains(&JobCacheKey::for_user("bob")).await);
    bob.close().await;
}

#[tokio::test]
async fn given_unknown_job_when_downloading_artifact_then_returns_unknown_job() {
    let dir = tempfile::TempDir::new().unwrap();
    let dashboard = Dashboard::open(
        analyst("alice"),
        deps(Arc::new(MockDocumentApi::new()), Arc::new(InMemoryJobCache::new())),
    )
    .await;

    let result = dashboard
        .download_artifact(
            &JobId::new("missing"),
            ResultArtifact::ReportPdf,
            &dir.path().join("report.pdf"),
        )
        .await;

    assert!(matches!(result, Err(ArtifactError::UnknownJob(_))));
    dashboard.close().await;
}

#[tokio::test]
async fn given_pending_job_when_downloading_artifact_then_returns_not_complete() {
    let dir = tempfile::TempDir::new().unwrap();
    let api = Arc::new(MockDocumentApi::new());
    api.push_status("abc", Ok(job("abc", "a.pdf", JobStatus::Processing)));
    let dashboard =
        Dashboard::open(analyst("alice"), deps(api.clone(), Arc::new(InMemoryJobCache::new()))).await;
    dashboard
        .store()
        .append(job("abc", "a.pdf", JobStatus::Pending))
        .await
        .unwrap();

    let result = dashboard
        .download_artifact(
            &JobId::new("abc"),
            ResultArtifact::ResultsJson,
            &dir.path().join("results.json"),
        )
        .await;

    assert!(matches!(
        result,
        Err(ArtifactError::NotComplete {
            status: JobStatus::Processing,
            ..
        })
    ));
    assert_eq!(api.status_calls_for("abc"), 1);
    dashboard.close().await;
}

#[tokio::test]
async fn given_locally_pending_job_finished_on_server_when_downloading_then_status_refreshed_and_saved() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("report.pdf");
    let api = Arc::new(MockDocumentApi::new().with_artifact(
        "abc",
        ResultArtifact::ReportPdf,
        b"%PDF-1.7",
    ));
    api.push_status("abc", Ok(job("abc", "a.pdf", JobStatus::Complete)));
    let dashboard =
        Dashboard::open(analyst("alice"), deps(api.clone(), Arc::new(InMemoryJobCache::new()))).await;
    dashboard
        .store()
        .append(job("abc", "a.pdf", JobStatus::Pending))
        .await
        .unwrap();

    let written = dashboard
        .download_artifact(&JobId::new("abc"), ResultArtifact::ReportPdf, &destination)
        .await
        .unwrap();

    assert_eq!(written, 8);
    assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.7");
    assert_eq!(
        dashboard.store().get(&JobId::new("abc")).await.unwrap().status,
        JobStatus::Complete
    );
    dashboard.close().await;
}

#[tokio::test]
async fn given_status_refresh_fails_when_downloading_then_returns_api_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let api = Arc::new(MockDocumentApi::new().failing_status("abc"));
    let dashboard =
        Dashboard::open(analyst("alice"), deps(api.clone(), Arc::new(InMemoryJobCache::new()))).await;
    dashboard
        .store()
        .append(job("abc", "a.pdf", JobStatus::Processing))
        .await
        .unwrap();

    let result = dashboard
        .download_artifact(
            &JobId::new("abc"),
            ResultArtifact::ResultsJson,
            &dir.path().join("results.json"),
        )
        .await;

    assert!(matches!(result, Err(ArtifactError::Api(_))));
    assert!(!dir.path().join("results.json").exists());
    dashboard.close().await;
}

#[tokio::test(start_paused = true)]
async fn given_dashboard_dropped_without_close_when_intervals_pass_then_no_status_calls_are_made() {
    let api = Arc::new(MockDocumentApi::new().failing_status("abc"));
    let dashboard =
        Dashboard::open(analyst("alice"), deps(api.clone(), Arc::new(InMemoryJobCache::new()))).await;
    dashboard
        .store()
        .append(job("abc", "a.pdf", JobStatus::Pending))
        .await
        .unwrap();

    drop(dashboard);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(api.status_calls_for("abc"), 0);
}

#[tokio::test]
async fn given_complete_job_when_downloading_artifact_then_bytes_are_written_to_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("results.json");
    let api = Arc::new(MockDocumentApi::new().with_artifact(
        "abc",
        ResultArtifact::ResultsJson,
        b"{\"pages\": 3}",
    ));
    let dashboard =
        Dashboard::open(analyst("alice"), deps(api, Arc::new(InMemoryJobCache::new()))).await;
    dashboard
        .store()
        .append(job("abc", "a.pdf", JobStatus::Complete))
        .await
        .unwrap();

    let written = dashboard
        .download_artifact(&JobId::new("abc"), ResultArtifact::ResultsJson, &destination)
        .await
        .unwrap();

    assert_eq!(written, 12);
    assert_eq!(std::fs::read(&destination).unwrap(), b"{\"pages\": 3}");
    dashboard.close().await;
}
