use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::application::ports::{AdminApi, DocumentApi, JobCache, Notifier};
use crate::application::services::{AdminService, AuthService, Dashboard, DashboardDeps};
use crate::domain::{Job, JobId, NewUser, ResultArtifact, Session, StagedFile};
use crate::infrastructure::cache::FileJobCache;
use crate::infrastructure::http::{ApiClient, HttpAdminClient, HttpAuthClient, HttpDocumentClient};
use crate::infrastructure::notify::TracingNotifier;

use super::cli::{AdminCommand, Cli, Command};
use super::config::Settings;

const SETTLE_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Wires settings into adapters and runs one command line invocation.
pub struct App {
    auth: AuthService,
    admin_api: Arc<dyn AdminApi>,
    deps: DashboardDeps,
}

impl App {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = ApiClient::new(&settings.api.base_url, settings.api.request_timeout())
            .context("failed to create API client")?;
        let cache: Arc<dyn JobCache> = Arc::new(
            FileJobCache::new(settings.cache.directory.clone())
                .context("failed to open job cache directory")?,
        );
        let api: Arc<dyn DocumentApi> = Arc::new(HttpDocumentClient::new(client.clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        Ok(Self {
            auth: AuthService::new(Arc::new(HttpAuthClient::new(client.clone()))),
            admin_api: Arc::new(HttpAdminClient::new(client)),
            deps: DashboardDeps {
                api,
                cache,
                notifier,
                poll_policy: settings.polling.to_policy(),
                upload_concurrency: settings.upload.concurrency,
            },
        })
    }

    pub async fn run(&self, cli: Cli) -> anyhow::Result<()> {
        let (Some(username), Some(password)) = (cli.username.as_deref(), cli.password.as_deref())
        else {
            bail!("not signed in: sign in with --username and --password");
        };
        let session = self.auth.sign_in(username, password).await?;
        if session.password_change_required {
            tracing::warn!("The service requires a password change for this account");
        }

        match cli.command {
            Command::Whoami => {
                println!("{} ({})", session.username, session.role);
                self.sign_out(session).await;
            }
            Command::ChangePassword { new_password } => {
                // The server clears the session only when the change succeeds.
                if let Err(e) = self
                    .auth
                    .change_password(session.clone(), password, &new_password)
                    .await
                {
                    self.sign_out(session).await;
                    return Err(e.into());
                }
                println!("Password changed. Sign in again with the new password.");
            }
            Command::Admin { command } => {
                let admin = match AdminService::new(session.clone(), Arc::clone(&self.admin_api)) {
                    Ok(admin) => admin,
                    Err(e) => {
                        self.sign_out(session).await;
                        return Err(e.into());
                    }
                };
                let result = run_admin(&admin, command).await;
                self.sign_out(session).await;
                result?;
            }
            command => {
                let mut dashboard = Dashboard::open(session, self.deps.clone()).await;
                let result = run_dashboard(&mut dashboard, command).await;
                let session = dashboard.close().await;
                self.sign_out(session).await;
                result?;
            }
        }

        Ok(())
    }

    async fn sign_out(&self, session: Session) {
        if let Err(e) = self.auth.sign_out(session).await {
            tracing::warn!(error = %e, "Sign-out failed");
        }
    }
}

async fn run_dashboard(dashboard: &mut Dashboard, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Upload { files, wait } => {
            let mut staged = Vec::with_capacity(files.len());
            for path in &files {
                match StagedFile::from_path(path).await {
                    Ok(file) => staged.push(file),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping file"),
                }
            }

            let stager = dashboard.stager_mut();
            stager.stage(staged);
            let report = stager.submit().await?;
            for job in &report.jobs {
                print_job(job);
            }
            for failure in &report.failures {
                println!("FAILED  {}: {}", failure.file_name, failure.error);
            }

            if wait {
                wait_for_jobs(dashboard).await;
            }
        }
        Command::Jobs => {
            let jobs = dashboard.store().jobs().await;
            if jobs.is_empty() {
                println!("No tracked jobs.");
            }
            for job in &jobs {
                print_job(job);
            }
        }
        Command::Watch => wait_for_jobs(dashboard).await,
        Command::Fetch {
            job_id,
            artifact,
            output,
        } => {
            let job_id = JobId::new(job_id);
            let artifact = ResultArtifact::from(artifact);
            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("{}_{}", job_id, artifact.file_name())));
            let written = dashboard
                .download_artifact(&job_id, artifact, &output)
                .await?;
            println!("Saved {} ({} bytes)", output.display(), written);
        }
        Command::Whoami | Command::ChangePassword { .. } | Command::Admin { .. } => {
            bail!("command does not run against the job dashboard")
        }
    }

    Ok(())
}

async fn wait_for_jobs(dashboard: &Dashboard) {
    let active = dashboard.store().active_job_ids().await.len();
    if active > 0 {
        println!("Waiting for {} job(s). Press Ctrl-C to stop.", active);
        tokio::select! {
            _ = dashboard.wait_until_settled(SETTLE_CHECK_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, jobs keep processing on the server");
            }
        }
    }
    for job in dashboard.store().jobs().await {
        print_job(&job);
    }
}

async fn run_admin(admin: &AdminService, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Users => {
            for user in admin.list_users().await? {
                println!(
                    "{:>5}  {:<24}  {:<8}  {}",
                    user.id,
                    user.username,
                    user.role.as_str(),
                    user.last_login.as_deref().unwrap_or("-")
                );
            }
        }
        AdminCommand::AddUser {
            username,
            user_password,
            role,
        } => {
            admin
                .create_user(NewUser {
                    username: username.clone(),
                    password: user_password,
                    role,
                })
                .await?;
            println!("Created {} ({})", username, role);
        }
        AdminCommand::RemoveUser { user_id } => {
            admin.delete_user(user_id).await?;
            println!("Deleted user {}", user_id);
        }
        AdminCommand::Summary => {
            let summary = admin.analytics_summary().await?;
            println!("Users:                 {}", summary.total_users);
            println!("Files processed (7d):  {}", summary.files_processed_last_7d);
            println!("Successful logins:     {}", summary.login_success);
            println!("Failed logins:         {}", summary.login_failed);
        }
        AdminCommand::Usage { days } => {
            let series = admin.usage_over_time(days).await?;
            println!("{:<12}  {:>6}  {:>6}", series.granularity, "jobs", "logins");
            for point in series.points {
                println!(
                    "{:<12}  {:>6}  {:>6}",
                    point.bucket.to_string(),
                    point.jobs_count, point.logins_count
                );
            }
        }
    }

    Ok(())
}

fn print_job(job: &Job) {
    println!(
        "{}  {:<10}  {}  {}",
        job.job_id,
        job.status.as_str(),
        job.file_name,
        job.message
    );
}
