use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::application::services::DEFAULT_USAGE_DAYS;
use crate::domain::{ResultArtifact, Role};

#[derive(Debug, Parser)]
#[command(
    name = "noctrix",
    version,
    about = "Upload documents to Noctrix and track their analysis"
)]
pub struct Cli {
    #[arg(long, env = "NOCTRIX_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "NOCTRIX_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload files and start processing them
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keep polling until every job is finished
        #[arg(long)]
        wait: bool,
    },
    /// List tracked jobs
    Jobs,
    /// Poll until every tracked job is finished
    Watch,
    /// Download a result file of a completed job
    Fetch {
        job_id: String,
        #[arg(long, value_enum, default_value_t = ArtifactKind::Report)]
        artifact: ArtifactKind,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the signed-in user
    Whoami,
    /// Change the password of the signed-in user
    ChangePassword {
        #[arg(long, env = "NOCTRIX_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Administration (Admin role only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List user accounts
    Users,
    /// Create a user account
    AddUser {
        username: String,
        #[arg(long, env = "NOCTRIX_NEW_USER_PASSWORD", hide_env_values = true)]
        user_password: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },
    /// Delete a user account
    RemoveUser { user_id: i64 },
    /// Show headline analytics
    Summary,
    /// Show daily jobs and logins
    Usage {
        #[arg(long, default_value_t = DEFAULT_USAGE_DAYS)]
        days: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactKind {
    Results,
    Report,
}

impl From<ArtifactKind> for ResultArtifact {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Results => ResultArtifact::ResultsJson,
            ArtifactKind::Report => ResultArtifact::ReportPdf,
        }
    }
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}
