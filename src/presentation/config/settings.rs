use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::PollPolicy;

use super::Environment;

pub const ENV_PREFIX: &str = "NOCTRIX";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub polling: PollingSettings,
    pub upload: UploadSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub interval_secs: u64,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PollingSettings {
    pub fn to_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            initial_backoff: Duration::from_secs(self.initial_backoff_secs),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            max_consecutive_failures: self.max_consecutive_failures,
        }
    }
}

impl Settings {
    /// Layers built-in defaults, then `noctrix.<environment>.{toml,yaml,json}`
    /// if present, then `NOCTRIX_<SECTION>__<KEY>` environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::builder(environment)?.build()?.try_deserialize()
    }

    pub fn builder(
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("polling.interval_secs", 5)?
            .set_default("polling.initial_backoff_secs", 5)?
            .set_default("polling.max_backoff_secs", 300)?
            .set_default("polling.max_consecutive_failures", 12)?
            .set_default("upload.concurrency", 1)?
            .set_default("cache.directory", ".noctrix/jobs")?
            .set_default("logging.level", "info,noctrix=debug")?
            .set_default("logging.json", false)?
            .add_source(
                File::with_name(&environment.settings_file()).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Ok(builder)
    }
}
