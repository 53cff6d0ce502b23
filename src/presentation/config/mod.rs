mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    ApiSettings, CacheSettings, ENV_PREFIX, LoggingSettings, PollingSettings, Settings,
    UploadSettings,
};
