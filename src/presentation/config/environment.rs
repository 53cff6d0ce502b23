use std::fmt;
use std::str::FromStr;

/// Variable naming the deployment; unset means [`Environment::Local`].
pub const ENVIRONMENT_VAR: &str = "NOCTRIX_ENVIRONMENT";

/// Deployment the client talks to; selects the optional settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Local,
    Test,
    Prod,
}

impl Environment {
    /// Reads [`ENVIRONMENT_VAR`] from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::resolve(std::env::var(ENVIRONMENT_VAR).ok().as_deref())
    }

    /// Parses an optional value, falling back to the default when it is
    /// missing or blank.
    pub fn resolve(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Stem of the settings file for this deployment, e.g. `noctrix.prod`.
    pub fn settings_file(&self) -> String {
        format!("noctrix.{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "dev" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(format!(
                "{} must be one of local, test or prod, got {:?}",
                ENVIRONMENT_VAR, other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
