pub mod cli;
pub mod config;
mod runner;

pub use cli::{AdminCommand, ArtifactKind, Cli, Command};
pub use config::{Environment, Settings};
pub use runner::App;
