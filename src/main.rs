use clap::Parser;

use noctrix::infrastructure::observability::{TracingConfig, init_tracing};
use noctrix::presentation::{App, Cli, Environment, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    let defaults = TracingConfig::default();
    init_tracing(TracingConfig {
        environment: environment.to_string(),
        json_format: settings.logging.json || defaults.json_format,
        default_filter: settings.logging.level.clone(),
    });

    let app = App::new(&settings)?;
    app.run(cli).await
}
