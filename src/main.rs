use anyhow::Result;
use milo_relay::config::{LogFormat, LoggingSettings, Settings};
use milo_relay::Application;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside local development
    dotenv::dotenv().ok();

    let settings = Settings::new()?;
    init_tracing(&settings.logging);

    info!("Starting Milo relay");

    let app = Application::new(settings)?;
    app.run().await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level when set
fn init_tracing(logging: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}
