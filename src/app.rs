use crate::domain::error::Result;
use crate::infrastructure::bootstrap::build_state;
use crate::infrastructure::config::Settings;
use crate::interfaces::http::start_server;

pub async fn run() -> Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    // Some deployments keep the file named `env` rather than `.env`.
    let _ = dotenvy::from_filename("env");
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env()?;
    let state = build_state(&settings);

    tracing::info!(port = settings.port, "Starting server");
    start_server(state, settings.port)?.await?;
    Ok(())
}
