use standup_server::{config::Config, run_server};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("standup_server=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let config = Config::from_env()?;
    if let Err(e) = run_server(config).await {
        tracing::error!("Server failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
