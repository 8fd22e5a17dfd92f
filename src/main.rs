use anyhow::Context;
use guildbank::purchase::HttpPurchaseApi;
use guildbank::{api, config::Config, db::init_db, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));

    let purchase = Arc::new(HttpPurchaseApi::new(
        config.purchase.api_url.clone(),
        config.purchase.api_key.clone(),
        config.purchase.secret_key.clone(),
    ));

    let app = api::create_router(api::AppState::new(config, repo, purchase));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
