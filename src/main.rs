use std::net::{Ipv4Addr, SocketAddr};

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use kindred_server::config::AppConfig;
use kindred_server::database::client::{Database, DbConfig};
use kindred_server::middleware::error::AppResult;
use kindred_server::middleware::mw_ctx;
use kindred_server::{init, utils};

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    init::run_migrations(&db).await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config);

    if config.seed_demo_data {
        if let Err(err) = utils::seed::seed_demo_data(&ctx_state).await {
            tracing::warn!("->> demo seed failed: {}", err.error);
        }
    }

    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port));
    tracing::info!("->> LISTENING on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("listener to bind");

    axum::serve(listener, routes_all.into_make_service())
        .await
        .expect("server to run");

    Ok(())
}
