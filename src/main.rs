use openjudge_web::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "openjudge_web=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        gateway = %config.api.base_url,
        environment = ?config.api.environment,
        static_dir = %config.server.static_dir.display(),
        "starting"
    );

    let addr = config.server.bind_addr()?;
    let state = AppState::new(config.server);
    if !state.has_bundle() {
        tracing::warn!(
            index = %state.index_path().display(),
            "SPA bundle not found; every path except /health will 404"
        );
    }

    app::serve(app::build_app(state), addr).await
}
