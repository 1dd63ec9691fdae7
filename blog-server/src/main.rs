use blog_server::infrastructure::config::AppConfig;
use blog_server::infrastructure::logging::init_logging;
use blog_server::server::{AppState, Backend, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let backend = Backend::from_config(&config).await?;
    let state = AppState::new(backend, &config);

    start_rest_server(config, state).await
}
