use mindful_meals::config::ServerConfig;
use mindful_meals::server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };

    eprintln!("🥗 Mindful Meals API v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Listening: http://{}:{}", config.bind_addr, config.port);
    eprintln!("   Database: {}", config.database_url);

    if let Err(e) = server::serve(config).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
