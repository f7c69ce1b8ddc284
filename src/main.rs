use std::process::ExitCode;

use tracing::{error, info};

use profile_service::{Config, Database, TokenService, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = profile_service::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        profile_service::logging::init_console_only(&config.logging.level);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> profile_service::Result<()> {
    info!("Profile service starting");

    let db = Database::open(&config.database.url, config.database.max_connections).await?;

    let tokens = TokenService::from_files(
        &config.auth.private_key_path,
        &config.auth.public_key_path,
        config.auth.token_expiry_secs,
    )?;
    info!(
        "Loaded signing keys from {} and {}",
        config.auth.private_key_path, config.auth.public_key_path
    );

    let server = WebServer::new(&config.server, db, tokens)?;
    info!("Server configured on {}", server.addr());
    server.run().await
}
