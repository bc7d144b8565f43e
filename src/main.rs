use std::sync::Arc;
use witching_hour::logger::{self, LoggerConfig};
use witching_hour::{server, Config, GenerationAdapter, Studio};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env()?;
    logger::init_with_config(LoggerConfig::from_config(&config))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);

    let adapter = match GenerationAdapter::from_config(&config.backend).await {
        Ok(adapter) => adapter,
        Err(e) => {
            log::error!("❌ Failed to initialize the image backend: {}", e);
            return Err(e.into());
        }
    };

    let studio = Arc::new(Studio::new(adapter));
    server::run(&config, studio).await?;

    Ok(())
}
