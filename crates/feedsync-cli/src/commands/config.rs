use anyhow::{Context, Result};
use feedsync_core::config::FeedsyncConfig;
use feedsync_infrastructure::ConfigService;

pub fn show(service: &ConfigService, config: &FeedsyncConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("# {}", service.path().display());
    println!("{}", text);
    Ok(())
}

pub async fn init(service: &ConfigService) -> Result<()> {
    if tokio::fs::try_exists(service.path()).await.unwrap_or(false) {
        println!("Config already exists: {}", service.path().display());
        return Ok(());
    }

    service
        .save(&FeedsyncConfig::default())
        .await
        .context("Failed to write default config")?;
    println!("Wrote default config: {}", service.path().display());
    Ok(())
}
