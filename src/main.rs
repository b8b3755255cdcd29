use anyhow::Result;
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use ebay_monitor::config::Config;
use ebay_monitor::monitor::Monitor;
use ebay_monitor::notify::TelegramNotifier;
use ebay_monitor::scrape::PageClient;
use ebay_monitor::server::{self, SharedListings};
use ebay_monitor::store::NoveltyTracker;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish()
        .try_init();

    // Config
    let config_path = std::env::var("CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(&config_path)?;
    info!(searches = config.searches.len(), "configuration loaded");

    // Init subsystems
    let store = config
        .track_scraped_urls
        .then(|| config.scraped_file.clone());
    let tracker = NoveltyTracker::load(store)?;
    let notifier = TelegramNotifier::new(&config.message, &config.telegram)?;

    let buffer = config.web_server.then(SharedListings::default);
    if let Some(buffer) = &buffer {
        server::spawn(&config.listen_addr, buffer.clone())?;
    }

    let mut monitor = Monitor::new(&config, PageClient::new(), notifier, tracker, buffer);
    monitor.run().await?;

    Ok(())
}
