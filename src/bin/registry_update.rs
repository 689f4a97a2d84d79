//! Registry Update Binary - Program Registry Batch Job
//!
//! Scans the captured event database, aggregates the on-chain programs those
//! events reference, reconciles them into the persisted program registry,
//! and sends a Telegram summary when anything new shows up.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin registry_update
//! ```
//!
//! ## Environment Variables
//!
//! - EVENTS_DB_PATH - SQLite event database (default: prisma/bot.db)
//! - REGISTRY_PATH - Registry JSON document (default: data/solana_program_registry.json)
//! - TELEGRAM_BOT_TOKEN - Bot token for notifications (optional)
//! - TELEGRAM_CHAT_ID - Target chat for notifications (optional)
//! - RUST_LOG - Logging level (optional, default: info)
//!
//! The registry file must already exist: this tool updates a curated
//! document, it never creates one. At most one instance should run against a
//! given registry path; concurrent runs would race the read-modify-write.

use chrono::Utc;
use solregistry::registry_core::{
    extract_program_stats, reconcile, EventReader, Notifier, Registry, RegistryError,
    TelegramNotifier,
};
use solregistry::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env();

    log::info!("🚀 Starting program registry update");
    log::info!("📊 Configuration:");
    log::info!("   Events database: {}", config.db_path.display());
    log::info!("   Registry: {}", config.registry_path.display());
    log::info!(
        "   Telegram notifications: {}",
        if config.has_telegram_credentials() {
            "enabled"
        } else {
            "disabled"
        }
    );

    // Read phase: stream the event table and fold per-program stats
    log::info!("🔌 Connecting to events database...");
    let reader = EventReader::open(&config.db_path)?;

    log::info!("📖 Processing events...");
    let aggregate = extract_program_stats(&reader)?;
    log::info!(
        "📦 Extracted {} unique programs from {} events",
        aggregate.len(),
        aggregate.events_folded()
    );

    // The store is closed before the registry is touched; the two phases
    // never overlap.
    drop(reader);

    // Write phase: reconcile into the persisted registry
    log::info!("📂 Loading registry...");
    let mut registry = match Registry::load(&config.registry_path) {
        Ok(registry) => registry,
        Err(e @ RegistryError::Missing(_)) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let new_count = reconcile(&mut registry, &aggregate, Utc::now());
    registry.save(&config.registry_path)?;
    log::info!(
        "💾 Registry updated: {} verified, {} pending review",
        registry.verified_count,
        registry.pending_count
    );

    // Best-effort notification, only when something new turned up
    if new_count > 0 {
        match TelegramNotifier::from_config(&config) {
            Some(notifier) => {
                if let Err(e) = notifier.notify(new_count, &registry.pending_review).await {
                    log::error!("Failed to send Telegram notification: {}", e);
                }
            }
            None => {
                log::info!("📵 Telegram credentials not found - skipping notification");
            }
        }
    }

    log::info!("✅ Program registry update completed");
    Ok(())
}
