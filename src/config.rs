use std::env;
use std::path::PathBuf;

/// Configuration loaded from environment variables
pub struct Config {
    pub db_path: PathBuf,
    pub registry_path: PathBuf,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Paths fall back to the repository defaults. Telegram credentials are
    /// optional and only degrade the notification step when absent; empty
    /// values count as unset.
    pub fn from_env() -> Self {
        let db_path = env::var("EVENTS_DB_PATH")
            .unwrap_or_else(|_| "prisma/bot.db".to_string())
            .into();

        let registry_path = env::var("REGISTRY_PATH")
            .unwrap_or_else(|_| "data/solana_program_registry.json".to_string())
            .into();

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let telegram_chat_id = env::var("TELEGRAM_CHAT_ID")
            .ok()
            .filter(|v| !v.is_empty());

        Self {
            db_path,
            registry_path,
            telegram_bot_token,
            telegram_chat_id,
        }
    }

    pub fn has_telegram_credentials(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}
