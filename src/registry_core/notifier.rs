//! Telegram notification for newly discovered programs
//!
//! The notifier is an external collaborator behind a trait: the run hands it
//! the new-program count and the sorted pending list, and delivery is
//! best-effort. Transport failures are the caller's to log, never to raise.

use async_trait::async_trait;
use std::time::Duration;

use super::registry::PendingEntry;
use crate::config::Config;

/// Cap on listed entries so the message stays within Telegram limits
const MAX_LISTED_PROGRAMS: usize = 20;

/// Delivery seam for the registry-update summary
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        new_count: usize,
        pending: &[PendingEntry],
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Render the Markdown summary message.
///
/// Header with the new-program and total-pending counts, then up to the top
/// 20 pending entries by the established sort, each linking its solscan page,
/// and a trailing note for anything omitted.
pub fn build_message(new_count: usize, pending: &[PendingEntry]) -> String {
    let mut program_lines = Vec::new();
    for (i, prog) in pending.iter().take(MAX_LISTED_PROGRAMS).enumerate() {
        let short_id = prog.program_id.get(..8).unwrap_or(&prog.program_id);
        program_lines.push(format!(
            "{}. [{}...]({}) - {} txs",
            i + 1,
            short_id,
            prog.solscan_url,
            format_count(prog.count)
        ));
    }

    let mut programs_text = program_lines.join("\n");
    if pending.len() > MAX_LISTED_PROGRAMS {
        programs_text.push_str(&format!(
            "\n\n_...and {} more_",
            pending.len() - MAX_LISTED_PROGRAMS
        ));
    }

    format!(
        "🔍 *Program Registry Update*\n\n\
         📊 *{} new programs* detected\n\
         📋 *{} total* pending review\n\n\
         *Top programs to review:*\n\
         {}\n\n\
         After classifying, commit and push to GitHub.",
        new_count,
        pending.len(),
        programs_text
    )
}

/// Thousands-separated rendering, 1234567 -> "1,234,567"
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Sends the summary through the Telegram bot API
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Build a notifier from configuration. `None` when either credential is
    /// missing; the caller skips notification with a log line, not an error.
    pub fn from_config(config: &Config) -> Option<Self> {
        let bot_token = config.telegram_bot_token.clone()?;
        let chat_id = config.telegram_chat_id.clone()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .ok()?;

        Some(Self {
            bot_token,
            chat_id,
            client,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(
        &self,
        new_count: usize,
        pending: &[PendingEntry],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": build_message(new_count, pending),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("Telegram API error {}: {}", status, detail).into());
        }

        log::info!("✅ Telegram notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(pid: &str, count: u64) -> PendingEntry {
        PendingEntry {
            program_id: pid.to_string(),
            count,
            sources: vec!["GRPC".to_string()],
            sample_tx: Some("sig".to_string()),
            solscan_url: format!("https://solscan.io/account/{}", pid),
            status: "pending_review".to_string(),
            detected_at: "2026-08-05T12:00:00+00:00".to_string(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_message_header_and_entry_format() {
        let list = vec![pending("pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA", 1234567)];
        let message = build_message(1, &list);

        assert!(message.starts_with("🔍 *Program Registry Update*"));
        assert!(message.contains("📊 *1 new programs* detected"));
        assert!(message.contains("📋 *1 total* pending review"));
        assert!(message.contains(
            "1. [pAMMBay...](https://solscan.io/account/pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA) - 1,234,567 txs"
        ));
        assert!(!message.contains("more_"));
    }

    #[test]
    fn test_message_caps_at_twenty_entries() {
        let list: Vec<PendingEntry> = (0..25)
            .map(|i| pending(&format!("Program{:02}xx", i), 100 - i))
            .collect();
        let message = build_message(25, &list);

        assert!(message.contains("20. ["));
        assert!(!message.contains("21. ["));
        assert!(message.contains("_...and 5 more_"));
        assert!(message.contains("📋 *25 total* pending review"));
    }

    #[test]
    fn test_short_program_id_not_truncated() {
        let list = vec![pending("short", 3)];
        let message = build_message(1, &list);
        assert!(message.contains("[short...]"));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[tokio::test]
    #[ignore] // Run only with live credentials in TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID
    async fn test_send_live_notification() {
        dotenv::dotenv().ok();
        let config = Config::from_env();
        let notifier = TelegramNotifier::from_config(&config).expect("credentials required");

        let list = vec![pending("TestProgram111111111111111111111111", 1)];
        notifier.notify(1, &list).await.unwrap();
    }
}
