use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};
use crate::models::{AlertMessage, MatchResult};

/// Delivers one alert text to its destination.
pub trait AlertTransport {
    fn send(&self, text: &str) -> Result<()>;

    /// Validate settings without touching the network.
    fn check_config(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` client.
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, client: Client) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) => Ok((token, chat_id)),
            (None, _) => Err(AppError::ConfigError("TELEGRAM_TOKEN is not set".to_string())),
            (_, None) => Err(AppError::ConfigError("TELEGRAM_CHAT_ID is not set".to_string())),
        }
    }
}

impl AlertTransport for TelegramClient {
    fn check_config(&self) -> Result<()> {
        self.credentials().map(|_| ())
    }

    fn send(&self, text: &str) -> Result<()> {
        let (token, chat_id) = self.credentials()?;
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);

        // reqwest errors carry the request URL, which embeds the bot token
        let response = self
            .client
            .post(&url)
            .form(&SendMessage { chat_id, text })
            .send()
            .map_err(|e| AppError::NotifyError(e.without_url().to_string()))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        let reply = serde_json::from_str::<TelegramReply>(&body).ok();

        if status.is_success() && reply.as_ref().is_none_or(|r| r.ok) {
            return Ok(());
        }

        let description = reply.and_then(|r| r.description).unwrap_or(body);
        Err(AppError::NotifyError(format!(
            "status {}: {}",
            status.as_u16(),
            description
        )))
    }
}

/// How the notify step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing matched, so nothing was sent.
    Skipped,
    Sent,
    MissingConfig,
    Failed,
}

/// Send a single alert for `matches`. Failures are logged, never raised.
///
/// Missing configuration is reported on every run, matches or not.
pub fn notify(matches: &[MatchResult], source_url: &str, transport: &dyn AlertTransport) -> Delivery {
    let configured = match transport.check_config() {
        Ok(()) => true,
        Err(e) => {
            error!("Notification disabled: {}", e);
            false
        }
    };

    if matches.is_empty() {
        info!("No matches found.");
        return Delivery::Skipped;
    }
    if !configured {
        return Delivery::MissingConfig;
    }

    let message = AlertMessage::compose(matches, source_url);
    match transport.send(message.as_str()) {
        Ok(()) => {
            info!("-> Notification sent: {}", message);
            Delivery::Sent
        }
        Err(e @ AppError::ConfigError(_)) => {
            error!("Notification disabled: {}", e);
            Delivery::MissingConfig
        }
        Err(e) => {
            error!("Error sending Telegram: {}", e);
            Delivery::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::http_client;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<String>>,
    }

    impl AlertTransport for RecordingTransport {
        fn send(&self, text: &str) -> Result<()> {
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct FailingTransport;

    impl AlertTransport for FailingTransport {
        fn send(&self, _text: &str) -> Result<()> {
            Err(AppError::NotifyError("connection reset".to_string()))
        }
    }

    /// Reports missing credentials and counts every call it receives.
    #[derive(Default)]
    struct UnconfiguredTransport {
        checks: Cell<usize>,
        sends: Cell<usize>,
    }

    impl AlertTransport for UnconfiguredTransport {
        fn check_config(&self) -> Result<()> {
            self.checks.set(self.checks.get() + 1);
            Err(AppError::ConfigError("TELEGRAM_CHAT_ID is not set".to_string()))
        }

        fn send(&self, _text: &str) -> Result<()> {
            self.sends.set(self.sends.get() + 1);
            Err(AppError::ConfigError("TELEGRAM_CHAT_ID is not set".to_string()))
        }
    }

    fn beluga() -> MatchResult {
        MatchResult {
            name: "Beluga".into(),
            description: "Transport".into(),
        }
    }

    #[test]
    fn empty_matches_send_nothing() {
        let transport = RecordingTransport::default();
        assert_eq!(notify(&[], "https://example.test", &transport), Delivery::Skipped);
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn sends_one_message_with_all_matches() {
        let transport = RecordingTransport::default();
        let matches = vec![
            beluga(),
            MatchResult {
                name: "A3ST".into(),
                description: String::new(),
            },
        ];

        assert_eq!(notify(&matches, "https://example.test", &transport), Delivery::Sent);

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Beluga, Transport\nA3ST"));
        assert!(sent[0].ends_with("Check now: https://example.test"));
    }

    #[test]
    fn transport_failure_is_swallowed() {
        assert_eq!(notify(&[beluga()], "https://example.test", &FailingTransport), Delivery::Failed);
    }

    #[test]
    fn missing_credentials_fail_before_network() {
        let config = TelegramConfig {
            // nothing listens here; reaching the network would be a Failed delivery
            api_base: "http://127.0.0.1:9".to_string(),
            token: Some("123:abc".to_string()),
            chat_id: None,
        };
        let client = TelegramClient::new(&config, http_client().unwrap());

        assert!(matches!(client.send("hi"), Err(AppError::ConfigError(_))));
        assert_eq!(notify(&[beluga()], "https://example.test", &client), Delivery::MissingConfig);
    }

    #[test]
    fn missing_config_is_checked_without_matches() {
        let transport = UnconfiguredTransport::default();

        assert_eq!(notify(&[], "https://example.test", &transport), Delivery::Skipped);
        assert_eq!(transport.checks.get(), 1);
        assert_eq!(transport.sends.get(), 0);
    }

    #[test]
    fn missing_config_blocks_send_with_matches() {
        let transport = UnconfiguredTransport::default();

        assert_eq!(notify(&[beluga()], "https://example.test", &transport), Delivery::MissingConfig);
        assert_eq!(transport.checks.get(), 1);
        assert_eq!(transport.sends.get(), 0);
    }

    #[test]
    fn telegram_config_check_needs_both_values() {
        let mut config = TelegramConfig {
            token: Some("123:abc".to_string()),
            chat_id: Some("42".to_string()),
            ..TelegramConfig::default()
        };
        assert!(TelegramClient::new(&config, http_client().unwrap()).check_config().is_ok());

        config.chat_id = None;
        let err = TelegramClient::new(&config, http_client().unwrap())
            .check_config()
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn missing_token_is_reported() {
        let client = TelegramClient::new(&TelegramConfig::default(), http_client().unwrap());
        let err = client.send("hi").unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }
}
