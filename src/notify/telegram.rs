use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{NotificationEvent, Notifier};

/// Telegram Bot API sink. Disabled cleanly when `TELEGRAM_TOKEN` or
/// `TELEGRAM_CHAT_ID` is missing — sends become debug-logged no-ops.
pub struct TelegramNotifier {
    credentials: Option<(String, String)>, // (token, chat_id)
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        let token = std::env::var("TELEGRAM_TOKEN").ok();
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();
        Self {
            credentials: token.zip(chat_id),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    /// Builder for tests/tools.
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            credentials: Some((token, chat_id)),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let Some((token, chat_id)) = &self.credentials else {
            tracing::debug!("Telegram disabled (no TELEGRAM_TOKEN / TELEGRAM_CHAT_ID)");
            return Ok(());
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let payload = SendMessagePayload {
            chat_id,
            text: &ev.message,
            parse_mode: "HTML",
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Telegram sendMessage HTTP error: {e}"));
                    }
                    tracing::info!(ts = %ev.ts.to_rfc3339(), "message delivered to Telegram");
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Telegram sendMessage request failed: {e}"));
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_without_credentials_is_a_noop() {
        let sink = TelegramNotifier {
            credentials: None,
            client: Client::new(),
            timeout: Duration::from_secs(1),
            max_retries: 1,
        };
        let ev = NotificationEvent::now("hola");
        assert!(sink.send(&ev).await.is_ok());
    }

    #[test]
    fn builders_adjust_limits() {
        let sink = TelegramNotifier::new("t".into(), "c".into())
            .with_timeout(2)
            .with_retries(5);
        assert_eq!(sink.timeout, Duration::from_secs(2));
        assert_eq!(sink.max_retries, 5);
    }
}
