//! Thin client for the Telegram Bot API `sendMessage` call.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use herald_common::error::AppError;
use herald_common::types::{Markup, RenderedMessage};

use crate::Transport;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Per-request timeout. The dispatcher imposes no deadline of its own, so
/// this is the only bound on how long a send can block.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
///
/// Without a bot token the client runs in disabled mode: every send logs
/// the message and reports success without touching the network. This lets
/// the whole pipeline run in environments with no live credentials.
pub struct TelegramClient {
    http: reqwest::Client,
    send_url: String,
    enabled: bool,
}

impl TelegramClient {
    pub fn new(bot_token: Option<&str>) -> Self {
        Self::with_api_base(bot_token, TELEGRAM_API_BASE)
    }

    /// Build a client against a non-default API base URL (tests, proxies).
    pub fn with_api_base(bot_token: Option<&str>, api_base: &str) -> Self {
        let token = bot_token.filter(|t| !t.is_empty());
        let enabled = token.is_some();

        if !enabled {
            tracing::warn!(
                "Telegram bot token not configured - transport disabled, messages will be logged only"
            );
        }

        Self {
            http: reqwest::Client::new(),
            send_url: format!(
                "{}/bot{}/sendMessage",
                api_base,
                token.unwrap_or_default()
            ),
            enabled,
        }
    }

    fn build_request<'a>(chat_id: i64, message: &'a RenderedMessage) -> SendMessageRequest<'a> {
        let parse_mode = match message.markup {
            Markup::Plain => None,
            Markup::Markdown => Some("Markdown"),
        };

        let reply_markup = if message.buttons.is_empty() {
            None
        } else {
            // One button per keyboard row
            Some(InlineKeyboardMarkup {
                inline_keyboard: message
                    .buttons
                    .iter()
                    .map(|b| {
                        vec![KeyboardButton {
                            text: &b.label,
                            url: &b.url,
                        }]
                    })
                    .collect(),
            })
        };

        SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode,
            reply_markup,
        }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send(&self, chat_id: i64, message: &RenderedMessage) -> Result<(), AppError> {
        if !self.enabled {
            tracing::info!(chat_id, text = %message.text, "Transport disabled - Telegram message logged only");
            return Ok(());
        }

        let request = Self::build_request(chat_id, message);

        let response = self
            .http
            .post(&self.send_url)
            .timeout(SEND_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Telegram send to {chat_id} failed: {e}")))?;

        response.error_for_status().map_err(|e| {
            AppError::Transport(format!("Telegram send to {chat_id} rejected: {e}"))
        })?;

        tracing::debug!(chat_id, "Sent Telegram message");
        Ok(())
    }
}

/// Body of the `sendMessage` call. Absent fields are omitted entirely.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<KeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_common::types::InlineButton;

    fn plain_message(text: &str) -> RenderedMessage {
        RenderedMessage {
            text: text.to_string(),
            markup: Markup::Plain,
            buttons: vec![],
        }
    }

    #[tokio::test]
    async fn test_disabled_mode_short_circuits() {
        // Base URL points at a closed port: any network attempt would error,
        // so Ok proves the call never left the process.
        let client = TelegramClient::with_api_base(None, "http://127.0.0.1:1");
        let result = client.send(12345, &plain_message("hello")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_disabled() {
        let client = TelegramClient::with_api_base(Some(""), "http://127.0.0.1:1");
        assert!(client.send(12345, &plain_message("hello")).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_api_surfaces_transport_error() {
        let client = TelegramClient::with_api_base(Some("token"), "http://127.0.0.1:1");
        let result = client.send(12345, &plain_message("hello")).await;
        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[test]
    fn test_request_body_markdown_and_buttons() {
        let message = RenderedMessage {
            text: "*hi*".to_string(),
            markup: Markup::Markdown,
            buttons: vec![InlineButton {
                label: "💬 Message John".to_string(),
                url: "https://t.me/traveler1".to_string(),
            }],
        };
        let body = serde_json::to_value(TelegramClient::build_request(42, &message)).unwrap();
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["parse_mode"], "Markdown");
        assert_eq!(body["reply_markup"]["inline_keyboard"][0][0]["text"], "💬 Message John");
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["url"],
            "https://t.me/traveler1"
        );
    }

    #[test]
    fn test_request_body_plain_omits_optional_fields() {
        let body = serde_json::to_value(TelegramClient::build_request(42, &plain_message("hi"))).unwrap();
        assert!(body.get("parse_mode").is_none());
        assert!(body.get("reply_markup").is_none());
    }
}
