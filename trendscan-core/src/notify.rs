//! Message delivery: Telegram bot API, generic JSON webhook, or the log.
//!
//! Delivery failures are never fatal to a run; [`deliver`] logs them and
//! reports `false`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::NotifyConfig;

const TELEGRAM_API: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rejected by {service}: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },
}

pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Send and swallow the error. Returns whether the message went out.
pub fn deliver(notifier: &dyn Notifier, text: &str) -> bool {
    match notifier.send(text) {
        Ok(()) => {
            tracing::info!(notifier = notifier.name(), chars = text.len(), "message delivered");
            true
        }
        Err(e) => {
            tracing::error!(notifier = notifier.name(), error = %e, "message delivery failed");
            false
        }
    }
}

/// Telegram first, then the generic webhook, else the log.
pub fn notifier_from_config(cfg: &NotifyConfig) -> Result<Box<dyn Notifier>, NotifyError> {
    match (&cfg.telegram_token, &cfg.telegram_chat_id, &cfg.webhook_url) {
        (Some(token), Some(chat_id), _) => {
            Ok(Box::new(TelegramNotifier::new(token.clone(), chat_id.clone())?))
        }
        (token, chat_id, Some(url)) => {
            if token.is_some() != chat_id.is_some() {
                tracing::warn!("Telegram needs both TELEGRAM_TOKEN and TELEGRAM_CHAT_ID, using webhook");
            }
            Ok(Box::new(WebhookNotifier::new(url.clone())?))
        }
        (token, chat_id, None) => {
            if token.is_some() != chat_id.is_some() {
                tracing::warn!("Telegram needs both TELEGRAM_TOKEN and TELEGRAM_CHAT_ID, logging only");
            }
            Ok(Box::new(LogNotifier))
        }
    }
}

fn http_client() -> Result<reqwest::blocking::Client, NotifyError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()?)
}

fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, NotifyError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(NotifyError::Status {
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Result<Self, NotifyError> {
        Ok(Self {
            client: http_client()?,
            token,
            chat_id,
        })
    }

    fn url(&self) -> String {
        format!("{TELEGRAM_API}/bot{}/sendMessage", self.token)
    }

    fn payload<'a>(&'a self, text: &'a str) -> SendMessage<'a> {
        SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        }
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self.client.post(self.url()).json(&self.payload(text)).send()?;
        let result: TelegramResponse = check_status(resp)?.json()?;
        if result.ok {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                service: "telegram",
                reason: result.description.unwrap_or_else(|| "unknown error".into()),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` to an arbitrary URL (Slack, Discord proxies, etc.).
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, NotifyError> {
        Ok(Self {
            client: http_client()?,
            url,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()?;
        check_status(resp).map(|_| ())
    }
}

/// Writes the message to the log. Used for dry runs and missing credentials.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "trendscan::message", "\n{text}");
        Ok(())
    }
}
