//! Host bridge: the embedding chat platform's messaging surface.
//!
//! Delivery is fire-and-forget. Nothing here reports failure to the caller.
//! Each report leaves through exactly one channel: either the bridge posts it
//! itself, or the page forwards it with the host's `sendData`.

use crate::models::{Lang, MainButton};
use crate::report;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

const BOT_API_URL: &str = "https://api.telegram.org";

pub trait HostBridge: Send + Sync {
    fn send_data(&self, text: String);

    /// Whether the page must still hand the report to the host itself.
    fn forwards_to_host(&self) -> bool {
        true
    }

    fn main_button(&self, lang: Lang) -> MainButton {
        report::main_button(lang)
    }
}

/// Logs outbound reports and leaves delivery to the page.
#[derive(Debug, Default)]
pub struct LogBridge;

impl HostBridge for LogBridge {
    fn send_data(&self, text: String) {
        info!(report = %text, "report composed, page forwards it to host");
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Delivers reports as chat messages through the Bot API.
#[derive(Debug, Clone)]
pub struct BotApiBridge {
    client: reqwest::Client,
    url: String,
    chat_id: String,
}

impl BotApiBridge {
    pub fn new(token: &str, chat_id: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(BOT_API_URL, token, chat_id)
    }

    pub fn with_base_url(
        base_url: &str,
        token: &str,
        chat_id: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(format!("lumo/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/bot{token}/sendMessage", base_url.trim_end_matches('/')),
            chat_id: chat_id.into(),
        })
    }
}

/// Outcome of one Bot API call. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Rejected(u16),
    Failed,
}

impl BotApiBridge {
    pub async fn deliver(&self, text: &str) -> Delivery {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        match self.client.post(&self.url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => Delivery::Delivered,
            Ok(resp) => Delivery::Rejected(resp.status().as_u16()),
            Err(err) => {
                warn!("report delivery failed: {err}");
                Delivery::Failed
            }
        }
    }
}

impl HostBridge for BotApiBridge {
    fn send_data(&self, text: String) {
        let bridge = self.clone();
        tokio::spawn(async move {
            match bridge.deliver(&text).await {
                Delivery::Delivered => info!("report delivered"),
                Delivery::Rejected(status) => warn!(status, "report rejected by host"),
                Delivery::Failed => {}
            }
        });
    }

    fn forwards_to_host(&self) -> bool {
        false
    }
}

/// Keeps every sent report in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingBridge {
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostBridge for RecordingBridge {
    fn send_data(&self, text: String) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);
    }
}
