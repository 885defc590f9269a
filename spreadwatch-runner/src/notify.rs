//! Notification delivery.
//!
//! Discord receives two requests: a JSON embed carrying the report, then a
//! multipart upload of the chart. Embed failure aborts the delivery; a
//! failed chart upload still counts as sent, without the image.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::reporting::ChartImage;

/// Discord rejects embed descriptions longer than this.
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub color: u32,
    pub footer: String,
    pub image: Option<ChartImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Skipped { reason: String },
    Sent { image_attached: bool },
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("webhook request failed: {0}")]
    Transport(String),
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<Delivery, NotifyError>;
}

/// Drops every notification. Used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, _notification: &Notification) -> Result<Delivery, NotifyError> {
        Ok(Delivery::Skipped {
            reason: "dry run".to_string(),
        })
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) -> Result<Delivery, NotifyError> {
        let mut sent = self
            .sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sent.push(notification.clone());
        Ok(Delivery::Sent {
            image_attached: notification.image.is_some(),
        })
    }
}

pub struct DiscordNotifier {
    client: reqwest::blocking::Client,
    webhook_url: Option<String>,
    username: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>, username: &str) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url: webhook_url.filter(|u| !u.trim().is_empty()),
            username: username.to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub fn embed_payload(&self, notification: &Notification) -> serde_json::Value {
        json!({
            "username": self.username,
            "embeds": [{
                "title": notification.title,
                "description": truncate_chars(&notification.body, MAX_DESCRIPTION_CHARS),
                "color": notification.color,
                "footer": { "text": notification.footer },
            }],
        })
    }

    fn check(resp: reqwest::blocking::Response) -> Result<(), NotifyError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn upload(&self, url: &str, image: &ChartImage) -> Result<(), NotifyError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type)
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        let form = Form::new()
            .text("username", self.username.clone())
            .part("file", part);
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Self::check(resp)
    }
}

impl Notifier for DiscordNotifier {
    fn send(&self, notification: &Notification) -> Result<Delivery, NotifyError> {
        let Some(url) = self.webhook_url.as_deref() else {
            info!("webhook URL not set, skipping notification");
            return Ok(Delivery::Skipped {
                reason: "webhook URL not set".to_string(),
            });
        };

        let resp = self
            .client
            .post(url)
            .json(&self.embed_payload(notification))
            .send()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Self::check(resp)?;
        info!(title = %notification.title, "notification sent");

        let image_attached = match &notification.image {
            Some(image) => match self.upload(url, image) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "chart upload failed");
                    false
                }
            },
            None => false,
        };
        Ok(Delivery::Sent { image_attached })
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(body: &str) -> Notification {
        Notification {
            title: "Buy - Test".to_string(),
            body: body.to_string(),
            color: 0x00FF00,
            footer: "Generated at 2024-03-08 09:00".to_string(),
            image: None,
        }
    }

    #[test]
    fn unset_webhook_skips() {
        let n = DiscordNotifier::new(None, "bot").unwrap();
        assert!(!n.is_configured());
        let d = n.send(&note("x")).unwrap();
        assert!(matches!(d, Delivery::Skipped { .. }));
    }

    #[test]
    fn blank_webhook_counts_as_unset() {
        let n = DiscordNotifier::new(Some("  ".to_string()), "bot").unwrap();
        assert!(!n.is_configured());
    }

    #[test]
    fn payload_has_embed_fields() {
        let n = DiscordNotifier::new(None, "Sector Spread Monitor").unwrap();
        let v = n.embed_payload(&note("body"));
        assert_eq!(v["username"], "Sector Spread Monitor");
        assert_eq!(v["embeds"][0]["title"], "Buy - Test");
        assert_eq!(v["embeds"][0]["color"], 65280);
        assert_eq!(v["embeds"][0]["footer"]["text"], "Generated at 2024-03-08 09:00");
    }

    #[test]
    fn long_description_is_truncated_on_char_boundary() {
        let n = DiscordNotifier::new(None, "bot").unwrap();
        let body = "é".repeat(MAX_DESCRIPTION_CHARS + 10);
        let v = n.embed_payload(&note(&body));
        let desc = v["embeds"][0]["description"].as_str().unwrap();
        assert_eq!(desc.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn unreachable_webhook_is_transport_error() {
        let n = DiscordNotifier::new(Some("http://127.0.0.1:9/hook".to_string()), "bot").unwrap();
        assert!(matches!(n.send(&note("x")), Err(NotifyError::Transport(_))));
    }

    #[test]
    fn recording_notifier_keeps_messages() {
        let r = RecordingNotifier::new();
        r.send(&note("a")).unwrap();
        r.send(&note("b")).unwrap();
        let sent = r.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].body, "b");
    }
}
