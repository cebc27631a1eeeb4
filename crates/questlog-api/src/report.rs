use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const USER_AGENT: &str = "questlog/0.1.0";
const EMBED_COLOR: u32 = 16744192; // orange

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report is empty")]
    Empty,

    #[error("Report sink rejected the report with status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Webhook body in the Discord embed shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

impl ReportPayload {
    /// Build the webhook body for a user-written report
    pub fn new(report: &str, mention: Option<&str>, at: DateTime<Local>) -> Self {
        let content = match mention {
            Some(user_id) => format!("**New bug report** <@{}>", user_id),
            None => "**New bug report**".to_string(),
        };

        Self {
            content,
            embeds: vec![Embed {
                title: "QUESTLOG BUG REPORT".to_string(),
                description: report.trim().to_string(),
                color: EMBED_COLOR,
                fields: vec![EmbedField {
                    name: "Timestamp".to_string(),
                    value: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    inline: true,
                }],
                footer: EmbedFooter {
                    text: "questlog".to_string(),
                },
            }],
        }
    }
}

/// Fire-and-forget client for the bug-report webhook
///
/// One attempt per report. A failure is reported back to the caller so
/// the UI can warn about it, and nothing else depends on the outcome.
#[derive(Clone)]
pub struct ReportClient {
    client: reqwest::Client,
    webhook_url: String,
    mention: Option<String>,
}

impl ReportClient {
    pub fn new(webhook_url: impl Into<String>, mention: Option<String>) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            mention,
        })
    }

    pub async fn send(&self, report: &str) -> Result<()> {
        if report.trim().is_empty() {
            return Err(ReportError::Empty);
        }

        let payload = ReportPayload::new(report, self.mention.as_deref(), Local::now());
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Report sink responded with {}", status);
            return Err(ReportError::Rejected(status));
        }

        info!("Bug report delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_shape() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap();
        let payload = ReportPayload::new("  Quest X shows as locked  ", Some("42"), at);

        assert_eq!(payload.content, "**New bug report** <@42>");
        assert_eq!(payload.embeds.len(), 1);

        let embed = &payload.embeds[0];
        assert_eq!(embed.description, "Quest X shows as locked");
        assert_eq!(embed.color, 16744192);
        assert_eq!(embed.fields[0].value, "2025-03-01 14:05:09");
    }

    #[test]
    fn test_payload_serializes_to_webhook_json() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let payload = ReportPayload::new("hello", None, at);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["content"], "**New bug report**");
        assert_eq!(json["embeds"][0]["footer"]["text"], "questlog");
        assert_eq!(json["embeds"][0]["fields"][0]["inline"], true);
    }

    #[tokio::test]
    async fn test_blank_report_is_not_sent() {
        let client = ReportClient::new("http://127.0.0.1:9/webhook", None).unwrap();
        let err = client.send("   \n").await.unwrap_err();
        assert!(matches!(err, ReportError::Empty));
    }
}
