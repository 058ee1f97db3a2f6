// --- File: crates/intervu_mail/src/service.rs ---
use intervu_common::services::{BoxFuture, BoxedError, NotificationResult, NotificationService};
use intervu_config::MailConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// Mail-relay error types.
#[derive(Error, Debug)]
pub enum MailError {
    /// Error occurred while talking to the relay
    #[error("Mail relay request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the relay
    #[error("Mail relay returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },
}

impl From<MailError> for BoxedError {
    fn from(err: MailError) -> Self {
        BoxedError(Box::new(err))
    }
}

/// Outgoing message as the relay expects it.
#[derive(Serialize, Debug)]
pub struct MailMessage<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct RelayResponse {
    #[serde(default)]
    id: Option<String>,
}

struct Relay {
    api_url: String,
    sender: String,
    api_key: String,
}

/// Sends plain-text email through an HTTP mail relay.
///
/// Without a sender and api key every send is logged and reported as
/// `"skipped"`.
pub struct MailNotificationService {
    client: Client,
    relay: Option<Relay>,
}

impl MailNotificationService {
    pub fn new(config: Option<MailConfig>) -> Self {
        let relay = config.and_then(|mail| match (mail.sender, mail.api_key) {
            (Some(sender), Some(api_key)) if !mail.api_url.is_empty() => Some(Relay {
                api_url: mail.api_url,
                sender,
                api_key,
            }),
            _ => {
                warn!("Mail configuration incomplete; notifications will be skipped.");
                None
            }
        });
        Self {
            client: Client::new(),
            relay,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<NotificationResult, MailError> {
        let Some(relay) = self.relay.as_ref() else {
            warn!("Mail not configured, skipping email to {}", to);
            return Ok(NotificationResult {
                id: None,
                status: "skipped".to_string(),
            });
        };

        let message = MailMessage {
            from: &relay.sender,
            to,
            subject,
            text: body,
        };
        info!("Sending email to {}: {}", to, subject);
        let resp = self
            .client
            .post(&relay.api_url)
            .bearer_auth(&relay.api_key)
            .json(&message)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("Mail relay returned {}: {}", status, text);
            return Err(MailError::ApiError {
                status_code: status.as_u16(),
                message: text,
            });
        }

        let parsed: RelayResponse = serde_json::from_str(&text).unwrap_or_default();
        info!("Email sent successfully to {}", to);
        Ok(NotificationResult {
            id: parsed.id,
            status: "sent".to_string(),
        })
    }
}

impl NotificationService for MailNotificationService {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, BoxedError> {
        // Clone the values to avoid lifetime issues
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        Box::pin(async move {
            self.deliver(&to, &subject, &body)
                .await
                .map_err(BoxedError::from)
        })
    }
}
