// src/services/mailer.rs
//! Bulk notification: one message per recipient, failures isolated per send.
//!
//! The notifier never reads process state. Relay settings arrive as a
//! [`MailerConfig`], and the transport is obtained through a
//! [`MailerProvider`] so tests can swap in fakes.

use async_trait::async_trait;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::safe_email_log;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid email address '{0}'")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to provision development mail relay: {0}")]
    Provisioning(String),
}

/// Credentials and endpoint for an outbound SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Present only when every relay setting is set.
    pub relay: Option<RelayConfig>,
    /// Allows an ephemeral test relay when `relay` is absent.
    pub dev_fallback: bool,
    pub send_timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            relay: None,
            dev_fallback: false,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl MailerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = get("SMTP_PORT").and_then(|p| match p.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!(value = %p, "SMTP_PORT is not a valid port, relay disabled");
                None
            }
        });

        let relay = match (
            get("SMTP_HOST"),
            port,
            get("SMTP_USER"),
            get("SMTP_PASS"),
            get("FROM_EMAIL"),
        ) {
            (Some(host), Some(port), Some(username), Some(password), Some(from_email)) => {
                Some(RelayConfig {
                    host,
                    port,
                    username,
                    password,
                    from_email,
                })
            }
            _ => None,
        };

        let dev_fallback = get("DEV_EMAIL_FALLBACK")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let send_timeout = get("SMTP_SEND_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEND_TIMEOUT);

        Self {
            relay,
            dev_fallback,
            send_timeout,
        }
    }

    /// Whether a transport can be obtained at all, without contacting anything.
    pub fn is_available(&self) -> bool {
        self.relay.is_some() || self.dev_fallback
    }

    /// Human-readable transport mode for startup logging
    pub fn mode(&self) -> &'static str {
        match (&self.relay, self.dev_fallback) {
            (Some(_), _) => "smtp relay",
            (None, true) => "ephemeral dev relay",
            (None, false) => "disabled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryReceipt {
    /// Web preview of the message, only produced by test relays.
    pub preview_url: Option<String>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError>;
}

/// A transport ready to use together with the sender address it must use.
#[derive(Clone)]
pub struct Mailer {
    pub transport: Arc<dyn MailTransport>,
    pub from: String,
}

/// Selects (or provisions) the transport for one bulk run.
#[async_trait]
pub trait MailerProvider: Send + Sync {
    /// Configuration-only check, no network access.
    fn is_configured(&self) -> bool;

    async fn acquire(&self) -> Result<Mailer, MailError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSendSummary {
    pub sent: usize,
    pub total: usize,
    pub preview_urls: Vec<String>,
}

pub struct BulkNotifier {
    provider: Arc<dyn MailerProvider>,
    send_timeout: Duration,
}

impl BulkNotifier {
    pub fn new(provider: Arc<dyn MailerProvider>, send_timeout: Duration) -> Self {
        Self {
            provider,
            send_timeout,
        }
    }

    /// Fails fast with [`MailError::NotConfigured`] when no transport could
    /// ever be obtained.
    pub fn ensure_configured(&self) -> Result<(), MailError> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(MailError::NotConfigured)
        }
    }

    /// Acquires a transport and sends `subject`/`body` to each recipient.
    ///
    /// Fails only if no transport can be obtained. Individual send failures
    /// are logged and reflected in [`BulkSendSummary::sent`].
    pub async fn notify(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<BulkSendSummary, MailError> {
        let mailer = self.provider.acquire().await?;
        Ok(self.dispatch(&mailer, recipients, subject, body).await)
    }

    pub async fn dispatch(
        &self,
        mailer: &Mailer,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> BulkSendSummary {
        let mut summary = BulkSendSummary {
            total: recipients.len(),
            ..Default::default()
        };

        for to in recipients {
            let email = OutgoingEmail {
                from: mailer.from.clone(),
                to: to.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            };

            let outcome = tokio::time::timeout(self.send_timeout, mailer.transport.send(&email))
                .await
                .unwrap_or(Err(MailError::Timeout(self.send_timeout)));

            match outcome {
                Ok(receipt) => {
                    summary.sent += 1;
                    if let Some(url) = receipt.preview_url {
                        summary.preview_urls.push(url);
                    }
                }
                Err(e) => {
                    warn!(
                        to = %safe_email_log(to),
                        error = %e,
                        "Failed to send email, continuing with remaining recipients"
                    );
                }
            }
        }

        info!(
            sent = summary.sent,
            total = summary.total,
            "Bulk email run finished"
        );

        summary
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every send; addresses containing "fail" are rejected and
    /// addresses containing "slow" never complete.
    #[derive(Default)]
    pub struct FakeTransport {
        pub attempts: Mutex<Vec<String>>,
        pub preview: bool,
    }

    #[async_trait]
    impl MailTransport for FakeTransport {
        async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
            self.attempts.lock().unwrap().push(email.to.clone());
            if email.to.contains("slow") {
                std::future::pending::<()>().await;
            }
            if email.to.contains("fail") {
                return Err(MailError::Send("mailbox unavailable".to_string()));
            }
            Ok(DeliveryReceipt {
                preview_url: self
                    .preview
                    .then(|| format!("https://ethereal.email/message/{}", email.to)),
            })
        }
    }

    pub struct FakeProvider {
        pub transport: Option<Arc<FakeTransport>>,
    }

    #[async_trait]
    impl MailerProvider for FakeProvider {
        fn is_configured(&self) -> bool {
            self.transport.is_some()
        }

        async fn acquire(&self) -> Result<Mailer, MailError> {
            match &self.transport {
                Some(transport) => Ok(Mailer {
                    transport: transport.clone(),
                    from: "Hiring <hiring@example.com>".to_string(),
                }),
                None => Err(MailError::NotConfigured),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_relay() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "secret"),
            ("FROM_EMAIL", "hiring@example.com"),
        ]
    }

    fn notifier_with(transport: Arc<FakeTransport>, timeout: Duration) -> BulkNotifier {
        BulkNotifier::new(
            Arc::new(FakeProvider {
                transport: Some(transport),
            }),
            timeout,
        )
    }

    #[test]
    fn test_config_requires_every_relay_setting() {
        let config = MailerConfig::from_lookup(lookup(&full_relay()));
        assert_eq!(config.mode(), "smtp relay");
        assert!(config.is_available());
        let relay = config.relay.as_ref().expect("relay should be configured");
        assert_eq!(relay.host, "smtp.example.com");
        assert_eq!(relay.port, 587);

        for missing in ["SMTP_HOST", "SMTP_PORT", "SMTP_USER", "SMTP_PASS", "FROM_EMAIL"] {
            let pairs: Vec<_> = full_relay()
                .into_iter()
                .filter(|(k, _)| *k != missing)
                .collect();
            let config = MailerConfig::from_lookup(lookup(&pairs));
            assert!(config.relay.is_none(), "{missing} absent must disable relay");
        }
    }

    #[test]
    fn test_config_rejects_bad_port_and_blank_values() {
        let mut pairs = full_relay();
        pairs[1] = ("SMTP_PORT", "not-a-port");
        assert!(MailerConfig::from_lookup(lookup(&pairs)).relay.is_none());

        let mut pairs = full_relay();
        pairs[0] = ("SMTP_HOST", "   ");
        assert!(MailerConfig::from_lookup(lookup(&pairs)).relay.is_none());
    }

    #[test]
    fn test_config_dev_fallback_and_timeout() {
        let config = MailerConfig::from_lookup(lookup(&[
            ("DEV_EMAIL_FALLBACK", "TRUE"),
            ("SMTP_SEND_TIMEOUT_SECS", "3"),
        ]));
        assert!(config.dev_fallback);
        assert_eq!(config.send_timeout, Duration::from_secs(3));
        assert_eq!(config.mode(), "ephemeral dev relay");

        let config = MailerConfig::from_lookup(lookup(&[("DEV_EMAIL_FALLBACK", "yes")]));
        assert!(!config.dev_fallback);
        assert_eq!(config.send_timeout, DEFAULT_SEND_TIMEOUT);
        assert_eq!(config.mode(), "disabled");
        assert!(!config.is_available());
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_abort_batch() {
        let transport = Arc::new(FakeTransport::default());
        let notifier = notifier_with(transport.clone(), DEFAULT_SEND_TIMEOUT);

        let recipients = vec![
            "a@example.com".to_string(),
            "fail@example.com".to_string(),
            "c@example.com".to_string(),
        ];
        let summary = notifier
            .notify(&recipients, "Interview", "See you soon")
            .await
            .unwrap();

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.total, 3);
        assert!(summary.preview_urls.is_empty());
        // The recipient after the failure was still attempted
        assert_eq!(*transport.attempts.lock().unwrap(), recipients);
    }

    #[tokio::test]
    async fn test_preview_urls_collected_per_sent_message() {
        let transport = Arc::new(FakeTransport {
            preview: true,
            ..Default::default()
        });
        let notifier = notifier_with(transport, DEFAULT_SEND_TIMEOUT);

        let recipients = vec!["a@example.com".to_string(), "fail@example.com".to_string()];
        let summary = notifier.notify(&recipients, "s", "b").await.unwrap();

        assert_eq!(
            summary.preview_urls,
            vec!["https://ethereal.email/message/a@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stalled_send_times_out_and_batch_continues() {
        let transport = Arc::new(FakeTransport::default());
        let notifier = notifier_with(transport, Duration::from_millis(50));

        let recipients = vec!["slow@example.com".to_string(), "b@example.com".to_string()];
        let summary = notifier.notify(&recipients, "s", "b").await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.total, 2);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_before_sending() {
        let notifier = BulkNotifier::new(
            Arc::new(FakeProvider { transport: None }),
            DEFAULT_SEND_TIMEOUT,
        );

        assert!(matches!(
            notifier.ensure_configured(),
            Err(MailError::NotConfigured)
        ));
        let result = notifier.notify(&["a@example.com".to_string()], "s", "b").await;
        assert!(matches!(result, Err(MailError::NotConfigured)));
    }
}
