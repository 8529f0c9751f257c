// src/services/smtp.rs
//! SMTP transports for the bulk notifier: the configured relay, or an
//! ephemeral Ethereal account provisioned per run in development.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::mailer::{
    DeliveryReceipt, MailError, MailTransport, Mailer, MailerConfig, MailerProvider,
    OutgoingEmail, RelayConfig,
};

const ETHEREAL_API_URL: &str = "https://api.nodemailer.com/user";
const ETHEREAL_WEB_URL: &str = "https://ethereal.email";
const ETHEREAL_SMTP_HOST: &str = "smtp.ethereal.email";
const ETHEREAL_SMTP_PORT: u16 = 587;

pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// Base URL for message previews; set only for test relays.
    preview_base: Option<String>,
}

impl SmtpMailTransport {
    /// Port 465 uses implicit TLS, every other port upgrades with STARTTLS
    /// when the server offers it.
    pub fn new(
        relay: &RelayConfig,
        timeout: Duration,
        preview_base: Option<String>,
    ) -> Result<Self, MailError> {
        let tls_parameters = TlsParameters::new(relay.host.clone())
            .map_err(|e| MailError::Send(format!("TLS setup for {} failed: {}", relay.host, e)))?;
        let tls = if relay.port == 465 {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(relay.host.as_str())
            .port(relay.port)
            .tls(tls)
            .credentials(Credentials::new(
                relay.username.clone(),
                relay.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            preview_base,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
        let message = build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        let preview_url = self.preview_base.as_deref().and_then(|base| {
            response
                .first_line()
                .and_then(extract_message_id)
                .map(|id| format!("{}/message/{}", base.trim_end_matches('/'), id))
        });

        Ok(DeliveryReceipt { preview_url })
    }
}

/// Plain-text message with a single recipient.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, MailError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|_| MailError::InvalidAddress(email.from.clone()))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Pulls the id out of an Ethereal acceptance line such as
/// `Accepted [STATUS=new MSGID=YzJ1...]`.
pub fn extract_message_id(line: &str) -> Option<&str> {
    let start = line.find("MSGID=")? + "MSGID=".len();
    let rest = &line[start..];
    let end = rest
        .find(|c: char| c == ']' || c.is_whitespace())
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

#[derive(Debug, Serialize)]
struct TestAccountRequest<'a> {
    requestor: &'a str,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct TestAccountSmtp {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct TestAccount {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: String,
    #[serde(default)]
    pass: String,
    #[serde(default)]
    smtp: Option<TestAccountSmtp>,
    #[serde(default)]
    web: Option<String>,
}

impl TestAccount {
    fn into_relay(self) -> Result<(RelayConfig, String), MailError> {
        if self.status != "success" {
            return Err(MailError::Provisioning(
                self.error
                    .unwrap_or_else(|| format!("unexpected status '{}'", self.status)),
            ));
        }
        if self.user.is_empty() || self.pass.is_empty() {
            return Err(MailError::Provisioning(
                "test account response had no credentials".to_string(),
            ));
        }

        let (host, port) = match self.smtp {
            Some(smtp) => (
                smtp.host.unwrap_or_else(|| ETHEREAL_SMTP_HOST.to_string()),
                smtp.port.unwrap_or(ETHEREAL_SMTP_PORT),
            ),
            None => (ETHEREAL_SMTP_HOST.to_string(), ETHEREAL_SMTP_PORT),
        };
        let web = self.web.unwrap_or_else(|| ETHEREAL_WEB_URL.to_string());

        let relay = RelayConfig {
            host,
            port,
            from_email: format!("Dev Test <{}>", self.user),
            username: self.user,
            password: self.pass,
        };
        Ok((relay, web))
    }
}

/// Chooses the configured relay, falls back to an ephemeral test relay when
/// allowed, and otherwise reports the service as not configured.
pub struct SmtpMailerProvider {
    config: MailerConfig,
    http: Client,
}

impl SmtpMailerProvider {
    pub fn new(config: MailerConfig, http: Client) -> Self {
        Self { config, http }
    }

    async fn provision_test_account(&self) -> Result<(RelayConfig, String), MailError> {
        let request = TestAccountRequest {
            requestor: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        };

        let account: TestAccount = self
            .http
            .post(ETHEREAL_API_URL)
            .json(&request)
            .timeout(self.config.send_timeout)
            .send()
            .await
            .map_err(|e| MailError::Provisioning(e.to_string()))?
            .json()
            .await
            .map_err(|e| MailError::Provisioning(e.to_string()))?;

        account.into_relay()
    }
}

#[async_trait]
impl MailerProvider for SmtpMailerProvider {
    fn is_configured(&self) -> bool {
        self.config.is_available()
    }

    async fn acquire(&self) -> Result<Mailer, MailError> {
        if let Some(relay) = &self.config.relay {
            let transport = SmtpMailTransport::new(relay, self.config.send_timeout, None)?;
            return Ok(Mailer {
                transport: Arc::new(transport),
                from: relay.from_email.clone(),
            });
        }

        if !self.config.dev_fallback {
            return Err(MailError::NotConfigured);
        }

        warn!("SMTP relay not configured, provisioning an ephemeral Ethereal account");
        let (relay, web) = self.provision_test_account().await?;
        info!(user = %relay.username, "Ethereal test account ready");

        let transport = SmtpMailTransport::new(&relay, self.config.send_timeout, Some(web))?;
        Ok(Mailer {
            transport: Arc::new(transport),
            from: relay.from_email,
        })
    }
}
