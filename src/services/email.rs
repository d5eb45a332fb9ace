//! Email service for inventory exports

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use reqwest::Client;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    config::{EmailConfig, EmailProvider},
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    client: Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build email HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Send an HTML message through the configured transport
    pub async fn send_html(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        match self.config.provider {
            EmailProvider::Smtp => self.send_smtp(to, subject, html).await,
            EmailProvider::Http => self.send_http(to, subject, html).await,
        }
    }

    fn sender(&self) -> String {
        match self.config.from_name.as_deref() {
            Some(name) => format!("{} <{}>", name, self.config.from),
            None => self.config.from.clone(),
        }
    }

    async fn send_smtp(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let from_mailbox = Mailbox::from_str(&self.sender())
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body("This message contains an HTML inventory report.".to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port)
        .timeout(Some(Duration::from_secs(self.config.request_timeout_secs)));

        let mailer_builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => mailer_builder,
        };

        let mailer = mailer_builder.build();

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Upstream(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    async fn send_http(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let api_url = self
            .config
            .api_url
            .as_deref()
            .ok_or_else(|| AppError::Internal("email.api_url is not configured".to_string()))?;

        let mut request = self.client.post(api_url).json(&json!({
            "from": self.sender(),
            "to": [to],
            "subject": subject,
            "html": html,
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Email relay unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Email relay rejected message ({}): {}",
                status, body
            )));
        }
        Ok(())
    }
}
