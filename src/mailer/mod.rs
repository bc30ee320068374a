pub mod message;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::path::Path;
use tracing::{error, info};

use crate::config::{MailConfig, SENDER_EMAIL_VAR, SENDER_PASSWORD_VAR};
use crate::error::MailError;
use message::{build_message, parse_mailbox};

pub const DEFAULT_SUBJECT: &str = "Scraped Real Estate Data";

/// Sends the export file over a STARTTLS SMTP submission. All configuration,
/// credentials included, is handed in at construction.
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Every pre-flight check (credentials, attachment, addresses) runs before
    /// the SMTP server is contacted. Transport failures are logged and
    /// returned, never panicked on.
    pub async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment_path: &Path,
    ) -> Result<(), MailError> {
        let (sender, password) = match (&self.config.sender_email, &self.config.sender_password) {
            (Some(sender), Some(password)) => (sender, password),
            _ => {
                return Err(MailError::MissingCredentials(
                    SENDER_EMAIL_VAR,
                    SENDER_PASSWORD_VAR,
                ))
            }
        };

        if !attachment_path.is_file() {
            return Err(MailError::AttachmentNotFound(attachment_path.to_path_buf()));
        }
        let attachment = tokio::fs::read(attachment_path)
            .await
            .map_err(|source| MailError::AttachmentUnreadable {
                path: attachment_path.to_path_buf(),
                source,
            })?;
        let attachment_name = attachment_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "listings.csv".to_string());

        let message = build_message(
            parse_mailbox(sender)?,
            parse_mailbox(recipient)?,
            subject,
            body,
            &attachment_name,
            attachment,
        )?;

        let result = self.submit(sender, password, message).await;
        match &result {
            Ok(()) => info!("Email sent successfully to {}", recipient.trim()),
            Err(e) => error!("Error sending email to {}: {}", recipient.trim(), e),
        }
        result
    }

    async fn submit(
        &self,
        sender: &str,
        password: &str,
        message: lettre::Message,
    ) -> Result<(), MailError> {
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(Credentials::new(sender.to_string(), password.to_string()))
                .build();

        info!(
            "Connecting to {}:{}",
            self.config.smtp_host, self.config.smtp_port
        );
        transport.send(message).await?;
        Ok(())
    }
}
