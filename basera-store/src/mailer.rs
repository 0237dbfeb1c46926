use async_trait::async_trait;
use basera_core::mail::Mailer;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::app_config::MailConfig;

/// Delivers account email over SMTP. A new transport is built per send to
/// avoid connection pooling issues; the send blocks inline with the request
/// and is not retried.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials: Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ),
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Verify your Basera account")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your Basera verification code is {}.\n\n\
                 Enter it to activate your account. The code expires shortly; \
                 if you did not sign up, ignore this email.",
                code
            ))?;

        let transport = SmtpTransport::relay(&self.host)?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();

        transport.send(&email)?;
        Ok(())
    }
}

/// Logs codes instead of sending them. The development default.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(to = %to, code = %code, "Verification email (console mode)");
        Ok(())
    }
}
