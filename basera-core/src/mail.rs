use async_trait::async_trait;

/// Adapter for outbound account email. Sends happen inline with the request;
/// delivery failures surface as upstream errors with no retry queue.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the email-verification code issued at signup.
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
