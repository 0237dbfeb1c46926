use async_trait::async_trait;

/// Adapter for the external image store. Uploads are awaited inline with the
/// request; a provider failure fails the request with no retry.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload an image and return its public URL.
    async fn upload_image(
        &self,
        data: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// In-memory stand-in for tests and local development.
pub struct MockMediaStorage;

#[async_trait]
impl MediaStorage for MockMediaStorage {
    async fn upload_image(
        &self,
        _data: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Mock media upload: {}/{}", folder, filename);
        Ok(format!("https://media.invalid/{}/{}", folder, filename))
    }
}
