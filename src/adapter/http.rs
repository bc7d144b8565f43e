use super::classify::classify_http_failure;
use super::transport::Transport;
use super::ImageBackend;
use crate::error::GenerationError;
use crate::models::{AspectRatio, ImageReference};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Vendor-specific half of a JSON-over-HTTP image backend.
pub trait HttpProvider: Send + Sync {
    fn model(&self) -> &str;

    fn url(&self) -> String;

    fn headers(&self) -> Vec<(&'static str, String)>;

    fn request_body(&self, prompt: &str, aspect_ratio: AspectRatio) -> Value;

    /// Pulls the first image out of a 2xx envelope.
    fn extract_image(&self, envelope: &Value) -> Result<ImageReference, GenerationError>;
}

pub struct HttpBackend<P> {
    provider: P,
    transport: Arc<dyn Transport>,
}

impl<P: HttpProvider> HttpBackend<P> {
    pub fn new(provider: P, transport: Arc<dyn Transport>) -> Self {
        Self {
            provider,
            transport,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: HttpProvider> ImageBackend for HttpBackend<P> {
    fn model_label(&self) -> &str {
        self.provider.model()
    }

    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageReference, GenerationError> {
        let url = self.provider.url();
        let body = self.provider.request_body(prompt, aspect_ratio);
        log::debug!("Image request payload: {}", body);

        let response = self
            .transport
            .post_json(&url, &self.provider.headers(), &body)
            .await?;

        if !response.is_success() {
            log::error!("API error {}: {}", response.status, response.body);
            return Err(classify_http_failure(response.status, &response.body));
        }

        let envelope: Value = serde_json::from_str(&response.body).map_err(|e| {
            log::error!("Malformed response from {}: {}", self.provider.model(), e);
            GenerationError::Unknown(format!("Malformed response: {}", e))
        })?;

        self.provider.extract_image(&envelope)
    }
}
