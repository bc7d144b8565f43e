//! The generation adapter: one request in, one classified result out.
//!
//! Backends are interchangeable behind [`ImageBackend`]; exactly one is chosen
//! when the adapter is built from configuration.

pub mod bedrock;
pub mod classify;
pub mod fal;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod prompt;
pub mod transport;

use crate::config::{BackendConfig, BackendKind};
use crate::error::{GenerationError, Result};
use crate::logger;
use crate::models::{AspectRatio, GenerationRequest, GenerationResult, ImageReference};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub use bedrock::BedrockBackend;
pub use fal::FalProvider;
pub use gemini::GeminiProvider;
pub use http::{HttpBackend, HttpProvider};
pub use openai::OpenAiProvider;
pub use prompt::compose_prompt;
pub use transport::{HttpResponse, ReqwestTransport, Transport};

#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Recorded on each result as `model_label`.
    fn model_label(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> std::result::Result<ImageReference, GenerationError>;
}

#[derive(Clone)]
pub struct GenerationAdapter {
    backend: Arc<dyn ImageBackend>,
}

impl GenerationAdapter {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    /// Builds the configured backend, using reqwest for HTTP vendors.
    pub async fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::default())).await
    }

    pub async fn with_transport(
        config: &BackendConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let model = config.model();
        let endpoint = config.endpoint();

        let backend: Arc<dyn ImageBackend> = match config.kind {
            BackendKind::Fal => Arc::new(HttpBackend::new(
                FalProvider::new(config.require_api_key()?, model, endpoint),
                transport,
            )),
            BackendKind::OpenAi => Arc::new(HttpBackend::new(
                OpenAiProvider::new(config.require_api_key()?, model, endpoint),
                transport,
            )),
            BackendKind::Gemini => Arc::new(HttpBackend::new(
                GeminiProvider::new(config.require_api_key()?, model, endpoint),
                transport,
            )),
            BackendKind::Bedrock => Arc::new(BedrockBackend::from_config(config).await),
        };

        log::info!("🧙 Using {} backend with model {}", config.kind, model);
        Ok(Self::new(backend))
    }

    pub fn model_label(&self) -> &str {
        self.backend.model_label()
    }

    /// Issues exactly one backend call. No retry, no timeout of its own.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError> {
        let prompt = compose_prompt(request);
        log::info!("🔮 Starting generation with prompt: {}", prompt);
        let _timer = logger::timer("Image generation");

        let image_reference = self
            .backend
            .generate(&prompt, request.aspect_ratio)
            .await
            .map_err(|e| {
                log::error!("🔥 Generation failed: {}", e);
                e
            })?;

        if image_reference.is_empty() {
            log::error!("🔥 Backend returned an empty image reference");
            return Err(GenerationError::MissingImageData);
        }

        let result = GenerationResult {
            id: Uuid::new_v4().to_string(),
            image_reference,
            source_prompt: request.source_prompt(),
            created_at: Utc::now(),
            model_label: self.backend.model_label().to_string(),
        };
        log::info!("✅ Image generated: {}", result.id);
        Ok(result)
    }
}
