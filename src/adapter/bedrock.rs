use super::classify::{classify_code, classify_message};
use super::prompt::NEGATIVE_PROMPT;
use super::ImageBackend;
use crate::config::BackendConfig;
use crate::error::GenerationError;
use crate::models::{AspectRatio, ImageReference};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Amazon Titan Image Generator through Bedrock. Credentials come from the
/// AWS provider chain, never from this crate's configuration.
#[derive(Clone)]
pub struct BedrockBackend {
    client: Client,
    model_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct TitanImageResponse {
    #[serde(default)]
    pub images: Vec<String>,
    pub error: Option<String>,
}

impl BedrockBackend {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub async fn from_config(config: &BackendConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region().to_string()))
            .load()
            .await;

        Self::new(Client::new(&aws_config), config.model())
    }

    pub fn dimensions(aspect_ratio: AspectRatio) -> (u32, u32) {
        match aspect_ratio {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Standard => (1152, 896),
            AspectRatio::Widescreen => (1408, 768),
            AspectRatio::Portrait => (768, 1408),
        }
    }

    pub fn payload(prompt: &str, aspect_ratio: AspectRatio) -> Value {
        let (width, height) = Self::dimensions(aspect_ratio);
        json!({
            "taskType": "TEXT_IMAGE",
            "textToImageParams": {
                "text": prompt,
                "negativeText": NEGATIVE_PROMPT
            },
            "imageGenerationConfig": {
                "numberOfImages": 1,
                "quality": "standard",
                "cfgScale": 8.0,
                "width": width,
                "height": height
            }
        })
    }

    pub fn parse_response(body: &[u8]) -> Result<ImageReference, GenerationError> {
        let titan_response: TitanImageResponse = serde_json::from_slice(body)
            .map_err(|e| GenerationError::Unknown(format!("Malformed Titan response: {}", e)))?;

        if let Some(error) = titan_response.error.filter(|e| !e.is_empty()) {
            return Err(classify_message(&error));
        }

        titan_response
            .images
            .into_iter()
            .find(|image| !image.is_empty())
            .map(|image| ImageReference::inline("image/png", image))
            .ok_or(GenerationError::MissingImageData)
    }
}

#[async_trait]
impl ImageBackend for BedrockBackend {
    fn model_label(&self) -> &str {
        &self.model_id
    }

    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageReference, GenerationError> {
        let request_json = serde_json::to_string(&Self::payload(prompt, aspect_ratio))
            .map_err(|e| GenerationError::Unknown(e.to_string()))?;

        log::info!("Generating image with model: {}", self.model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("Bedrock image generation error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    let message = service_error.message().unwrap_or("no message");
                    log::error!("Service error code: {:?}", service_error.code());
                    service_error
                        .code()
                        .and_then(|code| classify_code(code, message))
                        .unwrap_or_else(|| {
                            classify_message(&format!(
                                "{}: {}",
                                service_error.code().unwrap_or("unknown"),
                                message
                            ))
                        })
                } else {
                    GenerationError::Unknown(format!("AWS SDK error: {}", e))
                }
            })?;

        Self::parse_response(&response.body.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_sizes() {
        let payload = BedrockBackend::payload("a witch", AspectRatio::Portrait);
        assert_eq!(payload["taskType"], "TEXT_IMAGE");
        assert_eq!(payload["textToImageParams"]["text"], "a witch");
        assert_eq!(payload["imageGenerationConfig"]["width"], 768);
        assert_eq!(payload["imageGenerationConfig"]["height"], 1408);
    }

    #[test]
    fn test_every_ratio_has_dimensions() {
        let dimensions: Vec<(u32, u32)> = AspectRatio::ALL
            .iter()
            .map(|r| BedrockBackend::dimensions(*r))
            .collect();
        assert_eq!(
            dimensions,
            vec![(1024, 1024), (1152, 896), (1408, 768), (768, 1408)]
        );
    }

    #[test]
    fn test_parse_response() {
        let reference = BedrockBackend::parse_response(br#"{"images":["iVBORw0K"],"error":null}"#)
            .unwrap();
        assert_eq!(reference, ImageReference::inline("image/png", "iVBORw0K"));

        assert_eq!(
            BedrockBackend::parse_response(br#"{"images":[]}"#),
            Err(GenerationError::MissingImageData)
        );
        assert!(matches!(
            BedrockBackend::parse_response(b"not json"),
            Err(GenerationError::Unknown(_))
        ));
    }

    #[test]
    fn test_titan_filter_error() {
        let body = br#"{"images":[],"error":"This request has been blocked by our content filters."}"#;
        assert!(matches!(
            BedrockBackend::parse_response(body),
            Err(GenerationError::ContentPolicy(_))
        ));
    }
}
