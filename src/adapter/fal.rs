use super::http::HttpProvider;
use super::prompt::NEGATIVE_PROMPT;
use crate::error::GenerationError;
use crate::models::{AspectRatio, ImageReference};
use serde::Deserialize;
use serde_json::{json, Value};

/// fal.ai synchronous endpoint (`https://fal.run/<model>`).
pub struct FalProvider {
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct FalResponse {
    #[serde(default)]
    images: Vec<FalImage>,
    #[serde(default)]
    has_nsfw_concepts: Vec<bool>,
}

#[derive(Debug, Deserialize)]
struct FalImage {
    #[serde(default)]
    url: String,
}

impl FalProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn image_size(aspect_ratio: AspectRatio) -> &'static str {
        match aspect_ratio {
            AspectRatio::Square => "square_hd",
            AspectRatio::Standard => "landscape_4_3",
            AspectRatio::Widescreen => "landscape_16_9",
            AspectRatio::Portrait => "portrait_16_9",
        }
    }
}

impl HttpProvider for FalProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Key {}", self.api_key))]
    }

    fn request_body(&self, prompt: &str, aspect_ratio: AspectRatio) -> Value {
        json!({
            "prompt": prompt,
            "image_size": Self::image_size(aspect_ratio),
            "negative_prompt": NEGATIVE_PROMPT,
            "num_images": 1,
            "enable_safety_checker": true
        })
    }

    fn extract_image(&self, envelope: &Value) -> Result<ImageReference, GenerationError> {
        let response = FalResponse::deserialize(envelope)
            .map_err(|e| GenerationError::Unknown(format!("Malformed fal.ai response: {}", e)))?;

        if response.has_nsfw_concepts.first().copied().unwrap_or(false) {
            return Err(GenerationError::ContentPolicy(
                "fal.ai safety checker flagged the image".into(),
            ));
        }

        response
            .images
            .into_iter()
            .next()
            .filter(|image| !image.url.is_empty())
            .map(|image| ImageReference::parse(&image.url))
            .ok_or(GenerationError::MissingImageData)
    }
}
