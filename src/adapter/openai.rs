use super::http::HttpProvider;
use crate::error::GenerationError;
use crate::models::{AspectRatio, ImageReference};
use serde::Deserialize;
use serde_json::{json, Value};

/// OpenAI Images API (`POST /images/generations`).
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

impl OpenAiProvider {
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

    /// Only three sizes exist; 4:3 goes to the square size, its nearest match.
    pub fn size(aspect_ratio: AspectRatio) -> &'static str {
        match aspect_ratio {
            AspectRatio::Square | AspectRatio::Standard => "1024x1024",
            AspectRatio::Widescreen => "1792x1024",
            AspectRatio::Portrait => "1024x1792",
        }
    }
}

impl HttpProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/images/generations", self.endpoint)
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", self.api_key))]
    }

    fn request_body(&self, prompt: &str, aspect_ratio: AspectRatio) -> Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": Self::size(aspect_ratio)
        })
    }

    fn extract_image(&self, envelope: &Value) -> Result<ImageReference, GenerationError> {
        let response = ImagesResponse::deserialize(envelope)
            .map_err(|e| GenerationError::Unknown(format!("Malformed OpenAI response: {}", e)))?;

        let first = response
            .data
            .into_iter()
            .next()
            .ok_or(GenerationError::MissingImageData)?;

        match (first.url, first.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(ImageReference::Url(url)),
            (_, Some(data)) if !data.is_empty() => Ok(ImageReference::inline("image/png", data)),
            _ => Err(GenerationError::MissingImageData),
        }
    }
}
