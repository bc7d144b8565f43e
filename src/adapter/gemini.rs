use super::http::HttpProvider;
use crate::error::GenerationError;
use crate::models::{AspectRatio, ImageReference};
use serde_json::{json, Value};

const SAFETY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Gemini `generateContent` with image output; images come back as inline parts.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiProvider {
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
}

fn inline_image(part: &Value) -> Option<ImageReference> {
    let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
    let data = inline.get("data").and_then(Value::as_str)?;
    if data.is_empty() {
        return None;
    }
    let mime_type = inline
        .get("mimeType")
        .or_else(|| inline.get("mime_type"))
        .and_then(Value::as_str)
        .unwrap_or("image/png");
    Some(ImageReference::inline(mime_type, data))
}

impl HttpProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("x-goog-api-key", self.api_key.clone())]
    }

    fn request_body(&self, prompt: &str, aspect_ratio: AspectRatio) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": aspect_ratio.as_str() }
            }
        })
    }

    fn extract_image(&self, envelope: &Value) -> Result<ImageReference, GenerationError> {
        if let Some(reason) = envelope
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str)
        {
            return Err(GenerationError::ContentPolicy(format!(
                "Prompt blocked: {}",
                reason
            )));
        }

        let candidates = envelope
            .get("candidates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let image = candidates
            .iter()
            .filter_map(|candidate| candidate.get("content")?.get("parts")?.as_array())
            .flatten()
            .find_map(inline_image);
        if let Some(image) = image {
            return Ok(image);
        }

        let blocked = candidates
            .iter()
            .filter_map(|candidate| candidate.get("finishReason").and_then(Value::as_str))
            .find(|reason| SAFETY_FINISH_REASONS.contains(reason));
        match blocked {
            Some(reason) => Err(GenerationError::ContentPolicy(format!(
                "Generation stopped: {}",
                reason
            ))),
            None => Err(GenerationError::MissingImageData),
        }
    }
}
