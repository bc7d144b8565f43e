use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the generated image lives: a remote URL or inline base64 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ImageReference {
    Url(String),
    Inline { mime_type: String, data: String }, // Base64 encoded
}

impl ImageReference {
    pub fn url(url: impl Into<String>) -> Self {
        ImageReference::Url(url.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ImageReference::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Reads a URL or a `data:<mime>;base64,<payload>` URI.
    pub fn parse(value: &str) -> Self {
        if let Some(rest) = value.strip_prefix("data:") {
            if let Some((mime_type, data)) = rest.split_once(";base64,") {
                return ImageReference::inline(mime_type, data);
            }
        }
        ImageReference::Url(value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImageReference::Url(url) => url.is_empty(),
            ImageReference::Inline { data, .. } => data.is_empty(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageReference::Url(url) => f.write_str(url),
            ImageReference::Inline { mime_type, data } => {
                write!(f, "data:{};base64,{}", mime_type, data)
            }
        }
    }
}

impl From<ImageReference> for String {
    fn from(reference: ImageReference) -> Self {
        reference.to_string()
    }
}

impl From<String> for ImageReference {
    fn from(value: String) -> Self {
        ImageReference::parse(&value)
    }
}

/// One successful generation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: String,
    pub image_reference: ImageReference,
    pub source_prompt: String,
    pub created_at: DateTime<Utc>,
    pub model_label: String,
}
