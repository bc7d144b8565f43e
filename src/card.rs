use crate::error::{Error, Result};
use crate::models::{GenerationResult, ImageReference};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};

pub const FILENAME_PREFIX: &str = "witching-hour";

/// Saved name for a result's image; depends on the identifier alone.
pub fn download_filename(identifier: &str) -> String {
    format!("{}-{}.png", FILENAME_PREFIX, identifier)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        log::info!("💾 Image saved to: {}", path.display());
        Ok(path)
    }
}

/// Resolves a reference to bytes: inline data is decoded, URLs are fetched once.
pub async fn download(
    client: &reqwest::Client,
    reference: &ImageReference,
    identifier: &str,
) -> Result<Download> {
    let filename = download_filename(identifier);

    match reference {
        ImageReference::Inline { mime_type, data } => {
            let bytes = STANDARD
                .decode(data.as_bytes())
                .map_err(|e| Error::Download(format!("Failed to decode base64 image: {}", e)))?;
            Ok(Download {
                filename,
                content_type: mime_type.clone(),
                bytes,
            })
        }
        ImageReference::Url(url) => {
            let response = client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(Error::Download(format!(
                    "Image host answered {} for {}",
                    response.status(),
                    url
                )));
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("image/png")
                .to_string();
            let bytes = response.bytes().await?.to_vec();
            Ok(Download {
                filename,
                content_type,
                bytes,
            })
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One gallery card: image, quoted prompt, date and a download link.
pub struct Card<'a> {
    result: &'a GenerationResult,
}

impl<'a> Card<'a> {
    pub fn new(result: &'a GenerationResult) -> Self {
        Self { result }
    }

    pub fn date(&self) -> String {
        self.result.created_at.format("%Y-%m-%d").to_string()
    }

    pub fn download_href(&self) -> String {
        format!("/download/{}", self.result.id)
    }

    pub fn render_html(&self) -> String {
        let prompt = escape_html(&self.result.source_prompt);
        format!(
            r#"<article class="card" id="card-{id}">
  <img src="{src}" alt="{prompt}" loading="lazy">
  <p class="prompt">"{prompt}"</p>
  <footer>
    <time datetime="{timestamp}">{date}</time>
    <a class="download" href="{href}" download="{filename}" title="Download Conjuration">Download</a>
  </footer>
</article>"#,
            id = escape_html(&self.result.id),
            src = escape_html(&self.result.image_reference.to_string()),
            prompt = prompt,
            timestamp = self.result.created_at.to_rfc3339(),
            date = self.date(),
            href = escape_html(&self.download_href()),
            filename = escape_html(&download_filename(&self.result.id)),
        )
    }
}
