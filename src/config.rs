use crate::error::{Error, Result};
use crate::logger::LogLevel;
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Fal,
    OpenAi,
    Gemini,
    Bedrock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Fal => "fal",
            BackendKind::OpenAi => "openai",
            BackendKind::Gemini => "gemini",
            BackendKind::Bedrock => "bedrock",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Fal => "fal-ai/fast-sdxl",
            BackendKind::OpenAi => "dall-e-3",
            BackendKind::Gemini => "gemini-2.5-flash-image",
            BackendKind::Bedrock => "amazon.titan-image-generator-v1",
        }
    }

    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            BackendKind::Fal => Some("https://fal.run"),
            BackendKind::OpenAi => Some("https://api.openai.com/v1"),
            BackendKind::Gemini => Some("https://generativelanguage.googleapis.com/v1beta"),
            BackendKind::Bedrock => None,
        }
    }

    /// Environment variable holding the credential; Bedrock uses the AWS chain.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            BackendKind::Fal => Some("FAL_API_KEY"),
            BackendKind::OpenAi => Some("OPENAI_API_KEY"),
            BackendKind::Gemini => Some("GEMINI_API_KEY"),
            BackendKind::Bedrock => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fal" | "fal-ai" | "falai" => Ok(BackendKind::Fal),
            "openai" | "dall-e" => Ok(BackendKind::OpenAi),
            "gemini" | "google" => Ok(BackendKind::Gemini),
            "bedrock" | "aws" | "titan" => Ok(BackendKind::Bedrock),
            other => Err(Error::Config(format!("Unsupported backend: {}", other))),
        }
    }
}

#[derive(Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            kind: BackendKind::default(),
            api_key: None,
            model: None,
            endpoint: None,
            region: None,
        }
    }
}

impl BackendConfig {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        let kind = match env::var("WITCHING_BACKEND") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => BackendKind::default(),
        };
        let api_key = kind
            .api_key_var()
            .and_then(|var| env::var(var).ok())
            .filter(|key| !key.trim().is_empty());
        let model = env::var("WITCHING_MODEL").ok().filter(|m| !m.is_empty());
        let endpoint = env::var("WITCHING_ENDPOINT").ok().filter(|e| !e.is_empty());
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();

        Ok(BackendConfig {
            kind,
            api_key,
            model,
            endpoint,
            region,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .as_deref()
            .or_else(|| self.kind.default_endpoint())
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or("us-east-1")
    }

    /// The credential, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        match (&self.api_key, self.kind.api_key_var()) {
            (Some(key), _) => Ok(key),
            (None, Some(var)) => Err(Error::Config(format!(
                "{} is not set; the {} backend needs a credential",
                var, self.kind
            ))),
            (None, None) => Err(Error::Config(format!(
                "The {} backend takes its credentials from the AWS provider chain",
                self.kind
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: LogLevel,
    pub log_json: bool,
    pub log_file: Option<String>,
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: LogLevel::Info,
            log_json: false,
            log_file: None,
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", port)))?,
            Err(_) => defaults.port,
        };
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(defaults.log_level);
        let log_json = match env::var("LOG_FORMAT") {
            Ok(format) => parse_log_format(&format)?,
            Err(_) => defaults.log_json,
        };
        let log_file = env::var("LOG_FILE").ok().filter(|path| !path.trim().is_empty());

        Ok(Config {
            host,
            port,
            log_level,
            log_json,
            log_file,
            backend: BackendConfig::from_env()?,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.log_json = enabled;
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// `LOG_FORMAT`: `json` or `pretty`.
fn parse_log_format(format: &str) -> Result<bool> {
    match format.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(true),
        "pretty" | "text" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "LOG_FORMAT must be json or pretty, got: {}",
            other
        ))),
    }
}
