use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    #[serde(rename = "Moon Witch")]
    Moon,
    #[serde(rename = "Sea Witch")]
    Sea,
    #[serde(rename = "Forest Witch")]
    Forest,
    #[serde(rename = "Storm Witch")]
    Storm,
    #[serde(rename = "Cyber Witch")]
    Cyber,
    #[serde(rename = "Vintage Occult")]
    Vintage,
    #[serde(rename = "Eldritch Priestess")]
    Eldritch,
}

impl Archetype {
    pub const ALL: [Archetype; 7] = [
        Archetype::Moon,
        Archetype::Sea,
        Archetype::Forest,
        Archetype::Storm,
        Archetype::Cyber,
        Archetype::Vintage,
        Archetype::Eldritch,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Moon => "Moon Witch",
            Archetype::Sea => "Sea Witch",
            Archetype::Forest => "Forest Witch",
            Archetype::Storm => "Storm Witch",
            Archetype::Cyber => "Cyber Witch",
            Archetype::Vintage => "Vintage Occult",
            Archetype::Eldritch => "Eldritch Priestess",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown archetype: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Standard,
        AspectRatio::Widescreen,
        AspectRatio::Portrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1:1" | "square" => Ok(AspectRatio::Square),
            "4:3" | "standard" => Ok(AspectRatio::Standard),
            "16:9" | "widescreen" | "landscape" => Ok(AspectRatio::Widescreen),
            "9:16" | "portrait" => Ok(AspectRatio::Portrait),
            other => Err(format!("unknown aspect ratio: {}", other)),
        }
    }
}

/// What the form submits. Immutable once handed to the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub archetype: Archetype,
    #[serde(default, rename = "aspectRatio", alias = "aspect_ratio")]
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = archetype;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// The text a gallery card shows: the free text, or the archetype label
    /// when nothing was typed.
    pub fn source_prompt(&self) -> String {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            self.archetype.label().to_string()
        } else {
            prompt.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("Sea Witch".parse::<Archetype>().unwrap(), Archetype::Sea);
        assert_eq!("eldritch priestess".parse::<Archetype>().unwrap(), Archetype::Eldritch);
        assert!("Sky Witch".parse::<Archetype>().is_err());

        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Widescreen);
        assert_eq!("portrait".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert!("3:2".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"prompt":"a lighthouse at dusk","archetype":"Sea Witch","aspectRatio":"16:9"}"#,
        )
        .unwrap();
        assert_eq!(request.archetype, Archetype::Sea);
        assert_eq!(request.aspect_ratio, AspectRatio::Widescreen);

        let defaulted: GenerationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted.archetype, Archetype::Moon);
        assert_eq!(defaulted.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn test_source_prompt_falls_back_to_archetype() {
        let request = GenerationRequest::new("   ").with_archetype(Archetype::Storm);
        assert_eq!(request.source_prompt(), "Storm Witch");

        let request = GenerationRequest::new(" a raven familiar ");
        assert_eq!(request.source_prompt(), "a raven familiar");
    }
}
