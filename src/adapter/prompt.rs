use crate::models::GenerationRequest;

pub const PREAMBLE: &str = "A high-quality, cinematic digital painting of a";

pub const STYLE: &str = "Ethereal lighting, intricate details, mystical atmosphere, \
dark fantasy aesthetic, vibrant magical effects, professional artistic style, masterpiece, \
sharp focus, intricate clothing, magical aura, fantasy art, highly detailed";

pub const NEGATIVE_PROMPT: &str = "blurry, bad quality, deformed, ugly, cartoon, 3d";

/// Builds the text sent to the backend: preamble, archetype, free text, style.
pub fn compose_prompt(request: &GenerationRequest) -> String {
    let free_text = request.prompt.trim().trim_end_matches('.').trim_end();
    if free_text.is_empty() {
        format!("{} {}. {}", PREAMBLE, request.archetype.label(), STYLE)
    } else {
        format!(
            "{} {}. {}. {}",
            PREAMBLE,
            request.archetype.label(),
            free_text,
            STYLE
        )
    }
}
