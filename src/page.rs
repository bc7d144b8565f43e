use crate::card::{escape_html, Card};
use crate::models::{Archetype, AspectRatio, GenerationRequest, GenerationResult};

pub const EMPTY_GALLERY: &str = "No visions have been summoned from the void yet...";

/// Everything the single page shows at one moment.
pub struct PageView<'a> {
    pub form: &'a GenerationRequest,
    pub busy_message: Option<&'a str>,
    pub error: Option<&'a str>,
    pub entries: &'a [GenerationResult],
}

fn archetype_options(selected: Archetype) -> String {
    Archetype::ALL
        .iter()
        .map(|archetype| {
            format!(
                r#"<label><input type="radio" name="archetype" value="{label}"{checked}> {label}</label>"#,
                label = archetype.label(),
                checked = if *archetype == selected { " checked" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn ratio_options(selected: AspectRatio) -> String {
    AspectRatio::ALL
        .iter()
        .map(|ratio| {
            format!(
                r#"<label><input type="radio" name="aspect_ratio" value="{ratio}"{checked}> {ratio}</label>"#,
                ratio = ratio.as_str(),
                checked = if *ratio == selected { " checked" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn gallery(entries: &[GenerationResult]) -> String {
    if entries.is_empty() {
        return format!(r#"<p class="empty">{}</p>"#, EMPTY_GALLERY);
    }
    entries
        .iter()
        .map(|entry| Card::new(entry).render_html())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_page(view: &PageView<'_>) -> String {
    let submit = match view.busy_message {
        Some(message) => format!(
            r#"<button type="submit" disabled>{}</button>"#,
            escape_html(message)
        ),
        None => r#"<button type="submit">Cast Spell</button>"#.to_string(),
    };
    let error = view
        .error
        .map(|message| format!(r#"<div class="error" role="alert">{}</div>"#, escape_html(message)))
        .unwrap_or_default();
    // poll while a generation is pending so the rotating message advances
    let refresh = if view.busy_message.is_some() {
        r#"<meta http-equiv="refresh" content="3">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Witching Hour</title>
  {refresh}
</head>
<body>
  <header><h1>Witching Hour</h1><p>"Conjure your mystical vision..."</p></header>
  <main>
    <form method="post" action="/generate">
      <fieldset>
        <legend>Witch Archetype</legend>
        {archetypes}
      </fieldset>
      <label>Custom Incantation
        <textarea name="prompt" placeholder="Describe her magic, her familiar, her surroundings...">{prompt}</textarea>
      </label>
      <fieldset>
        <legend>Aspect Ratio</legend>
        {ratios}
      </fieldset>
      {submit}
      {error}
    </form>
    <section class="gallery">
      <h2>The Grimoire</h2>
      {gallery}
    </section>
  </main>
</body>
</html>
"#,
        refresh = refresh,
        archetypes = archetype_options(view.form.archetype),
        prompt = escape_html(&view.form.prompt),
        ratios = ratio_options(view.form.aspect_ratio),
        submit = submit,
        error = error,
        gallery = gallery(view.entries),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageReference;
    use chrono::Utc;

    #[test]
    fn test_empty_page() {
        let form = GenerationRequest::default();
        let html = render_page(&PageView {
            form: &form,
            busy_message: None,
            error: None,
            entries: &[],
        });
        assert!(html.contains(EMPTY_GALLERY));
        assert!(html.contains(r#"value="Moon Witch" checked"#));
        assert!(html.contains(r#"value="1:1" checked"#));
        assert!(html.contains("Cast Spell"));
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn test_busy_page_with_error_and_cards() {
        let form = GenerationRequest::new("owl <3").with_archetype(Archetype::Forest);
        let entries = vec![GenerationResult {
            id: "a".into(),
            image_reference: ImageReference::url("https://x/a.png"),
            source_prompt: "owl".into(),
            created_at: Utc::now(),
            model_label: "stub".into(),
        }];
        let html = render_page(&PageView {
            form: &form,
            busy_message: Some("Brewing the elixir..."),
            error: Some("Limit reached"),
            entries: &entries,
        });
        assert!(html.contains("<button type=\"submit\" disabled>Brewing the elixir...</button>"));
        assert!(html.contains("Limit reached"));
        assert!(html.contains("owl &lt;3</textarea>"));
        assert!(html.contains(r#"value="Forest Witch" checked"#));
        assert!(html.contains("card-a"));
        assert!(!html.contains(EMPTY_GALLERY));
    }
}
