//! Template rendering for LLM prompts (§4.5 "Template-driven calls").
//!
//! Grounded in the `emergence-runner/src/prompt.rs` `PromptEngine` pattern
//! for the `minijinja` loading/rendering shape, and
//! `original_source/src/utils/strings.py`'s `intentify_prompt_infos` for the
//! known-key pretty-print rule: `avatar_infos`, `world_info`,
//! `general_action_infos`, and `expanded_info` are re-serialized as pretty
//! JSON with real (not escaped) newlines before substitution, so a template
//! can drop them into the prompt body as readable blocks rather than one
//! long escaped line.

use minijinja::Environment;

use crate::error::LlmError;

const PRETTY_PRINTED_KEYS: [&str; 4] =
    ["avatar_infos", "world_info", "general_action_infos", "expanded_info"];

/// Load `template_text` and render it against `info_map`, pretty-printing
/// the known structured keys in place.
///
/// # Errors
///
/// Returns [`LlmError::Template`] if the template fails to parse or render.
pub fn render_template(template_text: &str, info_map: &serde_json::Value) -> Result<String, LlmError> {
    let processed = pretty_print_known_keys(info_map);

    let mut env = Environment::new();
    env.add_template("prompt", template_text)
        .map_err(|e| LlmError::Template(format!("failed to parse template: {e}")))?;

    env.get_template("prompt")
        .and_then(|tpl| tpl.render(&processed))
        .map_err(|e| LlmError::Template(format!("failed to render template: {e}")))
}

fn pretty_print_known_keys(info_map: &serde_json::Value) -> serde_json::Value {
    let serde_json::Value::Object(map) = info_map else {
        return info_map.clone();
    };

    let mut processed = map.clone();
    for key in PRETTY_PRINTED_KEYS {
        if let Some(value) = map.get(key) {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
            processed.insert(key.to_owned(), serde_json::Value::String(pretty));
        }
    }
    serde_json::Value::Object(processed)
}
