//! Deterministic model routing.
//!
//! A pure function of the input text and the use-case configuration: no
//! randomness, no learned state. The same input and config always route to
//! the same model.

use llmgate_core::UseCaseConfig;

/// Count whitespace-delimited words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Crude complexity proxy: any character outside alphanumerics/whitespace.
fn has_complex_pattern(text: &str) -> bool {
    text.chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// Select the model for an input.
///
/// Routes to the fallback model when one is configured and the input is
/// complex: longer than `complexity_threshold` words, or containing
/// non-alphanumeric characters. Otherwise returns the base model.
#[must_use]
pub fn route<'a>(input_text: &str, config: &'a UseCaseConfig) -> &'a str {
    let complex =
        word_count(input_text) > config.complexity_threshold || has_complex_pattern(input_text);

    match (&config.fallback_model, complex) {
        (Some(fallback), true) => fallback,
        _ => &config.model,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use llmgate_core::{OutputSchema, TemplateKind};

    fn config(fallback: Option<&str>, threshold: usize) -> UseCaseConfig {
        UseCaseConfig {
            template: TemplateKind::Classification,
            name: "test".to_string(),
            model: "gpt-4o-mini".to_string(),
            fallback_model: fallback.map(str::to_string),
            complexity_threshold: threshold,
            system_prompt: String::new(),
            model_params: serde_json::Map::new(),
            output_schema: OutputSchema::default(),
            pii_masking: vec![],
            confidence_threshold: 0.0,
        }
    }

    #[test]
    fn test_simple_input_uses_base_model() {
        let cfg = config(Some("o1-mini"), 100);
        assert_eq!(route("Hello world", &cfg), "gpt-4o-mini");
    }

    #[test]
    fn test_punctuation_routes_to_fallback() {
        let cfg = config(Some("o1-mini"), 100);
        assert_eq!(route("Hello, world!", &cfg), "o1-mini");
    }

    #[test]
    fn test_long_input_routes_to_fallback() {
        let cfg = config(Some("o1-mini"), 100);
        let long = "word ".repeat(101);
        assert_eq!(route(&long, &cfg), "o1-mini");
    }

    #[test]
    fn test_complex_input_without_fallback_keeps_base() {
        let cfg = config(None, 100);
        let long = format!("{} @#$%", "word ".repeat(150));
        assert_eq!(route(&long, &cfg), "gpt-4o-mini");
    }

    #[test]
    fn test_routing_is_deterministic() {
        let cfg = config(Some("o1-mini"), 10);
        let input = "some borderline input with punctuation!";
        let first = route(input, &cfg);
        for _ in 0..50 {
            assert_eq!(route(input, &cfg), first);
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("  spaced   out\ttabs\nnewlines  "), 4);
    }
}
