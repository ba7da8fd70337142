//! Model-id mappings
//!
//! OpenAI short names as they appear in scanned source, mapped to the
//! OpenRouter catalog id used for pricing lookups and to the Mistral model
//! suggested as the migration target.

const OPENAI_TO_OPENROUTER: &[(&str, &str)] = &[
    ("gpt-4", "openai/gpt-4"),
    ("gpt-4-turbo", "openai/gpt-4-turbo"),
    ("gpt-4-turbo-preview", "openai/gpt-4-turbo-preview"),
    ("gpt-4o", "openai/gpt-4o"),
    ("gpt-4o-mini", "openai/gpt-4o-mini"),
    ("gpt-3.5-turbo", "openai/gpt-3.5-turbo"),
    ("text-embedding-ada-002", "openai/text-embedding-ada-002"),
    ("text-embedding-3-small", "openai/text-embedding-3-small"),
    ("text-embedding-3-large", "openai/text-embedding-3-large"),
];

const OPENAI_TO_MISTRAL: &[(&str, &str)] = &[
    ("gpt-4", "mistralai/mistral-large"),
    ("gpt-4-turbo", "mistralai/mistral-large"),
    ("gpt-4-turbo-preview", "mistralai/mistral-large"),
    ("gpt-4o", "mistralai/mistral-large"),
    ("gpt-4o-mini", "mistralai/mistral-small"),
    ("gpt-3.5-turbo", "mistralai/mistral-small"),
    ("text-embedding-ada-002", "mistralai/mistral-embed"),
    ("text-embedding-3-small", "mistralai/mistral-embed"),
    ("text-embedding-3-large", "mistralai/mistral-embed"),
];

/// OpenRouter catalog id for an OpenAI short name. Ids already in catalog
/// form pass through unchanged.
pub(crate) fn openrouter_id(model: &str) -> Option<&'static str> {
    OPENAI_TO_OPENROUTER
        .iter()
        .find(|(short, _)| *short == model)
        .map(|(_, id)| *id)
}

/// Suggested Mistral migration target for an OpenAI short name.
pub(crate) fn mistral_equivalent(model: &str) -> Option<&'static str> {
    OPENAI_TO_MISTRAL
        .iter()
        .find(|(short, _)| *short == model)
        .map(|(_, id)| *id)
}

/// Models with a known mapping, in table order. Drives the `compare`
/// command's model listing.
pub(crate) fn mapped_models() -> impl Iterator<Item = &'static str> {
    OPENAI_TO_MISTRAL.iter().map(|(short, _)| *short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_models_map_to_large_or_small() {
        assert_eq!(openrouter_id("gpt-4"), Some("openai/gpt-4"));
        assert_eq!(mistral_equivalent("gpt-4"), Some("mistralai/mistral-large"));
        assert_eq!(
            mistral_equivalent("gpt-3.5-turbo"),
            Some("mistralai/mistral-small")
        );
    }

    #[test]
    fn embedding_models_map_to_mistral_embed() {
        for model in [
            "text-embedding-ada-002",
            "text-embedding-3-small",
            "text-embedding-3-large",
        ] {
            assert_eq!(mistral_equivalent(model), Some("mistralai/mistral-embed"));
        }
    }

    #[test]
    fn unmapped_model_yields_none() {
        assert_eq!(openrouter_id("llama-3"), None);
        assert_eq!(mistral_equivalent("llama-3"), None);
    }

    #[test]
    fn every_mapped_model_has_both_sides() {
        for model in mapped_models() {
            assert!(openrouter_id(model).is_some());
            assert!(mistral_equivalent(model).is_some());
        }
    }
}
