//! Spelling suggestions.
//!
//! The free-text part of a query can be sent to the engine's phrase
//! suggester alongside the main query (or, in suggest-only mode, instead
//! of it). Collected suggestions carry both the plain and the highlighted
//! replacement text.

use serde_json::{Value, json};

/// Name of the suggester in requests and responses.
pub const SUGGEST_NAME: &str = "spell";
/// The trigram-analyzed field the suggester runs against.
const SUGGEST_FIELD: &str = "_spell.trigram";

/// Whether and how spell checking is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpellMode {
    /// No spell checking.
    #[default]
    Off,
    /// Suggest alongside the search results.
    Suggest,
    /// Only suggest; skip the search itself.
    SuggestOnly,
}

impl SpellMode {
    /// Parses the `_spell` parameter value.
    pub fn from_param(value: &str) -> Self {
        match value {
            "true" => Self::Suggest,
            "only" => Self::SuggestOnly,
            _ => Self::Off,
        }
    }

    /// Renders the parameter value, if any.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Suggest => Some("true"),
            Self::SuggestOnly => Some("only"),
        }
    }
}

/// A collected suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The suggested replacement text.
    pub text: String,
    /// The replacement with changed parts wrapped in highlight tags.
    pub highlighted: String,
}

/// Builds the suggest payload for a free-text fragment.
pub fn build_suggest_query(text: &str) -> Value {
    json!({
        SUGGEST_NAME: {
            "text": text,
            "phrase": {
                "field": SUGGEST_FIELD,
                "size": 5,
                "highlight": { "pre_tag": "<em>", "post_tag": "</em>" },
            },
        }
    })
}

/// Collects suggestions from a response.
pub fn collect_suggestions(response: &Value) -> Vec<Suggestion> {
    response
        .get("suggest")
        .and_then(|suggest| suggest.get(SUGGEST_NAME))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("options").and_then(Value::as_array))
                .flatten()
                .filter_map(|option| {
                    let text = option.get("text")?.as_str()?.to_string();
                    let highlighted = option
                        .get("highlighted")
                        .and_then(Value::as_str)
                        .unwrap_or(&text)
                        .to_string();
                    Some(Suggestion { text, highlighted })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_parameter_values() {
        assert_eq!(SpellMode::from_param("true"), SpellMode::Suggest);
        assert_eq!(SpellMode::from_param("only"), SpellMode::SuggestOnly);
        assert_eq!(SpellMode::from_param("false"), SpellMode::Off);
        assert_eq!(SpellMode::from_param(""), SpellMode::Off);
    }

    #[test]
    fn suggest_query_shape() {
        let query = build_suggest_query("tvoe jansson");
        assert_eq!(query[SUGGEST_NAME]["text"], "tvoe jansson");
        assert_eq!(query[SUGGEST_NAME]["phrase"]["field"], SUGGEST_FIELD);
    }

    #[test]
    fn collects_options() {
        let response = serde_json::json!({
            "suggest": {
                SUGGEST_NAME: [{
                    "text": "tvoe jansson",
                    "options": [
                        {
                            "text": "tove jansson",
                            "highlighted": "<em>tove</em> jansson",
                            "score": 0.9,
                        },
                    ],
                }],
            },
        });
        let suggestions = collect_suggestions(&response);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].text, "tove jansson");
        assert_eq!(suggestions[0].highlighted, "<em>tove</em> jansson");
    }

    #[test]
    fn missing_suggest_block_is_empty() {
        assert!(collect_suggestions(&serde_json::json!({})).is_empty());
    }
}
