//! Index-mapping introspection.
//!
//! The backend index mappings decide how fields must be queried: `nested`
//! fields need a scoped `nested` wrapper, nested fields that are not
//! copied into their parent need special negation handling, and fields
//! with a `keyword` subfield sort on it. The mappings JSON is scanned once
//! at startup.

use std::collections::BTreeSet;

use serde_json::Value;

/// Field classifications extracted from the index mappings.
#[derive(Debug, Clone, Default)]
pub struct EsMappings {
    /// Fields of type `nested`.
    nested: BTreeSet<String>,
    /// Nested fields whose values are not included in the parent document.
    nested_not_in_parent: BTreeSet<String>,
    /// Fields carrying a `keyword` subfield.
    keyword: BTreeSet<String>,
    /// Fields of type `date`.
    date: BTreeSet<String>,
}

impl EsMappings {
    /// Scans a mappings JSON object (the engine's `{"properties": …}`
    /// shape).
    pub fn from_json(mappings: &Value) -> Self {
        let mut result = Self::default();
        if let Some(properties) = mappings.get("properties") {
            scan(properties, &mut Vec::new(), &mut result);
        }
        result
    }

    /// True if the exact field is nested.
    pub fn is_nested(&self, field: &str) -> bool {
        self.nested.contains(field)
    }

    /// The longest prefix of the dot-joined field that is a nested field.
    pub fn nested_stem(&self, field: &str) -> Option<String> {
        let parts: Vec<&str> = field.split('.').collect();
        (1..=parts.len())
            .rev()
            .map(|len| parts[..len].join("."))
            .find(|stem| self.nested.contains(stem))
    }

    /// True if the nested field's values are absent from the parent
    /// document, so a negation must wrap the nested query itself.
    pub fn is_nested_not_in_parent(&self, stem: &str) -> bool {
        self.nested_not_in_parent.contains(stem)
    }

    /// True if the field carries a `keyword` subfield.
    pub fn has_keyword_subfield(&self, field: &str) -> bool {
        self.keyword.contains(field)
    }

    /// True if the field is a date field.
    pub fn is_date(&self, field: &str) -> bool {
        self.date.contains(field)
    }
}

/// Recursively scans a `properties` map, accumulating dot-joined paths.
fn scan(properties: &Value, path: &mut Vec<String>, result: &mut EsMappings) {
    let Some(map) = properties.as_object() else {
        return;
    };

    for (name, definition) in map {
        path.push(name.clone());
        let field = path.join(".");

        if definition.get("type").and_then(Value::as_str) == Some("nested") {
            result.nested.insert(field.clone());
            let include_in_parent = definition
                .get("include_in_parent")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !include_in_parent {
                result.nested_not_in_parent.insert(field.clone());
            }
        }
        if definition.get("type").and_then(Value::as_str) == Some("date") {
            result.date.insert(field.clone());
        }
        if definition
            .get("fields")
            .and_then(|f| f.get("keyword"))
            .is_some()
        {
            result.keyword.insert(field.clone());
        }

        if let Some(inner) = definition.get("properties") {
            scan(inner, path, result);
        }
        path.pop();
    }
}
