//! Alias tables mapping user shorthand to canonical vocabulary terms.
//!
//! Built in a single scan over the vocabulary, then frozen. Every term
//! contributes its own key, its notating labels in every configured locale,
//! its absolute and prefixed IRI forms, and the labels of any equivalent
//! terms. When two canonical terms claim the same (lowercased) alias the
//! alias moves to the ambiguous table and resolution falls back to the
//! tiebreak rules: a case-sensitive match on a dedicated query code wins,
//! then a case-insensitive match on the candidate's own key.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::ResolveError,
    index::{Ref, TermDef, Vocab},
};

/// The canonical key for the type property, which has no vocabulary entry.
pub const TYPE_KEY: &str = "rdf:type";

/// One direct map plus its companion ambiguity map.
#[derive(Debug, Clone, Default)]
struct TablePair {
    /// Unambiguous aliases (lowercased) to canonical keys.
    direct: BTreeMap<String, String>,
    /// Aliases claimed by more than one canonical key.
    ambiguous: BTreeMap<String, BTreeSet<String>>,
}

impl TablePair {
    /// Adds one alias, demoting it to ambiguous on collision.
    fn add(&mut self, alias: &str, key: &str) {
        let alias = alias.to_lowercase();
        if let Some(candidates) = self.ambiguous.get_mut(&alias) {
            candidates.insert(key.to_string());
            return;
        }
        match self.direct.get(&alias) {
            Some(existing) if existing == key => {}
            Some(_) => {
                let Some(existing) = self.direct.remove(&alias) else {
                    return;
                };
                self.ambiguous
                    .insert(alias, BTreeSet::from([existing, key.to_string()]));
            }
            None => {
                self.direct.insert(alias, key.to_string());
            }
        }
    }

    /// Resolves an alias against this table.
    fn resolve(&self, alias: &str, vocab: &Vocab) -> Result<String, ResolveError> {
        let lower = alias.to_lowercase();
        if let Some(key) = self.direct.get(&lower) {
            return Ok(key.clone());
        }

        let Some(candidates) = self.ambiguous.get(&lower) else {
            return Err(ResolveError::Unknown(alias.to_string()));
        };

        // Tiebreak 1: exactly one candidate's dedicated query code matches
        // the alias case-sensitively.
        let by_code: Vec<&String> = candidates
            .iter()
            .filter(|key| {
                vocab
                    .term(key)
                    .and_then(|t| t.query_code.as_deref())
                    .is_some_and(|code| code == alias)
            })
            .collect();
        if let [only] = by_code.as_slice() {
            return Ok((*only).clone());
        }

        // Tiebreak 2: exactly one candidate's own key equals the alias.
        let by_key: Vec<&String> = candidates
            .iter()
            .filter(|key| key.eq_ignore_ascii_case(alias))
            .collect();
        if let [only] = by_key.as_slice() {
            return Ok((*only).clone());
        }

        Err(ResolveError::Ambiguous {
            alias: alias.to_string(),
            candidates: candidates.iter().cloned().collect(),
        })
    }
}

/// Alias tables for properties, classes and enumeration values.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    properties: TablePair,
    classes: TablePair,
    enums: TablePair,
}

impl AliasTable {
    /// Builds the tables from a vocabulary in a single scan.
    pub fn build(vocab: &Vocab) -> Self {
        let mut table = Self::default();

        // The type property is platform-level, not a vocabulary entry.
        for alias in ["type", "@type", TYPE_KEY] {
            table.properties.add(alias, TYPE_KEY);
        }

        for (key, def) in vocab.terms() {
            let pair = if def.is_property() {
                &mut table.properties
            } else if def.is_class() {
                &mut table.classes
            } else if def.is_enum() {
                &mut table.enums
            } else {
                continue;
            };

            pair.add(key, key);
            add_term_aliases(pair, vocab, def, key);

            let equivalents = def
                .equivalent_property
                .iter()
                .chain(def.equivalent_class.iter());
            for equivalent in equivalents {
                add_ref_aliases(pair, vocab, equivalent, key);
            }
        }

        table
    }

    /// Resolves a property alias to its canonical key.
    pub fn resolve_property(&self, alias: &str, vocab: &Vocab) -> Result<String, ResolveError> {
        self.properties.resolve(alias, vocab)
    }

    /// Resolves a class alias to its canonical key.
    pub fn resolve_class(&self, alias: &str, vocab: &Vocab) -> Result<String, ResolveError> {
        self.classes.resolve(alias, vocab)
    }

    /// Resolves an enumeration-value alias to its canonical key.
    pub fn resolve_enum(&self, alias: &str, vocab: &Vocab) -> Result<String, ResolveError> {
        self.enums.resolve(alias, vocab)
    }
}

/// Adds the aliases a term definition carries for itself.
fn add_term_aliases(pair: &mut TablePair, vocab: &Vocab, def: &TermDef, key: &str) {
    if let Some(id) = def.id.as_deref() {
        pair.add(id, key);
        pair.add(&vocab.to_term_key(id), key);
    }
    if let Some(code) = def.query_code.as_deref() {
        pair.add(code, key);
    }

    let plain = [&def.label, &def.pref_label, &def.alt_label, &def.code];
    for values in plain {
        for value in values.iter() {
            pair.add(value, key);
        }
    }

    let by_lang = [
        &def.label_by_lang,
        &def.pref_label_by_lang,
        &def.alt_label_by_lang,
    ];
    for map in by_lang {
        for locale in &vocab.context().locales {
            if let Some(values) = map.get(locale) {
                for value in values.iter() {
                    pair.add(value, key);
                }
            }
        }
    }
}

/// Adds aliases from an equivalent-term reference (its IRI forms and any
/// inline labels).
fn add_ref_aliases(pair: &mut TablePair, vocab: &Vocab, r: &Ref, key: &str) {
    if let Some(id) = r.id.as_deref() {
        pair.add(id, key);
        pair.add(&vocab.to_term_key(id), key);
        // A resolvable equivalent contributes its own labels transitively.
        if let Some(def) = vocab.term(&vocab.to_term_key(id)) {
            add_term_aliases(pair, vocab, def, key);
        }
    }
    for values in [&r.label, &r.pref_label] {
        for value in values.iter() {
            pair.add(value, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn table_and_vocab() -> (AliasTable, Vocab) {
        let vocab = fixtures::vocab();
        let table = AliasTable::build(&vocab);
        (table, vocab)
    }

    #[test]
    fn own_key_resolves() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_property("genreForm", &vocab).unwrap(), "genreForm");
    }

    #[test]
    fn label_resolves_case_insensitively() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_property("genre", &vocab).unwrap(), "genreForm");
        assert_eq!(table.resolve_property("GENRE", &vocab).unwrap(), "genreForm");
    }

    #[test]
    fn locale_labels_resolve() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_property("författare", &vocab).unwrap(), "author");
        assert_eq!(table.resolve_property("språk", &vocab).unwrap(), "language");
    }

    #[test]
    fn iri_forms_resolve() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(
            table
                .resolve_property("https://example.org/vocab/author", &vocab)
                .unwrap(),
            "author"
        );
        assert_eq!(table.resolve_property("ex:author", &vocab).unwrap(), "author");
    }

    #[test]
    fn equivalent_property_aliases_resolve() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(
            table
                .resolve_property("http://purl.org/ontology/bibo/isbn", &vocab)
                .unwrap(),
            "isbn"
        );
        assert_eq!(table.resolve_property("bokisbn", &vocab).unwrap(), "isbn");
    }

    #[test]
    fn type_aliases_are_built_in() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_property("type", &vocab).unwrap(), TYPE_KEY);
        assert_eq!(table.resolve_property("@type", &vocab).unwrap(), TYPE_KEY);
        assert_eq!(table.resolve_property("rdf:type", &vocab).unwrap(), TYPE_KEY);
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let (table, vocab) = table_and_vocab();
        assert!(matches!(
            table.resolve_property("nosuch", &vocab),
            Err(ResolveError::Unknown(alias)) if alias == "nosuch"
        ));
    }

    #[test]
    fn collision_resolved_by_query_code() {
        let (table, vocab) = table_and_vocab();
        // "pub" is claimed by publisher and publication; only publication
        // carries it as a dedicated query code.
        assert_eq!(table.resolve_property("pub", &vocab).unwrap(), "publication");
    }

    #[test]
    fn query_code_tiebreak_is_case_sensitive() {
        let (table, vocab) = table_and_vocab();
        // "PUB" does not match the query code case-sensitively, and matches
        // neither candidate key, so it stays ambiguous.
        assert!(matches!(
            table.resolve_property("PUB", &vocab),
            Err(ResolveError::Ambiguous { .. })
        ));
    }

    #[test]
    fn collision_without_tiebreak_stays_ambiguous() {
        let (table, vocab) = table_and_vocab();
        let err = table.resolve_property("anm", &vocab).unwrap_err();
        match err {
            ResolveError::Ambiguous { alias, candidates } => {
                assert_eq!(alias, "anm");
                assert_eq!(candidates, vec!["notation".to_string(), "note".to_string()]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let (table, vocab) = table_and_vocab();
        let first = table.resolve_property("pub", &vocab).unwrap();
        for _ in 0..10 {
            assert_eq!(table.resolve_property("pub", &vocab).unwrap(), first);
        }
    }

    #[test]
    fn class_aliases_resolve() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_class("verk", &vocab).unwrap(), "Work");
        assert_eq!(table.resolve_class("Work", &vocab).unwrap(), "Work");
        assert!(table.resolve_property("verk", &vocab).is_err());
    }

    #[test]
    fn enum_aliases_resolve() {
        let (table, vocab) = table_and_vocab();
        assert_eq!(table.resolve_enum("seriell", &vocab).unwrap(), "Serial");
        assert_eq!(table.resolve_enum("monograph", &vocab).unwrap(), "Monograph");
        assert!(table.resolve_class("seriell", &vocab).is_err());
    }
}
