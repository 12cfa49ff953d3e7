//! The read-only vocabulary index.
//!
//! The vocabulary loader is an external collaborator; this module consumes
//! its already-loaded output: a term-key keyed map of JSON-LD-shaped term
//! definitions plus a small context (base namespace, prefix table, locales).
//! The index is built once and never mutated, so it can be shared by
//! reference across any number of concurrent queries.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::{error::VocabError, iri};

/// A value that may be serialized as a single item or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    /// Views the value(s) as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Iterates over the value(s).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// True if there are no values.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// A reference to another term: a bare link, or an inline definition
/// (anonymous chain hops, OWL restrictions, equivalent-term stubs).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ref {
    /// Target IRI, when this is a link.
    #[serde(rename = "@id")]
    pub id: Option<String>,
    /// Type of the inline definition (e.g. `Restriction`).
    #[serde(rename = "@type")]
    pub ref_type: Option<String>,
    /// Inline `subPropertyOf` (anonymous chain hops).
    #[serde(rename = "subPropertyOf")]
    pub sub_property_of: Vec<Ref>,
    /// Inline `range` (adds an implicit type constraint on a chain hop).
    pub range: Vec<Ref>,
    /// Restriction: the constrained property.
    #[serde(rename = "onProperty")]
    pub on_property: Option<Box<Ref>>,
    /// Restriction: the required value.
    #[serde(rename = "hasValue")]
    pub has_value: Option<Box<Ref>>,
    /// Inline labels (equivalent-term stubs carry their own labels).
    pub label: OneOrMany<String>,
    /// Inline preferred labels.
    #[serde(rename = "prefLabel")]
    pub pref_label: OneOrMany<String>,
}

/// A vocabulary term definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TermDef {
    /// The term's IRI.
    #[serde(rename = "@id")]
    pub id: Option<String>,
    /// The term's type: `Class`, `ObjectProperty`, `DatatypeProperty`, or
    /// an enumeration class for individuals.
    #[serde(rename = "@type")]
    pub term_type: Option<String>,
    /// Plain labels.
    pub label: OneOrMany<String>,
    /// Preferred labels.
    #[serde(rename = "prefLabel")]
    pub pref_label: OneOrMany<String>,
    /// Alternative labels.
    #[serde(rename = "altLabel")]
    pub alt_label: OneOrMany<String>,
    /// Notation codes.
    pub code: OneOrMany<String>,
    /// The dedicated short query code, if the term has one.
    #[serde(rename = "queryCode")]
    pub query_code: Option<String>,
    /// Labels per language.
    #[serde(rename = "labelByLang")]
    pub label_by_lang: BTreeMap<String, OneOrMany<String>>,
    /// Preferred labels per language.
    #[serde(rename = "prefLabelByLang")]
    pub pref_label_by_lang: BTreeMap<String, OneOrMany<String>>,
    /// Alternative labels per language.
    #[serde(rename = "altLabelByLang")]
    pub alt_label_by_lang: BTreeMap<String, OneOrMany<String>>,
    /// Declared domain(s).
    pub domain: OneOrMany<Ref>,
    /// Declared range(s).
    pub range: OneOrMany<Ref>,
    /// Superclasses.
    #[serde(rename = "subClassOf")]
    pub sub_class_of: OneOrMany<Ref>,
    /// Superproperties.
    #[serde(rename = "subPropertyOf")]
    pub sub_property_of: OneOrMany<Ref>,
    /// Equivalent properties in other vocabularies.
    #[serde(rename = "equivalentProperty")]
    pub equivalent_property: OneOrMany<Ref>,
    /// Equivalent classes in other vocabularies.
    #[serde(rename = "equivalentClass")]
    pub equivalent_class: OneOrMany<Ref>,
    /// Chain axiom: this property is a fixed sequence of real hops.
    #[serde(rename = "propertyChainAxiom")]
    pub property_chain_axiom: OneOrMany<Ref>,
    /// True if the property takes vocabulary terms (enums) as values.
    #[serde(rename = "vocabValue")]
    pub vocab_value: bool,
}

impl TermDef {
    /// True for object and datatype properties.
    pub fn is_property(&self) -> bool {
        self.term_type
            .as_deref()
            .is_some_and(|t| t.ends_with("Property"))
    }

    /// True for object properties.
    pub fn is_object_property(&self) -> bool {
        self.term_type.as_deref() == Some("ObjectProperty")
    }

    /// True for classes.
    pub fn is_class(&self) -> bool {
        self.term_type.as_deref() == Some("Class")
    }

    /// True for enumeration individuals: defined terms that are neither
    /// classes nor properties.
    pub fn is_enum(&self) -> bool {
        self.term_type.is_some() && !self.is_class() && !self.is_property()
    }
}

/// The vocabulary context: base namespace, prefix table and locales.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Base namespace of the vocabulary's own terms.
    pub vocab: Option<String>,
    /// Prefix table for compact IRIs.
    pub prefixes: BTreeMap<String, String>,
    /// Locales whose labels become aliases.
    pub locales: Vec<String>,
}

/// Raw JSON shape of a loaded vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabData {
    /// The context.
    #[serde(default)]
    pub context: Context,
    /// Term definitions keyed by term key.
    pub terms: BTreeMap<String, TermDef>,
}

/// The read-only vocabulary index with precomputed class closures.
#[derive(Debug, Clone)]
pub struct Vocab {
    terms: BTreeMap<String, TermDef>,
    context: Context,
    /// Proper subclasses per class (transitive).
    sub_closure: BTreeMap<String, BTreeSet<String>>,
    /// Proper superclasses per class (transitive).
    super_closure: BTreeMap<String, BTreeSet<String>>,
}

impl Vocab {
    /// Builds the index from raw vocabulary JSON.
    pub fn from_json(json: serde_json::Value) -> Result<Self, VocabError> {
        let data: VocabData = serde_json::from_value(json)?;
        Ok(Self::from_data(data))
    }

    /// Builds the index from already-deserialized vocabulary data.
    pub fn from_data(data: VocabData) -> Self {
        let mut vocab = Self {
            terms: data.terms,
            context: data.context,
            sub_closure: BTreeMap::new(),
            super_closure: BTreeMap::new(),
        };
        vocab.build_closures();
        vocab
    }

    /// Looks up a term definition.
    pub fn term(&self, key: &str) -> Option<&TermDef> {
        self.terms.get(key)
    }

    /// Iterates all (key, definition) pairs.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermDef)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The vocabulary context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// True if the key names an object property.
    pub fn is_object_property(&self, key: &str) -> bool {
        self.term(key).is_some_and(TermDef::is_object_property)
    }

    /// True if the key names a property whose values are vocabulary terms.
    pub fn has_vocab_value(&self, key: &str) -> bool {
        self.term(key).is_some_and(|t| t.vocab_value)
    }

    /// Converts an IRI to a term key: strips the vocabulary's own base
    /// namespace, contracts other known namespaces to their prefixed form,
    /// and passes anything else through unchanged.
    pub fn to_term_key(&self, iri: &str) -> String {
        if let Some(base) = &self.context.vocab
            && let Some(local) = iri.strip_prefix(base.as_str())
        {
            return local.to_string();
        }
        iri::to_prefixed(iri, &self.context.prefixes)
    }

    /// Resolves a [`Ref`] to a term key, if it links anywhere.
    pub fn ref_key(&self, r: &Ref) -> Option<String> {
        r.id.as_deref().map(|id| self.to_term_key(id))
    }

    /// Expands a compact value (`pfx:Name`) to an absolute IRI.
    pub fn expand_prefixed(&self, value: &str) -> String {
        iri::expand_prefixed(value, &self.context.prefixes)
    }

    /// The proper subclasses of a class (transitive, excluding the class).
    pub fn sub_classes(&self, class: &str) -> BTreeSet<String> {
        self.sub_closure.get(class).cloned().unwrap_or_default()
    }

    /// The proper superclasses of a class (transitive, excluding the class).
    pub fn super_classes(&self, class: &str) -> BTreeSet<String> {
        self.super_closure.get(class).cloned().unwrap_or_default()
    }

    /// True if `class` is `ancestor` or a transitive subclass of it.
    pub fn is_sub_class_of(&self, class: &str, ancestor: &str) -> bool {
        class == ancestor
            || self
                .super_closure
                .get(class)
                .is_some_and(|supers| supers.contains(ancestor))
    }

    /// Precomputes the transitive sub/superclass closures.
    fn build_closures(&mut self) {
        let mut direct_supers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, def) in &self.terms {
            if !def.is_class() {
                continue;
            }
            let supers: BTreeSet<String> = def
                .sub_class_of
                .iter()
                .filter_map(|r| r.id.as_deref())
                .map(|id| {
                    if let Some(base) = &self.context.vocab
                        && let Some(local) = id.strip_prefix(base.as_str())
                    {
                        local.to_string()
                    } else {
                        iri::to_prefixed(id, &self.context.prefixes)
                    }
                })
                .collect();
            direct_supers.insert(key.clone(), supers);
        }

        for key in direct_supers.keys() {
            let mut closure = BTreeSet::new();
            let mut queue: Vec<String> = direct_supers
                .get(key)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default();
            while let Some(class) = queue.pop() {
                if class != *key && closure.insert(class.clone())
                    && let Some(supers) = direct_supers.get(&class)
                {
                    queue.extend(supers.iter().cloned());
                }
            }
            self.super_closure.insert(key.clone(), closure);
        }

        for (key, supers) in &self.super_closure {
            for ancestor in supers {
                self.sub_closure
                    .entry(ancestor.clone())
                    .or_default()
                    .insert(key.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn term_lookup() {
        let vocab = fixtures::vocab();
        assert!(vocab.term("Work").is_some_and(TermDef::is_class));
        assert!(vocab.term("contribution").is_some_and(TermDef::is_object_property));
        assert!(vocab.term("year").is_some_and(TermDef::is_property));
        assert!(vocab.term("nosuchterm").is_none());
    }

    #[test]
    fn enum_detection() {
        let vocab = fixtures::vocab();
        assert!(vocab.term("Serial").is_some_and(TermDef::is_enum));
        assert!(!vocab.term("Work").is_some_and(TermDef::is_enum));
        assert!(!vocab.term("contribution").is_some_and(TermDef::is_enum));
    }

    #[test]
    fn subclass_closure_is_transitive() {
        let vocab = fixtures::vocab();
        let subs = vocab.sub_classes("Creation");
        assert!(subs.contains("Work"));
        assert!(subs.contains("Instance"));
        assert!(subs.contains("Text"), "transitive subclass via Work");
        assert!(!subs.contains("Creation"), "closure is proper");
    }

    #[test]
    fn superclass_closure_is_transitive() {
        let vocab = fixtures::vocab();
        let supers = vocab.super_classes("Text");
        assert!(supers.contains("Work"));
        assert!(supers.contains("Creation"));
    }

    #[test]
    fn is_sub_class_of_includes_self() {
        let vocab = fixtures::vocab();
        assert!(vocab.is_sub_class_of("Work", "Work"));
        assert!(vocab.is_sub_class_of("Text", "Work"));
        assert!(vocab.is_sub_class_of("Instance", "Embodiment"));
        assert!(!vocab.is_sub_class_of("Work", "Instance"));
    }

    #[test]
    fn term_key_strips_base_namespace() {
        let vocab = fixtures::vocab();
        assert_eq!(vocab.to_term_key("https://example.org/vocab/Work"), "Work");
        assert_eq!(
            vocab.to_term_key("https://example.org/term/subj/Horses"),
            "subj:Horses"
        );
        assert_eq!(vocab.to_term_key("https://other.org/x"), "https://other.org/x");
    }

    #[test]
    fn one_or_many_deserializes_both_shapes() {
        let one: OneOrMany<String> = serde_json::from_value(serde_json::json!("x")).unwrap();
        let many: OneOrMany<String> =
            serde_json::from_value(serde_json::json!(["x", "y"])).unwrap();
        assert_eq!(one.as_slice(), ["x".to_string()]);
        assert_eq!(many.as_slice().len(), 2);
    }
}
