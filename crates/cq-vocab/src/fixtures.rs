//! A small bibliographic fixture vocabulary.
//!
//! Used by tests across the workspace; mirrors the shape of a real
//! vocabulary at a fraction of the size: a Creation/Work/Instance class
//! hierarchy, chained properties, enumerations and a couple of deliberately
//! colliding aliases.

use serde_json::{Value, json};

use crate::index::Vocab;

/// The fixture vocabulary, ready to use.
pub fn vocab() -> Vocab {
    Vocab::from_json(vocab_json()).expect("fixture vocabulary is valid")
}

/// The fixture vocabulary as raw JSON.
pub fn vocab_json() -> Value {
    let base = "https://example.org/vocab/";
    json!({
        "context": {
            "vocab": base,
            "prefixes": {
                "ex": base,
                "subj": "https://example.org/term/subj/",
            },
            "locales": ["en", "sv"],
        },
        "terms": {
            // Class hierarchy.
            "Creation": { "@id": format!("{base}Creation"), "@type": "Class" },
            "Embodiment": { "@id": format!("{base}Embodiment"), "@type": "Class" },
            "Work": {
                "@id": format!("{base}Work"),
                "@type": "Class",
                "subClassOf": [{ "@id": format!("{base}Creation") }],
                "labelByLang": { "en": "work", "sv": "verk" },
            },
            "Instance": {
                "@id": format!("{base}Instance"),
                "@type": "Class",
                "subClassOf": [
                    { "@id": format!("{base}Creation") },
                    { "@id": format!("{base}Embodiment") },
                ],
                "labelByLang": { "en": "instance", "sv": "instans" },
            },
            "Text": {
                "@id": format!("{base}Text"),
                "@type": "Class",
                "subClassOf": [{ "@id": format!("{base}Work") }],
            },
            "Audio": {
                "@id": format!("{base}Audio"),
                "@type": "Class",
                "subClassOf": [{ "@id": format!("{base}Work") }],
            },
            "Print": {
                "@id": format!("{base}Print"),
                "@type": "Class",
                "subClassOf": [{ "@id": format!("{base}Instance") }],
            },
            "AdminMetadata": { "@id": format!("{base}AdminMetadata"), "@type": "Class" },
            "Contribution": { "@id": format!("{base}Contribution"), "@type": "Class" },
            "Agent": { "@id": format!("{base}Agent"), "@type": "Class" },
            "Person": {
                "@id": format!("{base}Person"),
                "@type": "Class",
                "subClassOf": [{ "@id": format!("{base}Agent") }],
            },
            "GenreForm": { "@id": format!("{base}GenreForm"), "@type": "Class" },
            "Language": { "@id": format!("{base}Language"), "@type": "Class" },
            "Role": { "@id": format!("{base}Role"), "@type": "Class" },
            "IssuanceType": { "@id": format!("{base}IssuanceType"), "@type": "Class" },

            // Work-level properties.
            "contribution": {
                "@id": format!("{base}contribution"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Work") }],
                "range": [{ "@id": format!("{base}Contribution") }],
                "labelByLang": { "en": "contribution", "sv": "medverkan" },
            },
            "agent": {
                "@id": format!("{base}agent"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Contribution") }],
                "range": [{ "@id": format!("{base}Agent") }],
            },
            "name": {
                "@id": format!("{base}name"),
                "@type": "DatatypeProperty",
                "domain": [{ "@id": format!("{base}Agent") }],
            },
            "role": {
                "@id": format!("{base}role"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Contribution") }],
                "range": [{ "@id": format!("{base}Role") }],
                "vocabValue": true,
            },
            "author": {
                "@id": format!("{base}author"),
                "@type": "ObjectProperty",
                "propertyChainAxiom": [
                    { "@id": format!("{base}contribution") },
                    { "@id": format!("{base}agent") },
                ],
                "labelByLang": { "en": "author", "sv": "författare" },
            },
            "translator": {
                "@id": format!("{base}translator"),
                "@type": "ObjectProperty",
                "propertyChainAxiom": [
                    {
                        "@type": "Restriction",
                        "subPropertyOf": [{ "@id": format!("{base}contribution") }],
                        "range": [{ "@id": format!("{base}Contribution") }],
                        "onProperty": { "@id": format!("{base}role") },
                        "hasValue": { "@id": format!("{base}Translator") },
                    },
                    { "@id": format!("{base}agent") },
                ],
            },
            "genreForm": {
                "@id": format!("{base}genreForm"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Work") }],
                "range": [{ "@id": format!("{base}GenreForm") }],
                "labelByLang": { "en": "genre", "sv": "genre" },
            },
            "subject": {
                "@id": format!("{base}subject"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Creation") }],
                "labelByLang": { "en": "subject", "sv": "ämne" },
            },
            "language": {
                "@id": format!("{base}language"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Creation") }],
                "range": [{ "@id": format!("{base}Language") }],
                "labelByLang": { "en": "language", "sv": "språk" },
            },

            // Instance-level properties.
            "instanceOf": {
                "@id": format!("{base}instanceOf"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "range": [{ "@id": format!("{base}Work") }],
            },
            "year": {
                "@id": format!("{base}year"),
                "@type": "DatatypeProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "labelByLang": { "en": "year", "sv": "år" },
            },
            "extent": {
                "@id": format!("{base}extent"),
                "@type": "DatatypeProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
            },
            "issuanceType": {
                "@id": format!("{base}issuanceType"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "range": [{ "@id": format!("{base}IssuanceType") }],
                "vocabValue": true,
            },
            "isbn": {
                "@id": format!("{base}isbn"),
                "@type": "DatatypeProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "queryCode": "ISBN",
                "equivalentProperty": [
                    { "@id": "http://purl.org/ontology/bibo/isbn", "label": "bokisbn" },
                ],
            },

            // A property without a declared domain anywhere.
            "title": {
                "@id": format!("{base}title"),
                "@type": "DatatypeProperty",
                "labelByLang": { "en": "title", "sv": "titel" },
            },

            // Admin-metadata (record-level) properties.
            "controlNumber": {
                "@id": format!("{base}controlNumber"),
                "@type": "DatatypeProperty",
                "domain": [{ "@id": format!("{base}AdminMetadata") }],
                "queryCode": "cn",
            },

            // Colliding aliases: "pub" maps to both, but only publication
            // carries it as a dedicated query code.
            "publisher": {
                "@id": format!("{base}publisher"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "label": "pub",
            },
            "publication": {
                "@id": format!("{base}publication"),
                "@type": "ObjectProperty",
                "domain": [{ "@id": format!("{base}Instance") }],
                "label": "pub",
                "queryCode": "pub",
            },
            // Colliding aliases with no tiebreaker: stays ambiguous.
            "note": {
                "@id": format!("{base}note"),
                "@type": "DatatypeProperty",
                "label": "anm",
            },
            "notation": {
                "@id": format!("{base}notation"),
                "@type": "DatatypeProperty",
                "label": "anm",
            },

            // Enumeration individuals.
            "Serial": {
                "@id": format!("{base}Serial"),
                "@type": "IssuanceType",
                "prefLabelByLang": { "en": "serial", "sv": "seriell" },
            },
            "Monograph": {
                "@id": format!("{base}Monograph"),
                "@type": "IssuanceType",
                "prefLabelByLang": { "en": "monograph", "sv": "monografi" },
            },
            "Author": {
                "@id": format!("{base}Author"),
                "@type": "Role",
                "prefLabelByLang": { "en": "author", "sv": "författare" },
            },
            "Translator": {
                "@id": format!("{base}Translator"),
                "@type": "Role",
                "prefLabelByLang": { "en": "translator", "sv": "översättare" },
            },
        },
    })
}
