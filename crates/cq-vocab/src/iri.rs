//! IRI helpers: prefix expansion/contraction and IRI detection.

use std::collections::BTreeMap;

/// True if the string looks like an absolute IRI.
pub fn looks_like_iri(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Expands a compact form (`pfx:Name`) to an absolute IRI using the given
/// prefix table. Anything without a known prefix is returned unchanged.
pub fn expand_prefixed(s: &str, prefixes: &BTreeMap<String, String>) -> String {
    if let Some((prefix, local)) = s.split_once(':')
        && let Some(namespace) = prefixes.get(prefix)
    {
        return format!("{namespace}{local}");
    }
    s.to_string()
}

/// Contracts an absolute IRI to its compact form (`pfx:Name`) if a prefix
/// covers it. Otherwise the IRI is returned unchanged.
pub fn to_prefixed(iri: &str, prefixes: &BTreeMap<String, String>) -> String {
    for (prefix, namespace) in prefixes {
        if let Some(local) = iri.strip_prefix(namespace.as_str()) {
            return format!("{prefix}:{local}");
        }
    }
    iri.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("ex".to_string(), "https://example.org/vocab/".to_string()),
            ("subj".to_string(), "https://example.org/term/subj/".to_string()),
        ])
    }

    #[test]
    fn detects_iris() {
        assert!(looks_like_iri("https://example.org/vocab/Work"));
        assert!(looks_like_iri("http://example.org/x"));
        assert!(!looks_like_iri("ex:Work"));
        assert!(!looks_like_iri("Work"));
    }

    #[test]
    fn expands_known_prefix() {
        assert_eq!(
            expand_prefixed("subj:Horses", &prefixes()),
            "https://example.org/term/subj/Horses"
        );
    }

    #[test]
    fn unknown_prefix_passes_through() {
        assert_eq!(expand_prefixed("zz:Horses", &prefixes()), "zz:Horses");
        assert_eq!(expand_prefixed("plain", &prefixes()), "plain");
    }

    #[test]
    fn contracts_covered_iri() {
        assert_eq!(
            to_prefixed("https://example.org/vocab/Work", &prefixes()),
            "ex:Work"
        );
    }

    #[test]
    fn uncovered_iri_passes_through() {
        assert_eq!(
            to_prefixed("https://other.org/Work", &prefixes()),
            "https://other.org/Work"
        );
    }

    #[test]
    fn round_trip() {
        let p = prefixes();
        let iri = "https://example.org/term/subj/Horses";
        assert_eq!(expand_prefixed(&to_prefixed(iri, &p), &p), iri);
    }
}
