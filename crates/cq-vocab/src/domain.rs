//! Property domain inference and classification.
//!
//! The declared domain of a property decides which level of the
//! bibliographic model it is bound to, which in turn drives search-path
//! rewriting. Properties frequently leave their domain implicit, so
//! inference walks related properties breadth-first until a declared
//! domain turns up.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::index::Vocab;

/// The admin-metadata (record-level) class.
pub const ADMIN_METADATA: &str = "AdminMetadata";
/// The Work class: abstract creative content.
pub const WORK: &str = "Work";
/// The Instance class: a concrete manifestation of a Work.
pub const INSTANCE: &str = "Instance";

/// Classification of a property's domain, driving path rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainCategory {
    /// Record-level metadata; paths get the record prefix.
    AdminMetadata,
    /// Bound to the Work level.
    Work,
    /// Bound to the Instance level.
    Instance,
    /// A supertype of both Work and Instance; could sit at either level.
    CreationSuper,
    /// A supertype of Instance only (but not of Work).
    Embodiment,
    /// No domain could be inferred.
    Unknown,
    /// A domain outside the Work/Instance hierarchy (agents, concepts, …).
    Other,
}

/// Infers the domain of a property.
///
/// Breadth-first search trying, in priority order at each step: the
/// declared `domain`, then `subPropertyOf`, then `equivalentProperty`,
/// then the first hop of a `propertyChainAxiom`. Returns the first
/// declared domain found, as a term key.
pub fn domain_of(vocab: &Vocab, property: &str) -> Option<String> {
    let mut queue = VecDeque::from([property.to_string()]);
    let mut visited = BTreeSet::new();

    while let Some(key) = queue.pop_front() {
        if !visited.insert(key.clone()) {
            continue;
        }
        let Some(def) = vocab.term(&key) else {
            continue;
        };

        if let Some(domain) = def.domain.iter().find_map(|r| vocab.ref_key(r)) {
            return Some(domain);
        }

        for r in def.sub_property_of.iter() {
            if let Some(key) = vocab.ref_key(r) {
                queue.push_back(key);
            }
        }
        for r in def.equivalent_property.iter() {
            if let Some(key) = vocab.ref_key(r) {
                queue.push_back(key);
            }
        }
        if let Some(first_hop) = def.property_chain_axiom.iter().next() {
            if let Some(key) = vocab.ref_key(first_hop) {
                queue.push_back(key);
            } else if let Some(key) = first_hop.sub_property_of.iter().next().and_then(|r| vocab.ref_key(r)) {
                // Anonymous hops carry their property via subPropertyOf.
                queue.push_back(key);
            }
        }
    }

    None
}

/// Buckets domains into categories using precomputed subclass closures.
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    /// AdminMetadata and its subclasses.
    admin_metadata: BTreeSet<String>,
    /// Work and its subclasses.
    work: BTreeSet<String>,
    /// Instance and its subclasses.
    instance: BTreeSet<String>,
    /// Proper superclasses of both Work and Instance.
    creation_super: BTreeSet<String>,
    /// Proper superclasses of Instance that are not Work-compatible.
    embodiment: BTreeSet<String>,
}

impl DomainClassifier {
    /// Precomputes the category sets from the vocabulary's class closures.
    pub fn new(vocab: &Vocab) -> Self {
        let with_self = |class: &str| {
            let mut set = vocab.sub_classes(class);
            set.insert(class.to_string());
            set
        };

        let work_supers = vocab.super_classes(WORK);
        let instance_supers = vocab.super_classes(INSTANCE);

        let creation_super: BTreeSet<String> = work_supers
            .intersection(&instance_supers)
            .cloned()
            .collect();
        let embodiment: BTreeSet<String> = instance_supers
            .difference(&creation_super)
            .cloned()
            .collect();

        Self {
            admin_metadata: with_self(ADMIN_METADATA),
            work: with_self(WORK),
            instance: with_self(INSTANCE),
            creation_super,
            embodiment,
        }
    }

    /// Classifies an inferred domain. `None` means no domain was found.
    pub fn classify(&self, domain: Option<&str>) -> DomainCategory {
        let Some(domain) = domain else {
            return DomainCategory::Unknown;
        };
        if self.admin_metadata.contains(domain) {
            DomainCategory::AdminMetadata
        } else if self.work.contains(domain) {
            DomainCategory::Work
        } else if self.instance.contains(domain) {
            DomainCategory::Instance
        } else if self.creation_super.contains(domain) {
            DomainCategory::CreationSuper
        } else if self.embodiment.contains(domain) {
            DomainCategory::Embodiment
        } else {
            DomainCategory::Other
        }
    }
}

/// Precomputes the domain of every property in the vocabulary.
pub fn domains_by_property(vocab: &Vocab) -> BTreeMap<String, String> {
    let mut domains = BTreeMap::new();
    for (key, def) in vocab.terms() {
        if def.is_property()
            && let Some(domain) = domain_of(vocab, key)
        {
            domains.insert(key.to_string(), domain);
        }
    }
    domains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn declared_domain_wins() {
        let vocab = fixtures::vocab();
        assert_eq!(domain_of(&vocab, "contribution").as_deref(), Some("Work"));
        assert_eq!(domain_of(&vocab, "year").as_deref(), Some("Instance"));
    }

    #[test]
    fn chain_axiom_first_hop_supplies_domain() {
        let vocab = fixtures::vocab();
        // author has no declared domain; its chain starts at contribution,
        // whose domain is Work.
        assert_eq!(domain_of(&vocab, "author").as_deref(), Some("Work"));
    }

    #[test]
    fn anonymous_chain_hop_supplies_domain() {
        let vocab = fixtures::vocab();
        // translator's first hop is an anonymous restriction on
        // contribution.
        assert_eq!(domain_of(&vocab, "translator").as_deref(), Some("Work"));
    }

    #[test]
    fn missing_domain_is_none() {
        let vocab = fixtures::vocab();
        assert_eq!(domain_of(&vocab, "title"), None);
        assert_eq!(domain_of(&vocab, "nosuchproperty"), None);
    }

    #[test]
    fn classification_buckets() {
        let vocab = fixtures::vocab();
        let classifier = DomainClassifier::new(&vocab);

        let classify = |property: &str| {
            let domain = domain_of(&vocab, property);
            classifier.classify(domain.as_deref())
        };

        assert_eq!(classify("contribution"), DomainCategory::Work);
        assert_eq!(classify("author"), DomainCategory::Work);
        assert_eq!(classify("year"), DomainCategory::Instance);
        assert_eq!(classify("language"), DomainCategory::CreationSuper);
        assert_eq!(classify("controlNumber"), DomainCategory::AdminMetadata);
        assert_eq!(classify("title"), DomainCategory::Unknown);
        // agent's domain is Contribution, outside the hierarchy.
        assert_eq!(classify("agent"), DomainCategory::Other);
    }

    #[test]
    fn embodiment_is_instance_supertype_only() {
        let vocab = fixtures::vocab();
        let classifier = DomainClassifier::new(&vocab);
        assert_eq!(
            classifier.classify(Some("Embodiment")),
            DomainCategory::Embodiment
        );
        assert_eq!(
            classifier.classify(Some("Creation")),
            DomainCategory::CreationSuper
        );
    }

    #[test]
    fn subclasses_classify_with_their_root() {
        let vocab = fixtures::vocab();
        let classifier = DomainClassifier::new(&vocab);
        assert_eq!(classifier.classify(Some("Text")), DomainCategory::Work);
        assert_eq!(classifier.classify(Some("Print")), DomainCategory::Instance);
    }

    #[test]
    fn all_property_domains_precompute() {
        let vocab = fixtures::vocab();
        let domains = domains_by_property(&vocab);
        assert_eq!(domains.get("author").map(String::as_str), Some("Work"));
        assert_eq!(domains.get("year").map(String::as_str), Some("Instance"));
        assert!(!domains.contains_key("title"));
        assert!(!domains.contains_key("Work"));
    }
}
