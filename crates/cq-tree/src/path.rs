//! Index field paths.
//!
//! A [`Path`] is an ordered sequence of property hops (the stem), plus the
//! branches the query compiler may have added: alternate root prefixes
//! (traversing between Work and Instance level) and alternate suffixes
//! (`@id` for links, the search-string key for plain strings). A path with
//! branches denotes an OR over its concrete expansions; expansion always
//! preserves hop order, and every branching operation copies — a shared
//! mutable tail would alias across alternates.

use std::fmt;

/// The JSON-LD id key, suffixed onto object-property paths matching links.
pub const ID_KEY: &str = "@id";
/// The JSON-LD type key.
pub const TYPE_KEY: &str = "@type";
/// The reverse-relation key.
pub const REVERSE_KEY: &str = "@reverse";
/// The indexed search-string key, suffixed onto object-property paths
/// matching plain strings.
pub const SEARCH_KEY: &str = "_str";
/// The record-level (admin metadata) root.
pub const RECORD_KEY: &str = "meta";
/// The Instance-to-Work relation.
pub const WORK_KEY: &str = "instanceOf";

/// An index field path with optional root and suffix branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    /// Ordered property hops.
    stem: Vec<String>,
    /// Alternate root prefixes, each denoting an additional concrete path.
    alt_roots: Vec<Vec<String>>,
    /// Alternate suffixes, each denoting an additional concrete path.
    alt_suffixes: Vec<String>,
}

impl Path {
    /// Creates a path from its hops.
    pub fn new<S: Into<String>>(hops: impl IntoIterator<Item = S>) -> Self {
        Self {
            stem: hops.into_iter().map(Into::into).collect(),
            alt_roots: Vec::new(),
            alt_suffixes: Vec::new(),
        }
    }

    /// The stem hops.
    pub fn hops(&self) -> &[String] {
        &self.stem
    }

    /// The first stem hop, if any.
    pub fn first_hop(&self) -> Option<&str> {
        self.stem.first().map(String::as_str)
    }

    /// The last stem hop, if any.
    pub fn last_hop(&self) -> Option<&str> {
        self.stem.last().map(String::as_str)
    }

    /// Returns a copy with the record-level root prepended.
    pub fn prepend_record(&self) -> Self {
        self.with_stem_prefix(&[RECORD_KEY])
    }

    /// Returns a copy rewritten to reach Instance-bound fields from a
    /// Work-level outset, via the reverse instance relation.
    pub fn rewrite_from_work(&self) -> Self {
        self.with_stem_prefix(&[REVERSE_KEY, WORK_KEY])
    }

    /// Returns a copy rewritten to reach Work-bound fields from an
    /// Instance-level outset, via the embedded work.
    pub fn rewrite_from_instance(&self) -> Self {
        self.with_stem_prefix(&[WORK_KEY])
    }

    /// Returns a copy with an alternate root added: the base path stays,
    /// and expansion yields an extra concrete path traversing from Work
    /// level. Widens, never narrows.
    pub fn branch_from_work(&self) -> Self {
        self.with_alt_root(&[REVERSE_KEY, WORK_KEY])
    }

    /// Returns a copy with an alternate root traversing from Instance
    /// level.
    pub fn branch_from_instance(&self) -> Self {
        self.with_alt_root(&[WORK_KEY])
    }

    /// Returns a copy with an alternate suffix added alongside the base
    /// path (`@id` or the search-string key).
    pub fn branch_suffix(&self, suffix: &str) -> Self {
        let mut copy = self.clone();
        copy.alt_suffixes.push(suffix.to_string());
        copy
    }

    /// Returns a copy with the suffix appended to the stem itself (no
    /// branching).
    pub fn append(&self, hop: &str) -> Self {
        let mut copy = self.clone();
        copy.stem.push(hop.to_string());
        copy
    }

    /// Expands into concrete paths: the base path first, then the suffix
    /// alternates, then each alternate root combined with every suffix
    /// variant. Hop order within each concrete path is preserved.
    pub fn expand(&self) -> Vec<Self> {
        let mut roots: Vec<&[String]> = vec![&[]];
        roots.extend(self.alt_roots.iter().map(Vec::as_slice));

        let mut expanded = Vec::new();
        for root in roots {
            let mut base: Vec<String> = root.to_vec();
            base.extend(self.stem.iter().cloned());
            expanded.push(Self::new(base.clone()));
            for suffix in &self.alt_suffixes {
                let mut with_suffix = base.clone();
                with_suffix.push(suffix.clone());
                expanded.push(Self::new(with_suffix));
            }
        }
        expanded
    }

    /// True if this path has root or suffix branches.
    pub fn is_branched(&self) -> bool {
        !self.alt_roots.is_empty() || !self.alt_suffixes.is_empty()
    }

    /// The concrete dot-joined field name of the stem.
    pub fn field(&self) -> String {
        self.stem.join(".")
    }

    /// Copy with a stem prefix, carrying branches over.
    fn with_stem_prefix(&self, prefix: &[&str]) -> Self {
        let mut stem: Vec<String> = prefix.iter().map(ToString::to_string).collect();
        stem.extend(self.stem.iter().cloned());
        Self {
            stem,
            alt_roots: self.alt_roots.clone(),
            alt_suffixes: self.alt_suffixes.clone(),
        }
    }

    /// Copy with an additional alternate root.
    fn with_alt_root(&self, root: &[&str]) -> Self {
        let mut copy = self.clone();
        copy.alt_roots
            .push(root.iter().map(ToString::to_string).collect());
        copy
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field())
    }
}
