//! Query tree nodes and pure tree transformations.
//!
//! A [`QueryTree`] is immutable: `add`, `remove` and `replace` return new
//! trees, so speculative variants ("what would the query look like with
//! this facet value added?") can be rendered without disturbing the tree
//! the current search runs on.

use cq_query::Operator;

use crate::{path::Path, value::Value};

/// A path condition: a field path, an operator and a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValue {
    /// The canonical property key the condition was built from.
    pub property: String,
    /// The field path.
    pub path: Path,
    /// The comparison operator.
    pub operator: Operator,
    /// The typed value.
    pub value: Value,
}

impl PathValue {
    /// Creates an equality condition on a single-hop path.
    pub fn equals(property: &str, value: Value) -> Self {
        Self {
            property: property.to_string(),
            path: Path::new([property]),
            operator: Operator::Equals,
            value,
        }
    }
}

/// A free-text condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeText {
    /// `Equals` for must-match, `NotEquals` for must-not-match.
    pub operator: Operator,
    /// The search text, in query syntax (phrases quoted).
    pub value: String,
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// All children must match.
    And(Vec<Node>),
    /// At least one child must match.
    Or(Vec<Node>),
    /// A path condition.
    PathValue(PathValue),
    /// A free-text condition.
    FreeText(FreeText),
}

impl Node {
    /// Creates a conjunction, collapsing a single child to itself.
    pub fn and(mut children: Vec<Self>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::And(children)
        }
    }

    /// Creates a disjunction, collapsing a single child to itself.
    pub fn or(mut children: Vec<Self>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::Or(children)
        }
    }

    /// Renders the node in query syntax.
    ///
    /// Alternate-path expansion produces groups whose members render to
    /// the same text (the same property at different index paths); those
    /// render once, so rendering and re-parsing converge.
    fn render(&self, nested: bool) -> String {
        match self {
            Self::And(children) => {
                let parts = dedup_rendered(children);
                let joined = parts.join(" ");
                if nested && parts.len() > 1 {
                    format!("({joined})")
                } else {
                    joined
                }
            }
            Self::Or(children) => {
                let parts = dedup_rendered(children);
                let joined = parts.join(" OR ");
                if nested && parts.len() > 1 {
                    format!("({joined})")
                } else {
                    joined
                }
            }
            Self::PathValue(pv) => pv
                .operator
                .format(&pv.property, &quote_value(pv.value.as_str())),
            Self::FreeText(ft) => match ft.operator {
                Operator::NotEquals => format!("NOT {}", ft.value),
                _ => ft.value.clone(),
            },
        }
    }
}

/// An immutable query tree; possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryTree {
    root: Option<Node>,
}

impl QueryTree {
    /// Creates a tree from a root node.
    pub fn new(root: Node) -> Self {
        Self { root: Some(root) }
    }

    /// Creates an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if the tree has no conditions.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// The top-level conjuncts: the children of a top-level AND, or the
    /// single root node.
    pub fn top_level_nodes(&self) -> Vec<&Node> {
        match &self.root {
            Some(Node::And(children)) => children.iter().collect(),
            Some(node) => vec![node],
            None => Vec::new(),
        }
    }

    /// The path conditions among the top-level conjuncts.
    pub fn top_level_path_values(&self) -> Vec<&PathValue> {
        self.top_level_nodes()
            .into_iter()
            .filter_map(|node| match node {
                Node::PathValue(pv) => Some(pv),
                _ => None,
            })
            .collect()
    }

    /// True if the node appears among the top-level conjuncts.
    pub fn top_level_contains(&self, node: &Node) -> bool {
        self.top_level_nodes().into_iter().any(|n| n == node)
    }

    /// Returns a new tree with the node AND-ed onto the top level. Adding
    /// a node that is already a top-level conjunct returns an identical
    /// tree.
    #[must_use]
    pub fn add(&self, node: Node) -> Self {
        match &self.root {
            None => Self::new(node),
            Some(Node::And(children)) => {
                if children.contains(&node) {
                    self.clone()
                } else {
                    let mut children = children.clone();
                    children.push(node);
                    Self::new(Node::And(children))
                }
            }
            Some(root) => {
                if *root == node {
                    self.clone()
                } else {
                    Self::new(Node::And(vec![root.clone(), node]))
                }
            }
        }
    }

    /// Returns a new tree with every occurrence of the node removed.
    /// Single-child booleans collapse; removing the last condition yields
    /// an empty tree.
    #[must_use]
    pub fn remove(&self, node: &Node) -> Self {
        Self {
            root: self.root.as_ref().and_then(|root| exclude(root, node)),
        }
    }

    /// Returns a new tree with all the given nodes removed.
    #[must_use]
    pub fn remove_all<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        nodes.into_iter().fold(self.clone(), |tree, n| tree.remove(n))
    }

    /// Returns a new tree with every occurrence of `target` replaced.
    #[must_use]
    pub fn replace(&self, target: &Node, replacement: &Node) -> Self {
        Self {
            root: self
                .root
                .as_ref()
                .map(|root| substitute(root, target, replacement)),
        }
    }

    /// The positive free-text part of the query, if any.
    pub fn free_text_part(&self) -> Option<&str> {
        self.top_level_nodes().into_iter().find_map(|node| match node {
            Node::FreeText(ft) if ft.operator == Operator::Equals => Some(ft.value.as_str()),
            _ => None,
        })
    }

    /// Collects the values of every `rdf:type` equality condition in the
    /// whole tree.
    pub fn collect_given_types(&self) -> Vec<&Value> {
        fn walk<'t>(node: &'t Node, types: &mut Vec<&'t Value>) {
            match node {
                Node::And(children) | Node::Or(children) => {
                    children.iter().for_each(|c| walk(c, types));
                }
                Node::PathValue(pv) => {
                    if pv.property == cq_vocab::TYPE_KEY && pv.operator == Operator::Equals {
                        types.push(&pv.value);
                    }
                }
                Node::FreeText(_) => {}
            }
        }

        let mut types = Vec::new();
        if let Some(root) = &self.root {
            walk(root, &mut types);
        }
        types
    }

    /// Renders the tree in (re-parseable) query syntax.
    pub fn to_query_string(&self) -> String {
        match &self.root {
            Some(root) => root.render(false),
            None => String::new(),
        }
    }
}

/// Renders a group's children, keeping the first of identical renderings.
fn dedup_rendered(children: &[Node]) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for child in children {
        let rendered = child.render(true);
        if !parts.contains(&rendered) {
            parts.push(rendered);
        }
    }
    parts
}

/// Removes `target` from a subtree, collapsing as needed.
fn exclude(node: &Node, target: &Node) -> Option<Node> {
    if node == target {
        return None;
    }
    match node {
        Node::And(children) => {
            let kept: Vec<Node> = children.iter().filter_map(|c| exclude(c, target)).collect();
            match kept.len() {
                0 => None,
                _ => Some(Node::and(kept)),
            }
        }
        Node::Or(children) => {
            let kept: Vec<Node> = children.iter().filter_map(|c| exclude(c, target)).collect();
            match kept.len() {
                0 => None,
                _ => Some(Node::or(kept)),
            }
        }
        other => Some(other.clone()),
    }
}

/// Replaces `target` with `replacement` throughout a subtree.
fn substitute(node: &Node, target: &Node, replacement: &Node) -> Node {
    if node == target {
        return replacement.clone();
    }
    match node {
        Node::And(children) => Node::And(
            children
                .iter()
                .map(|c| substitute(c, target, replacement))
                .collect(),
        ),
        Node::Or(children) => Node::Or(
            children
                .iter()
                .map(|c| substitute(c, target, replacement))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Quotes a value whose text would not survive re-lexing unquoted.
fn quote_value(value: &str) -> String {
    let needs_quoting = value
        .chars()
        .any(|c| c.is_whitespace() || "!<>=~():\"".contains(c));
    if needs_quoting && !value.starts_with('"') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
