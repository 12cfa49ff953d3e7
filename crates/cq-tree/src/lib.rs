//! Typed semantic query tree for cq catalog search.
//!
//! Sits between the parsed query language and the backend query compiler:
//! a [`QueryTree`] of boolean nodes over typed path conditions, built from
//! a flattened AST with the vocabulary's help. Path conditions know which
//! index fields they address, including chain-axiom expansions and
//! Work/Instance traversals; trees are immutable and all transformations
//! return new trees.
//!
//! # Example
//!
//! ```
//! use cq_query::parse_query;
//! use cq_tree::build;
//! use cq_vocab::{Disambiguator, fixtures};
//!
//! let vocab = fixtures::vocab();
//! let disambiguator = Disambiguator::new(&vocab);
//! let ast = parse_query("genre:poetry").unwrap().unwrap();
//! let tree = build(&ast, &disambiguator).unwrap();
//! assert_eq!(tree.top_level_nodes().len(), 1);
//! ```

#![warn(missing_docs)]

mod build;
mod error;
mod node;
mod path;
mod value;

pub use build::{Outset, build, build_with_outset, search_paths};
pub use error::BuildError;
pub use node::{FreeText, Node, PathValue, QueryTree};
pub use path::{
    ID_KEY, Path, RECORD_KEY, REVERSE_KEY, SEARCH_KEY, TYPE_KEY as TYPE_PATH_KEY, WORK_KEY,
};
pub use value::Value;
