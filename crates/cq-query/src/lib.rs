//! Query language parsing for cq catalog search.
//!
//! This crate turns a compact, human-typed query string into a flattened
//! boolean-algebra AST, ready for vocabulary disambiguation:
//!
//! - **Free text**: `winter book` - words that must appear
//! - **Phrases**: `"winter book"` - exact sequences
//! - **Codes**: `title:winter`, `genre:(poetry or prose)` - field conditions
//! - **Comparisons**: `year>=1950`, `year!=1999` - range conditions
//! - **Negation**: `not poetry`, `!poetry` - must NOT match
//! - **Boolean**: `and` (also implicit between terms), `or`, `( … )`
//!
//! # Example
//!
//! ```
//! use cq_query::parse_query;
//!
//! let flattened = parse_query("author:Bergman and (genre:poetry or genre:prose)").unwrap();
//! assert!(flattened.is_some());
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod flatten;
mod lexer;
mod operator;
mod parser;

pub use ast::Ast;
pub use error::{FlattenError, LexError, ParseError, QueryError, QueryErrorKind};
pub use flatten::{FlattenedAst, flatten};
pub use lexer::{Token, TokenKind, tokenize};
pub use operator::{Operator, WILDCARD};
pub use parser::{AndComb, OrComb, Term, parse};

/// Runs the whole pipeline: lex, parse, AST reduction, flattening.
///
/// Returns `Ok(None)` for a blank query, `Ok(Some(flattened))` for a valid
/// query, or a [`QueryError`] carrying the original input for display.
pub fn parse_query(input: &str) -> Result<Option<FlattenedAst>, QueryError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let tokens = tokenize(input)?;
    let parse_tree = parse(tokens).map_err(|e| QueryError::from(e).with_query(input))?;
    let ast = Ast::build(parse_tree).map_err(|e| QueryError::from(e).with_query(input))?;
    let flattened = flatten(ast).map_err(|e| QueryError::from(e).with_query(input))?;
    Ok(Some(flattened))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_none() {
        assert!(parse_query("").unwrap().is_none());
        assert!(parse_query("   ").unwrap().is_none());
    }

    #[test]
    fn pipeline_produces_flattened_ast() {
        let flattened = parse_query("author:Bergman and (genre:poetry or genre:prose)")
            .unwrap()
            .unwrap();
        assert!(matches!(flattened, FlattenedAst::And(ref operands) if operands.len() == 2));
    }

    #[test]
    fn errors_carry_the_query() {
        let err = parse_query("(unclosed").unwrap_err();
        assert_eq!(err.query.as_deref(), Some("(unclosed"));
    }
}
