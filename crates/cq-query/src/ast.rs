//! Boolean-algebra abstract syntax tree.
//!
//! Reduces the concrete parse tree to a small boolean algebra. This is a
//! purely structural pass with no vocabulary knowledge; codes are still raw
//! alias strings at this point.

use crate::{
    error::ParseError,
    operator::Operator,
    parser::{AndComb, OrComb, Term},
};

/// A node of the boolean-algebra AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// Conjunction of two or more operands.
    And(Vec<Ast>),
    /// Disjunction of two or more operands.
    Or(Vec<Ast>),
    /// Negation of an operand.
    Not(Box<Ast>),
    /// Fuzzy match (`~`). Parses, but is rejected during flattening.
    Like(Box<Ast>),
    /// A code applied to an operand: `code:operand`.
    CodeEquals {
        /// The field code (still an unresolved alias).
        code: String,
        /// The operand; may be a compound group until codes are distributed.
        operand: Box<Ast>,
    },
    /// A code compared to a value: `code>value`, `code<=value`, …
    CodeCompare {
        /// The field code (still an unresolved alias).
        code: String,
        /// The comparison operator.
        operator: Operator,
        /// The compared value.
        value: String,
    },
    /// A free-text word or phrase.
    Leaf(String),
}

impl Ast {
    /// Builds the AST from a parse tree.
    pub fn build(parse_tree: OrComb) -> Result<Self, ParseError> {
        reduce_or(parse_tree)
    }

    /// Creates a conjunction, collapsing a single operand to itself.
    pub fn and(mut operands: Vec<Self>) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            Self::And(operands)
        }
    }

    /// Creates a disjunction, collapsing a single operand to itself.
    pub fn or(mut operands: Vec<Self>) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            Self::Or(operands)
        }
    }
}

/// Reduces an OR-combination.
fn reduce_or(or_comb: OrComb) -> Result<Ast, ParseError> {
    let operands = or_comb
        .and_combs
        .into_iter()
        .map(reduce_and)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ast::or(operands))
}

/// Reduces an AND-combination.
fn reduce_and(and_comb: AndComb) -> Result<Ast, ParseError> {
    let operands = and_comb
        .terms
        .into_iter()
        .map(reduce_term)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ast::and(operands))
}

/// Reduces a single term.
fn reduce_term(term: Term) -> Result<Ast, ParseError> {
    match term {
        Term::Atom(token) => Ok(Ast::Leaf(token.text)),
        Term::Group(or_comb) => reduce_or(or_comb),
        Term::Unary { op, term } => {
            let operand = Box::new(reduce_term(*term)?);
            if op.text == "~" {
                Ok(Ast::Like(operand))
            } else {
                Ok(Ast::Not(operand))
            }
        }
        Term::Compare { code, op, value } => {
            let operator = Operator::from_symbol(&op.text).ok_or_else(|| {
                ParseError::new(
                    format!("unsupported comparison operator \"{}\"", op.text),
                    Some(op.offset),
                )
            })?;
            Ok(Ast::CodeCompare {
                code: code.text,
                operator,
                value: value.text,
            })
        }
        Term::CodeValue { code, term } => Ok(Ast::CodeEquals {
            code: code.text,
            operand: Box::new(reduce_term(*term)?),
        }),
    }
}
