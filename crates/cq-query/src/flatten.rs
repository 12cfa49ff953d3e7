//! Semantic flattening of the boolean-algebra AST.
//!
//! Three passes, composed in order:
//!
//! 1. **Code distribution** — a code applied to a group is pushed down onto
//!    the group's leaves (`genre:(a or b)` becomes `genre:a or genre:b`),
//!    so a code never wraps a compound operand. A code inside another
//!    code's group is a semantic error.
//! 2. **Negation pushdown** — De Morgan rewriting carries a negation flag
//!    down to the leaves; comparison operators are replaced by their
//!    inverses instead of being wrapped. Double negation cancels (the flag
//!    is XORed, never nested).
//! 3. **Leaf merge** — adjacent free-text leaves under the same AND are
//!    concatenated into one search string, so `a b c` is a single free-text
//!    query rather than three independently ranked clauses.
//!
//! The result contains negation only at leaves and codes only with plain
//! values. Flattening is idempotent.

use crate::{ast::Ast, error::FlattenError, operator::Operator};

/// A node of the flattened AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenedAst {
    /// Conjunction.
    And(Vec<FlattenedAst>),
    /// Disjunction.
    Or(Vec<FlattenedAst>),
    /// A negated free-text value. Negation never wraps anything else.
    Not(String),
    /// A code condition with a plain value.
    Code {
        /// The field code (still an unresolved alias).
        code: String,
        /// The (possibly inverted) comparison operator.
        operator: Operator,
        /// The plain value.
        value: String,
    },
    /// A free-text value.
    Leaf(String),
}

impl FlattenedAst {
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

/// Flattens an AST: distributes codes, pushes negation to the leaves and
/// merges adjacent free-text leaves.
pub fn flatten(ast: Ast) -> Result<FlattenedAst, FlattenError> {
    let distributed = distribute_codes(ast, None)?;
    let pushed = push_negations(distributed, false)?;
    Ok(merge_leaves(pushed))
}

/// Pushes codes down so they only ever wrap plain leaves.
///
/// `code` is the enclosing code while inside a code group; encountering
/// another code there is a [`FlattenError::NestedCode`].
fn distribute_codes(ast: Ast, code: Option<&str>) -> Result<Ast, FlattenError> {
    match ast {
        Ast::Leaf(value) => Ok(match code {
            Some(c) => Ast::CodeEquals {
                code: c.to_string(),
                operand: Box::new(Ast::Leaf(value)),
            },
            None => Ast::Leaf(value),
        }),
        Ast::And(operands) => Ok(Ast::And(
            operands
                .into_iter()
                .map(|o| distribute_codes(o, code))
                .collect::<Result<_, _>>()?,
        )),
        Ast::Or(operands) => Ok(Ast::Or(
            operands
                .into_iter()
                .map(|o| distribute_codes(o, code))
                .collect::<Result<_, _>>()?,
        )),
        Ast::Not(operand) => Ok(Ast::Not(Box::new(distribute_codes(*operand, code)?))),
        Ast::Like(operand) => Ok(Ast::Like(Box::new(distribute_codes(*operand, code)?))),
        Ast::CodeEquals {
            code: inner,
            operand,
        } => match code {
            Some(outer) => Err(FlattenError::NestedCode {
                outer: outer.to_string(),
                inner,
            }),
            None => distribute_codes(*operand, Some(&inner)),
        },
        Ast::CodeCompare {
            code: inner,
            operator,
            value,
        } => match code {
            Some(outer) => Err(FlattenError::NestedCode {
                outer: outer.to_string(),
                inner,
            }),
            None => Ok(Ast::CodeCompare {
                code: inner,
                operator,
                value,
            }),
        },
    }
}

/// Pushes negation down to the leaves, XORing the flag through NOT nodes.
fn push_negations(ast: Ast, negate: bool) -> Result<FlattenedAst, FlattenError> {
    match ast {
        Ast::And(operands) => {
            let operands = operands
                .into_iter()
                .map(|o| push_negations(o, negate))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if negate {
                FlattenedAst::or(operands)
            } else {
                FlattenedAst::and(operands)
            })
        }
        Ast::Or(operands) => {
            let operands = operands
                .into_iter()
                .map(|o| push_negations(o, negate))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if negate {
                FlattenedAst::and(operands)
            } else {
                FlattenedAst::or(operands)
            })
        }
        Ast::Not(operand) => push_negations(*operand, !negate),
        Ast::Like(_) => Err(FlattenError::UnsupportedLike),
        Ast::CodeEquals { code, operand } => {
            let value = match *operand {
                Ast::Leaf(value) => value,
                other => unreachable!("codes are distributed before negation pushdown: {other:?}"),
            };
            let operator = if negate {
                Operator::NotEquals
            } else {
                Operator::Equals
            };
            Ok(FlattenedAst::Code {
                code,
                operator,
                value,
            })
        }
        Ast::CodeCompare {
            code,
            operator,
            value,
        } => Ok(FlattenedAst::Code {
            code,
            operator: if negate { operator.inverse() } else { operator },
            value,
        }),
        Ast::Leaf(value) => {
            let value = quote_if_phrase(&value);
            Ok(if negate {
                FlattenedAst::Not(value)
            } else {
                FlattenedAst::Leaf(value)
            })
        }
    }
}

/// Concatenates adjacent free-text leaves under the same AND.
fn merge_leaves(node: FlattenedAst) -> FlattenedAst {
    match node {
        FlattenedAst::And(operands) => {
            let mut merged: Vec<FlattenedAst> = Vec::new();
            for operand in operands.into_iter().map(merge_leaves) {
                if let FlattenedAst::Leaf(value) = &operand
                    && let Some(FlattenedAst::Leaf(previous)) = merged.last_mut()
                {
                    previous.push(' ');
                    previous.push_str(value);
                    continue;
                }
                merged.push(operand);
            }
            FlattenedAst::and(merged)
        }
        FlattenedAst::Or(operands) => {
            FlattenedAst::or(operands.into_iter().map(merge_leaves).collect())
        }
        other => other,
    }
}

/// Quotes a free-text value that contains whitespace, so phrase semantics
/// survive leaf merging and query-string round trips. Embedded quotes and
/// backslashes are re-escaped.
fn quote_if_phrase(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
