//! Shift-reduce query parser.
//!
//! Parses a token stream into a concrete parse tree with one token of
//! lookahead. The grammar, highest binding first:
//!
//! ```text
//! orcomb  → andcomb ( "or" andcomb )*
//! andcomb → term ( "and" term | term )*
//! term    → STRING | group | uop term | STRING bop STRING | STRING bopeq term
//! group   → "(" orcomb ")"
//! uop     → "not" | "!" | "~"
//! bop     → "<" | ">" | "<=" | ">=" | "!="
//! bopeq   → ":" | "="
//! ```
//!
//! Bare juxtaposition of terms is implicit AND. List reductions (andcomb,
//! orcomb) only fire once the lookahead token cannot extend the list, which
//! keeps the parser deterministic with a single token of lookahead.

use crate::{
    error::ParseError,
    lexer::{Token, TokenKind},
};

/// Root of the concrete parse tree: one or more AND-combinations joined by OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrComb {
    /// The OR-joined branches.
    pub and_combs: Vec<AndComb>,
}

/// One or more terms joined by (implicit or explicit) AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndComb {
    /// The AND-joined terms.
    pub terms: Vec<Term>,
}

/// A single term of the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A bare word or quoted phrase.
    Atom(Token),
    /// A parenthesized group.
    Group(OrComb),
    /// A negation (`not`/`!`) or like (`~`) prefix applied to a term.
    Unary {
        /// The prefix operator token.
        op: Token,
        /// The term it applies to.
        term: Box<Term>,
    },
    /// A comparison: `code < value`, `code >= value`, `code != value`, …
    Compare {
        /// The field code.
        code: Token,
        /// The comparison operator token.
        op: Token,
        /// The compared value.
        value: Token,
    },
    /// A code condition: `code:term` or `code=term`.
    CodeValue {
        /// The field code.
        code: Token,
        /// The operand, possibly a group.
        term: Box<Term>,
    },
}

/// An entry on the parse stack: a raw token or a reduced grammar production.
#[derive(Debug)]
enum Item {
    /// An unreduced token.
    Sym(Token),
    /// A unary prefix operator (`not`, `!`, `~`).
    Uop(Token),
    /// A comparison operator (`<`, `>`, `<=`, `>=`, `!=`).
    Bop(Token),
    /// An equality operator (`:`, `=`).
    BopEq(Token),
    /// A reduced term.
    Term(Term),
    /// A reduced AND-combination.
    AndComb(AndComb),
    /// A reduced OR-combination.
    OrComb(OrComb),
    /// A reduced parenthesized group.
    Group(OrComb),
}

/// Comparison operator symbols (reduced to [`Item::Bop`]).
const COMPARISONS: [&str; 5] = ["<", ">", "<=", ">=", "!="];

/// Parses a token stream into a parse tree.
///
/// An empty token stream is a [`ParseError`]; the caller decides what an
/// empty query means.
pub fn parse(tokens: Vec<Token>) -> Result<OrComb, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new("empty query", None));
    }

    let mut stack: Vec<Item> = Vec::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        stack.push(Item::Sym(token));
        while reduce(&mut stack, tokens.peek())? {}
    }

    if matches!(stack.as_slice(), [Item::OrComb(_)])
        && let Some(Item::OrComb(or_comb)) = stack.pop()
    {
        return Ok(or_comb);
    }

    Err(diagnose(&stack))
}

/// Attempts a single reduction against the stack top, honoring the lookahead.
///
/// Returns true if a reduction fired. Reductions are tried in fixed order:
/// operators, terms, AND-lists, OR-lists, groups.
fn reduce(stack: &mut Vec<Item>, lookahead: Option<&Token>) -> Result<bool, ParseError> {
    if reduce_operator(stack) {
        return Ok(true);
    }
    if reduce_term(stack, lookahead) {
        return Ok(true);
    }
    if reduce_and_comb(stack, lookahead) {
        return Ok(true);
    }
    if reduce_or_comb(stack, lookahead) {
        return Ok(true);
    }
    reduce_group(stack)
}

/// Reduces a raw operator/keyword token to its operator item.
fn reduce_operator(stack: &mut Vec<Item>) -> bool {
    let Some(Item::Sym(top)) = stack.last() else {
        return false;
    };

    let replacement: fn(Token) -> Item = if top.kind == TokenKind::Operator
        && COMPARISONS.contains(&top.text.as_str())
    {
        Item::Bop
    } else if top.is_operator(":") || top.is_operator("=") {
        Item::BopEq
    } else if top.is_keyword("not") || top.is_operator("!") || top.is_operator("~") {
        Item::Uop
    } else {
        return false;
    };

    let Some(Item::Sym(token)) = stack.pop() else {
        return false;
    };
    stack.push(replacement(token));
    true
}

/// Reduces the stack top to a [`Term`] where possible.
fn reduce_term(stack: &mut Vec<Item>, lookahead: Option<&Token>) -> bool {
    let n = stack.len();

    // STRING bop STRING → Compare
    if n >= 3
        && matches!(&stack[n - 3], Item::Sym(s) if s.is_string())
        && matches!(&stack[n - 2], Item::Bop(_))
        && matches!(&stack[n - 1], Item::Sym(s) if s.is_string())
    {
        let (Some(Item::Sym(value)), Some(Item::Bop(op)), Some(Item::Sym(code))) =
            (stack.pop(), stack.pop(), stack.pop())
        else {
            return false;
        };
        stack.push(Item::Term(Term::Compare { code, op, value }));
        return true;
    }

    // STRING bopeq term → CodeValue
    if n >= 3
        && matches!(&stack[n - 3], Item::Sym(s) if s.is_string())
        && matches!(&stack[n - 2], Item::BopEq(_))
        && matches!(&stack[n - 1], Item::Term(_))
    {
        let (Some(Item::Term(term)), Some(Item::BopEq(_)), Some(Item::Sym(code))) =
            (stack.pop(), stack.pop(), stack.pop())
        else {
            return false;
        };
        stack.push(Item::Term(Term::CodeValue {
            code,
            term: Box::new(term),
        }));
        return true;
    }

    // uop term → Unary
    if n >= 2
        && matches!(&stack[n - 2], Item::Uop(_))
        && matches!(&stack[n - 1], Item::Term(_))
    {
        let (Some(Item::Term(term)), Some(Item::Uop(op))) = (stack.pop(), stack.pop()) else {
            return false;
        };
        stack.push(Item::Term(Term::Unary {
            op,
            term: Box::new(term),
        }));
        return true;
    }

    // STRING → Atom, unless the lookahead makes it a code or comparison lhs.
    if matches!(stack.last(), Some(Item::Sym(s)) if s.is_string()) && !blocks_atom(lookahead) {
        let Some(Item::Sym(token)) = stack.pop() else {
            return false;
        };
        stack.push(Item::Term(Term::Atom(token)));
        return true;
    }

    // group → Term
    if matches!(stack.last(), Some(Item::Group(_))) {
        let Some(Item::Group(or_comb)) = stack.pop() else {
            return false;
        };
        stack.push(Item::Term(Term::Group(or_comb)));
        return true;
    }

    false
}

/// True if the lookahead binds the preceding string into a condition, so the
/// string must not yet be reduced to a bare term.
fn blocks_atom(lookahead: Option<&Token>) -> bool {
    lookahead.is_some_and(|t| {
        t.kind == TokenKind::Operator
            && (COMPARISONS.contains(&t.text.as_str()) || t.text == ":" || t.text == "=")
    })
}

/// Reduces a completed AND-list. The whole list must be on the stack: the
/// reduction only fires when the lookahead cannot extend the list.
fn reduce_and_comb(stack: &mut Vec<Item>, lookahead: Option<&Token>) -> bool {
    if !matches!(stack.last(), Some(Item::Term(_))) {
        return false;
    }

    let extendable = lookahead.is_some_and(|t| {
        t.is_string()
            || t.is_operator("!")
            || t.is_operator("~")
            || t.is_operator(":")
            || t.is_operator("=")
            || t.is_operator("(")
            || t.is_keyword("not")
            || t.is_keyword("and")
    });
    if extendable {
        return false;
    }

    let mut terms = Vec::new();
    loop {
        if matches!(stack.last(), Some(Item::Term(_))) {
            if let Some(Item::Term(term)) = stack.pop() {
                terms.push(term);
            }
            continue;
        }
        // An explicit "and" joining the next term below it.
        let joining_and = stack.len() >= 2
            && matches!(stack.last(), Some(Item::Sym(s)) if s.is_keyword("and"))
            && matches!(&stack[stack.len() - 2], Item::Term(_));
        if joining_and {
            stack.pop();
            continue;
        }
        break;
    }
    terms.reverse();

    stack.push(Item::AndComb(AndComb { terms }));
    true
}

/// Reduces a completed OR-list once the lookahead is not another `or`.
fn reduce_or_comb(stack: &mut Vec<Item>, lookahead: Option<&Token>) -> bool {
    if !matches!(stack.last(), Some(Item::AndComb(_))) {
        return false;
    }
    if lookahead.is_some_and(|t| t.is_keyword("or")) {
        return false;
    }

    let mut and_combs = Vec::new();
    let Some(Item::AndComb(first)) = stack.pop() else {
        return false;
    };
    and_combs.push(first);

    while stack.len() >= 2
        && matches!(stack.last(), Some(Item::Sym(s)) if s.is_keyword("or"))
        && matches!(&stack[stack.len() - 2], Item::AndComb(_))
    {
        stack.pop();
        let Some(Item::AndComb(next)) = stack.pop() else {
            break;
        };
        and_combs.push(next);
    }
    and_combs.reverse();

    stack.push(Item::OrComb(OrComb { and_combs }));
    true
}

/// Reduces `( orcomb )` to a group. An empty group `()` is an error.
fn reduce_group(stack: &mut Vec<Item>) -> Result<bool, ParseError> {
    let n = stack.len();
    if !matches!(stack.last(), Some(Item::Sym(s)) if s.is_operator(")")) {
        return Ok(false);
    }

    if n >= 3
        && matches!(&stack[n - 2], Item::OrComb(_))
        && matches!(&stack[n - 3], Item::Sym(s) if s.is_operator("("))
    {
        let (Some(Item::Sym(_)), Some(Item::OrComb(or_comb)), Some(Item::Sym(_))) =
            (stack.pop(), stack.pop(), stack.pop())
        else {
            return Ok(false);
        };
        stack.push(Item::Group(or_comb));
        return Ok(true);
    }

    if n >= 2
        && let Item::Sym(open) = &stack[n - 2]
        && open.is_operator("(")
    {
        return Err(ParseError::new("empty group", Some(open.offset)));
    }

    Ok(false)
}

/// Produces the most helpful error for a stack that failed to reduce to a
/// single OR-combination.
fn diagnose(stack: &[Item]) -> ParseError {
    for item in stack {
        match item {
            Item::Sym(s) if s.is_operator("(") => {
                return ParseError::new("unbalanced parenthesis", Some(s.offset));
            }
            Item::Sym(s) if s.is_operator(")") => {
                return ParseError::new("unbalanced parenthesis", Some(s.offset));
            }
            _ => {}
        }
    }

    match stack.last() {
        Some(Item::BopEq(t) | Item::Bop(t)) => ParseError::new(
            format!("expected a value after \"{}\"", t.text),
            Some(t.offset),
        ),
        Some(Item::Uop(t)) => ParseError::new(
            format!("expected an expression after \"{}\"", t.text),
            Some(t.offset),
        ),
        Some(Item::Sym(t)) => {
            ParseError::new(format!("unexpected \"{}\"", t.text), Some(t.offset))
        }
        _ => ParseError::new("syntax error", None),
    }
}
