//! Comparison operators.
//!
//! Every field condition in a query carries one of these operators. Negation
//! pushdown replaces an operator with its inverse rather than wrapping the
//! condition in a NOT node.

/// A comparison operator attached to a field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Field equals value (`:` or `=`).
    Equals,
    /// Field does not equal value (`!=`, or `:`/`=` under negation).
    NotEquals,
    /// Field is greater than value (`>`).
    GreaterThan,
    /// Field is greater than or equal to value (`>=`).
    GreaterThanOrEquals,
    /// Field is less than value (`<`).
    LessThan,
    /// Field is less than or equal to value (`<=`).
    LessThanOrEquals,
}

/// The wildcard value, matching anything.
pub const WILDCARD: &str = "*";

impl Operator {
    /// Returns the operator that accepts exactly the values this one rejects.
    ///
    /// `inverse` is an involution: `op.inverse().inverse() == op`.
    pub fn inverse(self) -> Self {
        match self {
            Self::Equals => Self::NotEquals,
            Self::NotEquals => Self::Equals,
            Self::GreaterThan => Self::LessThanOrEquals,
            Self::GreaterThanOrEquals => Self::LessThan,
            Self::LessThan => Self::GreaterThanOrEquals,
            Self::LessThanOrEquals => Self::GreaterThan,
        }
    }

    /// Parses a source-syntax comparison symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ":" | "=" => Some(Self::Equals),
            "!=" => Some(Self::NotEquals),
            ">" => Some(Self::GreaterThan),
            ">=" => Some(Self::GreaterThanOrEquals),
            "<" => Some(Self::LessThan),
            "<=" => Some(Self::LessThanOrEquals),
            _ => None,
        }
    }

    /// The operator's key in result-view mappings.
    pub fn term_key(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEquals => "greaterThanOrEquals",
            Self::LessThan => "lessThan",
            Self::LessThanOrEquals => "lessThanOrEquals",
        }
    }

    /// Returns the source-syntax symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => ":",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEquals => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEquals => "<=",
        }
    }

    /// Renders `property <op> value` in source syntax.
    ///
    /// `NotEquals` renders in the keyword form (`NOT property:value`) so the
    /// output is always re-parseable.
    pub fn format(self, property: &str, value: &str) -> String {
        match self {
            Self::NotEquals => format!("NOT {property}:{value}"),
            op => format!("{property}{}{value}", op.symbol()),
        }
    }
}
