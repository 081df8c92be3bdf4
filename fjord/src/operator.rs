//! Comparison operators used by conditions

use std::fmt;

/// A binary comparison between a column and a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    /// Written verbatim, e.g. `@>` or `ILIKE`
    Custom(&'static str),
}

impl Operator {
    /// Create a database-specific operator
    ///
    /// # Examples
    /// ```
    /// use fjord::Operator;
    ///
    /// let contains = Operator::custom("@>");
    /// assert_eq!(contains.as_str(), "@>");
    /// ```
    pub const fn custom(op: &'static str) -> Self {
        Operator::Custom(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Custom(op) => op,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything usable as the operator of `(column, op, value)` conditions.
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

/// Known spellings map onto their variant; anything else becomes
/// [`Operator::Custom`].
impl IntoOperator for &'static str {
    fn into_operator(self) -> Operator {
        let known = [
            Operator::Eq,
            Operator::Neq,
            Operator::Gt,
            Operator::Gte,
            Operator::Lt,
            Operator::Lte,
            Operator::Like,
            Operator::NotLike,
            Operator::In,
            Operator::NotIn,
        ];
        if self == "<>" {
            return Operator::Neq;
        }
        known
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(self))
            .unwrap_or(Operator::Custom(self))
    }
}

/// Operator constants for tuple conditions: `("age", op::GT, 18)`
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::Eq;
    pub const NEQ: Operator = Operator::Neq;
    pub const GT: Operator = Operator::Gt;
    pub const GTE: Operator = Operator::Gte;
    pub const LT: Operator = Operator::Lt;
    pub const LTE: Operator = Operator::Lte;
    pub const LIKE: Operator = Operator::Like;
    pub const NOT_LIKE: Operator = Operator::NotLike;
    pub const IN: Operator = Operator::In;
    pub const NOT_IN: Operator = Operator::NotIn;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        assert_eq!(op::GT.as_str(), ">");
        assert_eq!(Operator::NotIn.to_string(), "NOT IN");
        assert_eq!(Operator::custom("@@").to_string(), "@@");
    }

    #[test]
    fn test_parse_known_spellings() {
        assert_eq!(">=".into_operator(), Operator::Gte);
        assert_eq!("<>".into_operator(), Operator::Neq);
        assert_eq!("not like".into_operator(), Operator::NotLike);
        assert_eq!("In".into_operator(), Operator::In);
    }

    #[test]
    fn test_unknown_spelling_is_custom() {
        assert_eq!("@>".into_operator(), Operator::Custom("@>"));
    }
}
