//! WHERE / HAVING / ON conditions

use super::{Builder, Expr};
use crate::{Arg, Buffer, Dialect, IntoArg, IntoOperator, Operator, Result, Value};

/// How grouped conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
}

impl WhereConnector {
    fn as_str(self) -> &'static str {
        match self {
            WhereConnector::And => "AND",
            WhereConnector::Or => "OR",
        }
    }
}

/// A boolean SQL condition.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `column OP ?`
    Compare {
        column: String,
        operator: Operator,
        value: Arg,
    },
    /// Parenthesized children joined by AND/OR
    Group {
        connector: WhereConnector,
        conditions: Vec<Condition>,
    },
    /// Raw SQL with its own arguments
    Expr(Expr),
}

impl Condition {
    pub fn compare(column: impl Into<String>, operator: impl IntoOperator, value: impl IntoArg) -> Self {
        Condition::Compare {
            column: column.into(),
            operator: operator.into_operator(),
            value: value.into_arg(),
        }
    }

    /// Write `(c1) AND (c2) ...`; nothing for an empty list.
    pub(crate) fn write_joined(
        conditions: &[Condition],
        connector: WhereConnector,
        dialect: Dialect,
        buf: &mut Buffer,
    ) -> Result<()> {
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                buf.write_str(" ");
                buf.write_str(connector.as_str());
                buf.write_str(" ");
            }
            buf.write_str("(");
            condition.build(dialect, buf)?;
            buf.write_str(")");
        }
        Ok(())
    }

    /// Write ` <keyword> (c1) AND (c2)` unless the list is empty.
    pub(crate) fn write_clause(
        keyword: &str,
        conditions: &[Condition],
        dialect: Dialect,
        buf: &mut Buffer,
    ) -> Result<()> {
        if conditions.is_empty() {
            return Ok(());
        }
        buf.write_str(keyword);
        Self::write_joined(conditions, WhereConnector::And, dialect, buf)
    }

    fn build_compare(
        column: &str,
        operator: Operator,
        value: &Arg,
        dialect: Dialect,
        buf: &mut Buffer,
    ) -> Result<()> {
        let negated = match operator {
            Operator::Eq => false,
            Operator::Neq => true,
            _ => return Self::write_compare(column, operator, value, dialect, buf),
        };

        match value {
            Arg::Value(Value::Null) => {
                buf.write_str(&dialect.quote_ident(column));
                buf.write_str(if negated { " IS NOT NULL" } else { " IS NULL" });
                Ok(())
            }
            // `x IN ()` is not valid SQL; an empty set matches nothing.
            Arg::Value(Value::Array(items)) if items.is_empty() => {
                buf.write_str(dialect.encode_bool(negated));
                Ok(())
            }
            Arg::Value(Value::Array(_)) => {
                let operator = if negated { Operator::NotIn } else { Operator::In };
                Self::write_compare(column, operator, value, dialect, buf)
            }
            _ => Self::write_compare(column, operator, value, dialect, buf),
        }
    }

    fn write_compare(
        column: &str,
        operator: Operator,
        value: &Arg,
        dialect: Dialect,
        buf: &mut Buffer,
    ) -> Result<()> {
        buf.write_str(&dialect.quote_ident(column));
        buf.write_str(" ");
        buf.write_str(operator.as_str());
        buf.write_str(" ");
        buf.write_placeholder(value.clone());
        Ok(())
    }
}

impl Builder for Condition {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        match self {
            Condition::Compare {
                column,
                operator,
                value,
            } => Self::build_compare(column, *operator, value, dialect, buf),
            Condition::Group {
                connector,
                conditions,
            } => Self::write_joined(conditions, *connector, dialect, buf),
            Condition::Expr(expr) => expr.build(dialect, buf),
        }
    }
}

/// `column = value`; NULL becomes `IS NULL`, arrays become `IN`.
pub fn eq(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Eq, value)
}

/// `column != value`; NULL becomes `IS NOT NULL`, arrays become `NOT IN`.
pub fn neq(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Neq, value)
}

pub fn gt(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Gt, value)
}

pub fn gte(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Gte, value)
}

pub fn lt(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Lt, value)
}

pub fn lte(column: impl Into<String>, value: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Lte, value)
}

pub fn like(column: impl Into<String>, pattern: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::Like, pattern)
}

pub fn not_like(column: impl Into<String>, pattern: impl IntoArg) -> Condition {
    Condition::compare(column, Operator::NotLike, pattern)
}

/// `(c1) AND (c2) ...`
pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Group {
        connector: WhereConnector::And,
        conditions: conditions.into_iter().collect(),
    }
}

/// `(c1) OR (c2) ...`
pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Group {
        connector: WhereConnector::Or,
        conditions: conditions.into_iter().collect(),
    }
}

/// Trait for conditions that can be used in WHERE, HAVING and ON clauses
pub trait IntoCondition {
    fn into_condition(self) -> Condition;
}

impl IntoCondition for Condition {
    fn into_condition(self) -> Condition {
        self
    }
}

impl IntoCondition for Expr {
    fn into_condition(self) -> Condition {
        Condition::Expr(self)
    }
}

/// Raw SQL without arguments: `where_("deleted_at IS NULL")`
impl IntoCondition for &str {
    fn into_condition(self) -> Condition {
        Condition::Expr(super::expr(self, ()))
    }
}

impl IntoCondition for String {
    fn into_condition(self) -> Condition {
        Condition::Expr(super::expr(self, ()))
    }
}

// Shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: IntoArg,
{
    fn into_condition(self) -> Condition {
        eq(self.0, self.1)
    }
}

// Explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: IntoArg,
    O: IntoOperator,
{
    fn into_condition(self) -> Condition {
        Condition::compare(self.0, self.1, self.2)
    }
}
