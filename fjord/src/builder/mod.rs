//! Query builder module
//!
//! Every renderable piece of SQL implements [`Builder`]: it writes its text
//! into a [`Buffer`] and pushes one argument per `?` it writes. Statements,
//! conditions, identifiers and raw expressions all compose through that one
//! method.

pub mod common;
pub mod condition;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

use crate::interpolate::{Interpolator, Mode, Statement};
use crate::{Arg, Buffer, Dialect, Error, IntoArg, IntoArgs, Result};
use std::fmt;

// Re-export types from submodules
pub use common::{ColumnSelector, IntoColumnSelectors, IntoColumns, JoinType, SortDirection, Table};
pub use condition::{Condition, IntoCondition};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::{IntoUpdateData, UpdateBuilder};

/// A renderable SQL fragment.
pub trait Builder: fmt::Debug + Send + Sync {
    /// Append this fragment's SQL and arguments to `buf`.
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()>;

    /// Whether the fragment is parenthesized when it stands in for a `?`.
    fn is_subquery(&self) -> bool {
        false
    }

    /// Render with driver placeholders and the values to bind to them.
    fn to_sql(&self, dialect: Dialect) -> Result<Statement>
    where
        Self: Sized,
    {
        Interpolator::new(dialect)
            .mode(Mode::Placeholders)
            .interpolate(self)
    }
}

pub(crate) fn count_placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

/// Raw SQL with positional `?` arguments.
#[derive(Debug, Clone)]
pub struct Expr {
    query: String,
    args: Vec<Arg>,
}

/// Create a raw SQL expression.
///
/// A single array or vector argument must be wrapped in a one-element tuple,
/// otherwise its elements are taken as separate arguments:
/// `expr("id IN ?", (vec![1, 2, 3],))`.
pub fn expr(query: impl Into<String>, args: impl IntoArgs) -> Expr {
    Expr {
        query: query.into(),
        args: args.into_args(),
    }
}

impl Expr {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl Builder for Expr {
    fn build(&self, _dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        let expected = count_placeholders(&self.query);
        if expected != self.args.len() {
            return Err(Error::placeholder_count(
                self.query.clone(),
                expected,
                self.args.len(),
            ));
        }
        buf.write_str(&self.query);
        buf.push_args(self.args.iter().cloned());
        Ok(())
    }
}

/// A quoted identifier, optionally dotted (`table.column`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

/// Create a quoted identifier.
pub fn ident(name: impl Into<String>) -> Ident {
    Ident(name.into())
}

impl Ident {
    pub fn name(&self) -> &str {
        &self.0
    }

    /// `ident AS alias`, with the alias quoted as well.
    pub fn as_alias(self, alias: impl Into<String>) -> Alias {
        Alias::new(Arg::builder(self), alias)
    }
}

impl Builder for Ident {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        buf.write_str(&dialect.quote_ident(&self.0));
        Ok(())
    }
}

/// `<expr> AS <alias>`
#[derive(Debug, Clone)]
pub struct Alias {
    expr: Arg,
    alias: String,
}

impl Alias {
    pub fn new(expr: Arg, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: alias.into(),
        }
    }
}

impl Builder for Alias {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        buf.write_placeholder(self.expr.clone());
        buf.write_str(" AS ");
        buf.write_str(&dialect.quote_ident(&self.alias));
        Ok(())
    }
}

macro_rules! impl_into_arg_for_builder {
    ($($ty:ty),*) => {
        $(
            impl IntoArg for $ty {
                fn into_arg(self) -> Arg {
                    Arg::builder(self)
                }
            }
        )*
    };
}

impl_into_arg_for_builder!(Expr, Ident, Alias, Condition, SelectBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn render(builder: &dyn Builder, dialect: Dialect) -> Result<Buffer> {
        let mut buf = Buffer::new();
        builder.build(dialect, &mut buf)?;
        Ok(buf)
    }

    #[test]
    fn test_expr_renders_verbatim() {
        let buf = render(&expr("a = ? AND b = ?", (1, "x")), Dialect::MySql).unwrap();
        assert_eq!(buf.as_str(), "a = ? AND b = ?");
        assert_eq!(
            buf.args(),
            &[
                Arg::Value(Value::I32(1)),
                Arg::Value(Value::String("x".into()))
            ]
        );
    }

    #[test]
    fn test_expr_placeholder_count_mismatch() {
        for (query, args) in [
            ("a = ?", vec![]),
            ("a = ? AND b = ?", vec![1]),
            ("no markers", vec![1, 2]),
        ] {
            let err = render(&expr(query, args.clone()), Dialect::MySql).unwrap_err();
            match err {
                Error::PlaceholderCount {
                    expected, actual, ..
                } => {
                    assert_eq!(expected, count_placeholders(query));
                    assert_eq!(actual, args.len());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_ident_and_alias() {
        let buf = render(&ident("t1.a"), Dialect::PostgreSql).unwrap();
        assert_eq!(buf.as_str(), "\"t1\".\"a\"");

        let buf = render(&ident("table1").as_alias("t1"), Dialect::MySql).unwrap();
        assert_eq!(buf.as_str(), "? AS `t1`");
        assert_eq!(buf.args().len(), 1);
    }
}
