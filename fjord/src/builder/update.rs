//! UPDATE query builder module

use super::condition::{Condition, IntoCondition};
use super::{expr, Builder, Expr};
use crate::{Arg, Buffer, Dialect, Error, IntoArg, IntoArgs, Result, Value};
use std::collections::BTreeMap;

/// UPDATE query builder
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    raw: Option<Expr>,
    table: String,
    set_clauses: Vec<(String, Arg)>,
    where_conditions: Vec<Condition>,
}

/// Start an UPDATE of `table`.
///
/// # Examples
/// ```
/// use fjord::{update, eq, Builder, Dialect};
///
/// let stmt = update("users")
///     .set("name", "Jane")
///     .set("age", 25)
///     .where_(eq("id", 7))
///     .to_sql(Dialect::MySql)
///     .unwrap();
/// assert_eq!(stmt.sql, "UPDATE `users` SET `name` = ?, `age` = ? WHERE (`id` = ?)");
/// ```
pub fn update(table: impl Into<String>) -> UpdateBuilder {
    UpdateBuilder {
        table: table.into(),
        ..UpdateBuilder::default()
    }
}

/// A verbatim UPDATE statement with positional arguments.
pub fn update_by_sql(query: impl Into<String>, args: impl IntoArgs) -> UpdateBuilder {
    UpdateBuilder {
        raw: Some(expr(query, args)),
        ..UpdateBuilder::default()
    }
}

impl UpdateBuilder {
    /// Set one column; assignments render in call order
    pub fn set(mut self, column: impl Into<String>, value: impl IntoArg) -> Self {
        self.set_clauses.push((column.into(), value.into_arg()));
        self
    }

    /// Set several columns at once
    pub fn set_map<T: IntoUpdateData>(mut self, data: T) -> Self {
        self.set_clauses.extend(
            data.into_update_data()
                .into_iter()
                .map(|(column, value)| (column, Arg::Value(value))),
        );
        self
    }

    /// Add a WHERE condition; multiple conditions are AND-combined
    pub fn where_<C: IntoCondition>(mut self, condition: C) -> Self {
        self.where_conditions.push(condition.into_condition());
        self
    }
}

impl Builder for UpdateBuilder {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }

        if self.table.is_empty() {
            return Err(Error::TableNotSpecified {
                statement: "UPDATE",
            });
        }
        if self.set_clauses.is_empty() {
            return Err(Error::ColumnNotSpecified {
                statement: "UPDATE",
            });
        }

        buf.write_str("UPDATE ");
        buf.write_str(&dialect.quote_ident(&self.table));
        buf.write_str(" SET ");
        for (i, (column, value)) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_str(&dialect.quote_ident(column));
            buf.write_str(" = ");
            buf.write_placeholder(value.clone());
        }

        Condition::write_clause(" WHERE ", &self.where_conditions, dialect, buf)
    }
}

/// Trait for types that can be converted to UPDATE data
pub trait IntoUpdateData {
    fn into_update_data(self) -> Vec<(String, Value)>;
}

impl IntoUpdateData for BTreeMap<String, Value> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter().collect()
    }
}

impl<S: Into<String>, V: Into<Value>> IntoUpdateData for Vec<(S, V)> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect()
    }
}
