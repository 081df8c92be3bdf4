//! DELETE query builder module

use super::condition::{Condition, IntoCondition};
use super::{expr, Builder, Expr};
use crate::{Buffer, Dialect, Error, IntoArgs, Result};

/// DELETE query builder
#[derive(Debug, Clone, Default)]
pub struct DeleteBuilder {
    raw: Option<Expr>,
    table: String,
    where_conditions: Vec<Condition>,
}

/// Start a DELETE from `table`.
pub fn delete_from(table: impl Into<String>) -> DeleteBuilder {
    DeleteBuilder {
        table: table.into(),
        ..DeleteBuilder::default()
    }
}

/// A verbatim DELETE statement with positional arguments.
pub fn delete_by_sql(query: impl Into<String>, args: impl IntoArgs) -> DeleteBuilder {
    DeleteBuilder {
        raw: Some(expr(query, args)),
        ..DeleteBuilder::default()
    }
}

impl DeleteBuilder {
    /// Add a WHERE condition; multiple conditions are AND-combined
    pub fn where_<C: IntoCondition>(mut self, condition: C) -> Self {
        self.where_conditions.push(condition.into_condition());
        self
    }
}

impl Builder for DeleteBuilder {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }

        if self.table.is_empty() {
            return Err(Error::TableNotSpecified {
                statement: "DELETE",
            });
        }

        buf.write_str("DELETE FROM ");
        buf.write_str(&dialect.quote_ident(&self.table));
        Condition::write_clause(" WHERE ", &self.where_conditions, dialect, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::condition::{eq, or};

    fn render(builder: &DeleteBuilder) -> Result<String> {
        let mut buf = Buffer::new();
        builder.build(Dialect::MySql, &mut buf)?;
        Ok(buf.to_string())
    }

    #[test]
    fn test_delete() {
        assert_eq!(render(&delete_from("t")).unwrap(), "DELETE FROM `t`");
        assert_eq!(
            render(&delete_from("t").where_(eq("a", 1)).where_(or([eq("b", 2), eq("b", 3)])))
                .unwrap(),
            "DELETE FROM `t` WHERE (`a` = ?) AND ((`b` = ?) OR (`b` = ?))"
        );
    }

    #[test]
    fn test_delete_requires_table() {
        assert!(matches!(
            render(&delete_from("")),
            Err(Error::TableNotSpecified { statement: "DELETE" })
        ));
    }

    #[test]
    fn test_delete_by_sql() {
        assert_eq!(
            render(&delete_by_sql("DELETE FROM t WHERE id = ?", (5,))).unwrap(),
            "DELETE FROM t WHERE id = ?"
        );
    }
}
