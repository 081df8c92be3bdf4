//! SELECT query builder implementation

use super::common::{
    ColumnSelector, IntoColumnSelectors, IntoColumns, JoinClause, JoinType, OrderByClause,
    SortDirection, Table,
};
use super::condition::{Condition, IntoCondition};
use super::{expr, Alias, Builder, Expr};
use crate::{Arg, Buffer, Dialect, Error, IntoArgs, Result};

/// SELECT query builder
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    raw: Option<Expr>,
    distinct: bool,
    columns: Vec<ColumnSelector>,
    table: Option<Table>,
    joins: Vec<JoinClause>,
    where_conditions: Vec<Condition>,
    group_by: Vec<String>,
    having_conditions: Vec<Condition>,
    order_by: Vec<OrderByClause>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Start a SELECT with the given projection.
///
/// # Examples
/// ```
/// use fjord::{select, eq, Builder, Dialect};
///
/// let stmt = select(("a", "b"))
///     .from("table")
///     .where_(eq("c", 1))
///     .order_asc("d")
///     .to_sql(Dialect::MySql)
///     .unwrap();
/// assert_eq!(stmt.sql, "SELECT a, b FROM `table` WHERE (`c` = ?) ORDER BY d ASC");
/// ```
pub fn select<C: IntoColumnSelectors>(columns: C) -> SelectBuilder {
    SelectBuilder {
        columns: columns.into_column_selectors(),
        ..SelectBuilder::default()
    }
}

/// A verbatim SELECT statement with positional arguments.
pub fn select_by_sql(query: impl Into<String>, args: impl IntoArgs) -> SelectBuilder {
    SelectBuilder {
        raw: Some(expr(query, args)),
        ..SelectBuilder::default()
    }
}

impl SelectBuilder {
    /// Add more columns to the projection
    pub fn columns<C: IntoColumnSelectors>(mut self, columns: C) -> Self {
        self.columns.extend(columns.into_column_selectors());
        self
    }

    /// Make this a SELECT DISTINCT query
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set the FROM target: a table name, an aliased identifier or a subquery
    pub fn from<T: Into<Table>>(mut self, table: T) -> Self {
        self.table = Some(table.into());
        self
    }

    fn push_join<T, C>(mut self, join_type: JoinType, table: T, on: C) -> Self
    where
        T: Into<Table>,
        C: IntoCondition,
    {
        self.joins.push(JoinClause {
            join_type,
            table: table.into(),
            on: on.into_condition(),
        });
        self
    }

    /// Add an inner JOIN
    pub fn join<T: Into<Table>, C: IntoCondition>(self, table: T, on: C) -> Self {
        self.push_join(JoinType::Inner, table, on)
    }

    /// Add a LEFT JOIN
    pub fn left_join<T: Into<Table>, C: IntoCondition>(self, table: T, on: C) -> Self {
        self.push_join(JoinType::Left, table, on)
    }

    /// Add a RIGHT JOIN
    pub fn right_join<T: Into<Table>, C: IntoCondition>(self, table: T, on: C) -> Self {
        self.push_join(JoinType::Right, table, on)
    }

    /// Add a FULL JOIN
    pub fn full_join<T: Into<Table>, C: IntoCondition>(self, table: T, on: C) -> Self {
        self.push_join(JoinType::Full, table, on)
    }

    /// Add a WHERE condition; multiple conditions are AND-combined
    pub fn where_<C: IntoCondition>(mut self, condition: C) -> Self {
        self.where_conditions.push(condition.into_condition());
        self
    }

    /// Add GROUP BY columns, written verbatim
    pub fn group_by<C: IntoColumns>(mut self, columns: C) -> Self {
        self.group_by.extend(columns.into_columns());
        self
    }

    /// Add a HAVING condition; multiple conditions are AND-combined
    pub fn having<C: IntoCondition>(mut self, condition: C) -> Self {
        self.having_conditions.push(condition.into_condition());
        self
    }

    /// Add an ORDER BY clause
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderByClause {
            column: column.into(),
            direction,
        });
        self
    }

    /// Add ORDER BY column ASC
    pub fn order_asc(self, column: impl Into<String>) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Add ORDER BY column DESC
    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Set LIMIT; zero omits the clause
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET; zero omits the clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// LIMIT/OFFSET for a one-based page number
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    /// Use this query as an aliased subquery: `(SELECT ...) AS alias`
    pub fn as_alias(self, alias: impl Into<String>) -> Alias {
        Alias::new(Arg::builder(self), alias)
    }
}

impl Builder for SelectBuilder {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }

        if self.columns.is_empty() {
            return Err(Error::ColumnNotSpecified {
                statement: "SELECT",
            });
        }

        buf.write_str("SELECT ");
        if self.distinct {
            buf.write_str("DISTINCT ");
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            column.build(dialect, buf);
        }

        if let Some(table) = &self.table {
            buf.write_str(" FROM ");
            table.build(dialect, buf);
            for join in &self.joins {
                join.build(dialect, buf)?;
            }
        }

        Condition::write_clause(" WHERE ", &self.where_conditions, dialect, buf)?;

        if !self.group_by.is_empty() {
            buf.write_str(" GROUP BY ");
            buf.write_str(&self.group_by.join(", "));
        }

        Condition::write_clause(" HAVING ", &self.having_conditions, dialect, buf)?;

        if !self.order_by.is_empty() {
            buf.write_str(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    buf.write_str(", ");
                }
                order.build(buf);
            }
        }

        if let Some(limit) = self.limit.filter(|n| *n > 0) {
            buf.write_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset.filter(|n| *n > 0) {
            buf.write_str(&format!(" OFFSET {offset}"));
        }

        Ok(())
    }

    fn is_subquery(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::condition::eq;
    use crate::builder::ident;
    use crate::Value;
    use pretty_assertions::assert_eq;

    fn render(builder: &SelectBuilder, dialect: Dialect) -> Buffer {
        let mut buf = Buffer::new();
        builder.build(dialect, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_basic_select() {
        let query = select(("a", "b"))
            .from("table")
            .where_(eq("c", 1))
            .order_asc("d");
        let buf = render(&query, Dialect::MySql);
        assert_eq!(
            buf.as_str(),
            "SELECT a, b FROM `table` WHERE (`c` = ?) ORDER BY d ASC"
        );
        assert_eq!(buf.args(), &[Arg::Value(Value::I32(1))]);
    }

    #[test]
    fn test_full_clause_order() {
        let query = select(("a", "b"))
            .distinct()
            .from(select("a").from("table"))
            .left_join("table2", "table.a1 = table.a2")
            .where_(eq("c", 1))
            .group_by("d")
            .having(eq("e", 2))
            .order_asc("f")
            .limit(3)
            .offset(4);
        let buf = render(&query, Dialect::MySql);
        assert_eq!(
            buf.as_str(),
            "SELECT DISTINCT a, b FROM ? LEFT JOIN `table2` ON table.a1 = table.a2 \
             WHERE (`c` = ?) GROUP BY d HAVING (`e` = ?) ORDER BY f ASC LIMIT 3 OFFSET 4"
        );
        assert_eq!(buf.args().len(), 3);
    }

    #[test]
    fn test_alias_columns() {
        let query = select((ident("t1.a"), ident("t2.b").as_alias("t2__b"), "c AS t2__c"))
            .from(ident("table1").as_alias("t1"))
            .left_join(ident("table2").as_alias("t2"), "t1.id = t2.id");

        let buf = render(&query, Dialect::MySql);
        assert_eq!(
            buf.as_str(),
            "SELECT `t1`.`a` AS t1__a, ?, c AS t2__c FROM ? LEFT JOIN ? ON t1.id = t2.id"
        );
        assert_eq!(buf.args().len(), 3);

        let buf = render(&query, Dialect::PostgreSql);
        assert_eq!(
            buf.as_str(),
            "SELECT \"t1\".\"a\" AS t1__a, ?, c AS t2__c FROM ? LEFT JOIN ? ON t1.id = t2.id"
        );
    }

    #[test]
    fn test_zero_limit_and_offset_are_omitted() {
        let buf = render(&select("*").from("t").limit(0).offset(0), Dialect::MySql);
        assert_eq!(buf.as_str(), "SELECT * FROM `t`");

        let buf = render(&select("*").from("t").paginate(3, 20), Dialect::MySql);
        assert_eq!(buf.as_str(), "SELECT * FROM `t` LIMIT 20 OFFSET 40");

        let buf = render(&select("*").from("t").paginate(1, 20), Dialect::MySql);
        assert_eq!(buf.as_str(), "SELECT * FROM `t` LIMIT 20");
    }

    #[test]
    fn test_joins() {
        let buf = render(
            &select("*")
                .from("a")
                .join("b", "a.id = b.a_id")
                .right_join("c", "c.id = b.c_id")
                .full_join("d", eq("d.flag", true)),
            Dialect::PostgreSql,
        );
        assert_eq!(
            buf.as_str(),
            "SELECT * FROM \"a\" JOIN \"b\" ON a.id = b.a_id RIGHT JOIN \"c\" ON c.id = b.c_id \
             FULL JOIN \"d\" ON \"d\".\"flag\" = ?"
        );
    }

    #[test]
    fn test_empty_projection_fails() {
        let mut buf = Buffer::new();
        let err = select(Vec::<&str>::new()).from("t").build(Dialect::MySql, &mut buf);
        assert!(matches!(
            err,
            Err(Error::ColumnNotSpecified { statement: "SELECT" })
        ));
    }

    #[test]
    fn test_select_by_sql() {
        let buf = render(
            &select_by_sql("SELECT * FROM t WHERE id = ? AND name = ?", (1, "x")),
            Dialect::MySql,
        );
        assert_eq!(buf.as_str(), "SELECT * FROM t WHERE id = ? AND name = ?");
        assert_eq!(buf.args().len(), 2);

        let mut buf = Buffer::new();
        let err = select_by_sql("SELECT * FROM t WHERE id = ?", ()).build(Dialect::MySql, &mut buf);
        assert!(matches!(err, Err(Error::PlaceholderCount { .. })));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let query = select(("a", ident("t.b")))
            .from("t")
            .where_(eq("x", vec![1, 2]))
            .order_desc("a");
        for dialect in [Dialect::MySql, Dialect::PostgreSql] {
            let first = render(&query, dialect);
            let second = render(&query, dialect);
            assert_eq!(first.as_str(), second.as_str());
            assert_eq!(first.args(), second.args());
        }
    }
}
