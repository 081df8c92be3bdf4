//! INSERT query builder module

use super::common::IntoColumns;
use super::{expr, Builder, Expr};
use crate::record::{self, Record};
use crate::{Arg, Buffer, Dialect, Error, IntoArg, IntoArgs, Result, Value};

#[derive(Debug, Clone)]
enum InsertRow {
    Values(Vec<Arg>),
    /// Column/value pairs mapped from a record when it was added
    Record(Vec<(String, Value)>),
}

/// INSERT query builder
#[derive(Debug, Clone, Default)]
pub struct InsertBuilder {
    raw: Option<Expr>,
    table: String,
    columns: Vec<String>,
    rows: Vec<InsertRow>,
    empty_list: Option<&'static str>,
}

/// Start an INSERT into `table`.
///
/// # Examples
/// ```
/// use fjord::{insert_into, Builder, Dialect};
///
/// let stmt = insert_into("users")
///     .columns(("name", "age"))
///     .values(("Ann", 31))
///     .values(("Bob", 42))
///     .to_sql(Dialect::PostgreSql)
///     .unwrap();
/// assert_eq!(
///     stmt.sql,
///     r#"INSERT INTO "users" ("name","age") VALUES ($1,$2), ($3,$4)"#
/// );
/// assert_eq!(stmt.values.len(), 4);
/// ```
pub fn insert_into(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder {
        table: table.into(),
        ..InsertBuilder::default()
    }
}

/// A verbatim INSERT statement with positional arguments.
pub fn insert_by_sql(query: impl Into<String>, args: impl IntoArgs) -> InsertBuilder {
    InsertBuilder {
        raw: Some(expr(query, args)),
        ..InsertBuilder::default()
    }
}

impl InsertBuilder {
    /// Declare the column list
    pub fn columns<C: IntoColumns>(mut self, columns: C) -> Self {
        let columns = columns.into_columns();
        if columns.is_empty() {
            self.empty_list.get_or_insert("INSERT columns");
        }
        self.columns.extend(columns);
        self
    }

    /// Add one VALUES tuple
    pub fn values<V: IntoArgs>(mut self, values: V) -> Self {
        let values = values.into_args();
        if values.is_empty() {
            self.empty_list.get_or_insert("INSERT values");
        }
        self.rows.push(InsertRow::Values(values));
        self
    }

    /// Add one VALUES tuple mapped from a record.
    ///
    /// Columns the record does not have are inserted as NULL. When no column
    /// list is declared, the first record's columns are used.
    pub fn record<R: Record + ?Sized>(mut self, record: &R) -> Self {
        self.rows
            .push(InsertRow::Record(record::column_values(record, true)));
        self
    }

    /// Add one VALUES tuple per record. An empty collection fails the build.
    pub fn records<'r, R, I>(mut self, records: I) -> Self
    where
        R: Record + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        let before = self.rows.len();
        self = records.into_iter().fold(self, |builder, r| builder.record(r));
        if self.rows.len() == before {
            self.empty_list.get_or_insert("INSERT records");
        }
        self
    }

    /// Add a single column and its value to the first tuple
    pub fn pair(mut self, column: impl Into<String>, value: impl IntoArg) -> Self {
        self.columns.push(column.into());
        match self.rows.first_mut() {
            Some(InsertRow::Values(values)) => values.push(value.into_arg()),
            _ => self.rows.push(InsertRow::Values(vec![value.into_arg()])),
        }
        self
    }

    fn resolved_columns(&self) -> Option<Vec<String>> {
        if !self.columns.is_empty() {
            return Some(self.columns.clone());
        }
        self.rows.iter().find_map(|row| match row {
            InsertRow::Record(pairs) if !pairs.is_empty() => {
                Some(pairs.iter().map(|(column, _)| column.clone()).collect())
            }
            _ => None,
        })
    }
}

impl Builder for InsertBuilder {
    fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        if let Some(raw) = &self.raw {
            return raw.build(dialect, buf);
        }

        if self.table.is_empty() {
            return Err(Error::TableNotSpecified {
                statement: "INSERT",
            });
        }
        if let Some(context) = self.empty_list {
            return Err(Error::InvalidSliceLength { context });
        }
        let columns = self.resolved_columns().ok_or(Error::ColumnNotSpecified {
            statement: "INSERT",
        })?;
        if self.rows.is_empty() {
            return Err(Error::InvalidSliceLength {
                context: "INSERT values",
            });
        }

        buf.write_str("INSERT INTO ");
        buf.write_str(&dialect.quote_ident(&self.table));
        buf.write_str(" (");
        let quoted: Vec<String> = columns.iter().map(|c| dialect.quote_ident(c)).collect();
        buf.write_str(&quoted.join(","));
        buf.write_str(") VALUES ");

        let tuple = format!("({})", vec!["?"; columns.len()].join(","));

        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            match row {
                InsertRow::Values(values) => {
                    if values.len() != columns.len() {
                        return Err(Error::ValueCountMismatch {
                            expected: columns.len(),
                            actual: values.len(),
                        });
                    }
                    buf.write_str(&tuple);
                    buf.push_args(values.iter().cloned());
                }
                InsertRow::Record(pairs) => {
                    buf.write_str(&tuple);
                    for column in &columns {
                        let value = pairs
                            .iter()
                            .find(|(name, _)| name == column)
                            .map(|(_, value)| value.clone())
                            .unwrap_or(Value::Null);
                        buf.push_arg(Arg::Value(value));
                    }
                }
            }
        }

        Ok(())
    }
}
