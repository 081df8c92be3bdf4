//! Common types and traits shared across all query builders

use super::condition::Condition;
use super::{Alias, Builder, Expr, Ident, SelectBuilder};
use crate::{Arg, Buffer, Dialect, Result};
use std::sync::Arc;

/// FROM or JOIN target: a plain table name or a nested fragment.
#[derive(Debug, Clone)]
pub enum Table {
    Name(String),
    Fragment(Arc<dyn Builder>),
}

impl Table {
    pub(crate) fn build(&self, dialect: Dialect, buf: &mut Buffer) {
        match self {
            Table::Name(name) => buf.write_str(&dialect.quote_ident(name)),
            Table::Fragment(fragment) => buf.write_placeholder(Arg::Builder(fragment.clone())),
        }
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::Name(name.to_string())
    }
}

impl From<String> for Table {
    fn from(name: String) -> Self {
        Table::Name(name)
    }
}

macro_rules! impl_fragment_from {
    ($target:ident :: $variant:ident, $($ty:ty),*) => {
        $(
            impl From<$ty> for $target {
                fn from(fragment: $ty) -> Self {
                    $target::$variant(Arc::new(fragment))
                }
            }
        )*
    };
}

impl_fragment_from!(Table::Fragment, Ident, Alias, SelectBuilder, Expr);

/// One entry of a SELECT list
#[derive(Debug, Clone)]
pub enum ColumnSelector {
    /// Written verbatim, e.g. `count(*)` or `c AS t2__c`
    Raw(String),
    /// Quoted identifier; dotted names get a `t__col` alias
    Ident(Ident),
    /// Any other fragment, rendered in place of a `?`
    Fragment(Arc<dyn Builder>),
}

impl ColumnSelector {
    pub(crate) fn build(&self, dialect: Dialect, buf: &mut Buffer) {
        match self {
            ColumnSelector::Raw(sql) => buf.write_str(sql),
            ColumnSelector::Ident(ident) => {
                buf.write_str(&dialect.quote_ident(ident.name()));
                if ident.name().contains('.') {
                    buf.write_str(" AS ");
                    buf.write_str(&crate::util::column_name_to_alias(ident.name()));
                }
            }
            ColumnSelector::Fragment(fragment) => {
                buf.write_placeholder(Arg::Builder(fragment.clone()))
            }
        }
    }
}

impl From<&str> for ColumnSelector {
    fn from(sql: &str) -> Self {
        ColumnSelector::Raw(sql.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(sql: String) -> Self {
        ColumnSelector::Raw(sql)
    }
}

impl From<Ident> for ColumnSelector {
    fn from(ident: Ident) -> Self {
        ColumnSelector::Ident(ident)
    }
}

impl_fragment_from!(ColumnSelector::Fragment, Alias, SelectBuilder, Expr);

/// Trait for types that can be turned into a SELECT list
pub trait IntoColumnSelectors {
    fn into_column_selectors(self) -> Vec<ColumnSelector>;
}

macro_rules! impl_single_selector {
    ($($ty:ty),*) => {
        $(
            impl IntoColumnSelectors for $ty {
                fn into_column_selectors(self) -> Vec<ColumnSelector> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_single_selector!(&str, String, Ident, Alias);

impl IntoColumnSelectors for ColumnSelector {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        vec![self]
    }
}

impl<C: Into<ColumnSelector>> IntoColumnSelectors for Vec<C> {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<C: Into<ColumnSelector>, const N: usize> IntoColumnSelectors for [C; N] {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_selector_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<ColumnSelector>),+> IntoColumnSelectors for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_column_selectors(self) -> Vec<ColumnSelector> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_selector_tuple!(A);
impl_selector_tuple!(A, B);
impl_selector_tuple!(A, B, C);
impl_selector_tuple!(A, B, C, D);
impl_selector_tuple!(A, B, C, D, E);
impl_selector_tuple!(A, B, C, D, E, F);
impl_selector_tuple!(A, B, C, D, E, F, G);
impl_selector_tuple!(A, B, C, D, E, F, G, H);

/// Trait for plain column name lists (GROUP BY, INSERT columns)
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>> IntoColumns for Vec<S> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoColumns for [S; N] {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

macro_rules! impl_columns_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<String>),+> IntoColumns for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_columns(self) -> Vec<String> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_columns_tuple!(A, B);
impl_columns_tuple!(A, B, C);
impl_columns_tuple!(A, B, C, D);
impl_columns_tuple!(A, B, C, D, E);
impl_columns_tuple!(A, B, C, D, E, F);

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => write!(f, "JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// A JOIN clause
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: Table,
    pub on: Condition,
}

impl JoinClause {
    pub(crate) fn build(&self, dialect: Dialect, buf: &mut Buffer) -> Result<()> {
        buf.write_str(" ");
        buf.write_str(&self.join_type.to_string());
        buf.write_str(" ");
        self.table.build(dialect, buf);
        buf.write_str(" ON ");
        self.on.build(dialect, buf)
    }
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// ORDER BY clause; the column is written verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderByClause {
    pub(crate) fn build(&self, buf: &mut Buffer) {
        buf.write_str(&self.column);
        buf.write_str(" ");
        buf.write_str(&self.direction.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ident;

    #[test]
    fn test_ident_selector_gets_default_alias() {
        let mut buf = Buffer::new();
        ColumnSelector::from(ident("t1.a")).build(Dialect::MySql, &mut buf);
        assert_eq!(buf.as_str(), "`t1`.`a` AS t1__a");

        let mut buf = Buffer::new();
        ColumnSelector::from(ident("a")).build(Dialect::PostgreSql, &mut buf);
        assert_eq!(buf.as_str(), "\"a\"");
    }

    #[test]
    fn test_into_columns() {
        assert_eq!(("a", "b").into_columns(), vec!["a", "b"]);
        assert_eq!(vec!["a".to_string()].into_columns(), vec!["a"]);
        assert_eq!(["x", "y", "z"].into_columns().len(), 3);
    }

    #[test]
    fn test_join_and_order_rendering() {
        let join = JoinClause {
            join_type: JoinType::Left,
            table: Table::from("table2"),
            on: crate::builder::condition::Condition::Expr(crate::builder::expr(
                "table.a1 = table.a2",
                (),
            )),
        };
        let mut buf = Buffer::new();
        join.build(Dialect::MySql, &mut buf).unwrap();
        assert_eq!(buf.as_str(), " LEFT JOIN `table2` ON table.a1 = table.a2");

        let mut buf = Buffer::new();
        OrderByClause {
            column: "f".into(),
            direction: SortDirection::Desc,
        }
        .build(&mut buf);
        assert_eq!(buf.as_str(), "f DESC");
    }
}
