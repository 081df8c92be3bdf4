//! Rendering a builder tree to executable SQL
//!
//! The interpolator walks the `?` markers of a rendered [`Buffer`] left to
//! right. Nested builders are rendered in place (parenthesized when they are
//! subqueries) and plain values are either replaced by driver placeholders
//! or folded into the text as escaped literals, depending on [`Mode`].

use crate::builder::count_placeholders;
use crate::{Arg, Buffer, Builder, Dialect, Error, IntoArgs, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How bound values end up in the final statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Keep driver placeholders and return the values to bind
    Placeholders,
    /// Encode every value as a literal in the SQL text
    Literal,
}

/// Interpolation settings, usually shared by every statement of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateOptions {
    pub mode: Mode,
    /// Bind byte payloads as parameters even in literal mode
    pub ignore_binary: bool,
}

impl Default for InterpolateOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Literal,
            ignore_binary: true,
        }
    }
}

/// Final SQL text and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Renders builders for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    dialect: Dialect,
    options: InterpolateOptions,
}

impl Interpolator {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_options(dialect, InterpolateOptions::default())
    }

    pub fn with_options(dialect: Dialect, options: InterpolateOptions) -> Self {
        Self { dialect, options }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn ignore_binary(mut self, ignore_binary: bool) -> Self {
        self.options.ignore_binary = ignore_binary;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> InterpolateOptions {
        self.options
    }

    /// Render a builder and resolve all of its arguments.
    pub fn interpolate<B: Builder + ?Sized>(&self, builder: &B) -> Result<Statement> {
        let mut buf = Buffer::new();
        builder.build(self.dialect, &mut buf)?;
        self.interpolate_buffer(&buf)
    }

    /// Resolve the arguments of an already rendered buffer.
    pub fn interpolate_buffer(&self, buf: &Buffer) -> Result<Statement> {
        let mut out = Statement::default();
        self.write_sql(buf.as_str(), buf.args(), &mut out)?;
        Ok(out)
    }

    fn write_sql(&self, sql: &str, args: &[Arg], out: &mut Statement) -> Result<()> {
        let expected = count_placeholders(sql);
        if expected != args.len() {
            return Err(Error::placeholder_count(sql, expected, args.len()));
        }

        let mut args = args.iter();
        let mut rest = sql;
        while let Some(pos) = rest.find('?') {
            out.sql.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];
            match args.next() {
                Some(arg) => self.write_arg(arg, out)?,
                None => return Err(Error::placeholder_count(sql, expected, 0)),
            }
        }
        out.sql.push_str(rest);
        Ok(())
    }

    fn write_arg(&self, arg: &Arg, out: &mut Statement) -> Result<()> {
        match arg {
            Arg::Builder(builder) => {
                let mut buf = Buffer::new();
                builder.build(self.dialect, &mut buf)?;
                let subquery = builder.is_subquery();
                if subquery {
                    out.sql.push('(');
                }
                self.write_sql(buf.as_str(), buf.args(), out)?;
                if subquery {
                    out.sql.push(')');
                }
                Ok(())
            }
            Arg::Value(value) => self.write_value(value, out),
        }
    }

    fn write_value(&self, value: &Value, out: &mut Statement) -> Result<()> {
        if let Value::Array(items) = value {
            if items.is_empty() {
                return Err(Error::InvalidSliceLength {
                    context: "empty array argument",
                });
            }
            out.sql.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.sql.push(',');
                }
                self.write_value(item, out)?;
            }
            out.sql.push(')');
            return Ok(());
        }

        match self.options.mode {
            Mode::Placeholders => {
                self.bind(value, out);
                Ok(())
            }
            Mode::Literal => self.write_literal(value, out),
        }
    }

    fn bind(&self, value: &Value, out: &mut Statement) {
        out.sql.push_str(&self.dialect.placeholder(out.values.len()));
        out.values.push(value.clone());
    }

    fn write_literal(&self, value: &Value, out: &mut Statement) -> Result<()> {
        let dialect = self.dialect;
        match value {
            Value::Null => out.sql.push_str("NULL"),
            Value::Bool(b) => out.sql.push_str(dialect.encode_bool(*b)),
            Value::I32(n) => out.sql.push_str(&n.to_string()),
            Value::I64(n) => out.sql.push_str(&n.to_string()),
            Value::U64(n) => out.sql.push_str(&n.to_string()),
            Value::F32(f) if f.is_finite() => out.sql.push_str(&f.to_string()),
            Value::F64(f) if f.is_finite() => out.sql.push_str(&f.to_string()),
            Value::F32(_) | Value::F64(_) => {
                return Err(Error::not_supported("non-finite float literal"))
            }
            Value::String(s) => out.sql.push_str(&dialect.encode_string(s)),
            Value::Time(t) => out.sql.push_str(&dialect.encode_time(t)),
            Value::Bytes(b) if self.options.ignore_binary => {
                trace!(len = b.len(), "binding binary value instead of encoding it");
                self.bind(value, out);
            }
            Value::Bytes(b) => out.sql.push_str(&dialect.encode_bytes(b)),
            Value::Json(json) => out.sql.push_str(&dialect.encode_string(&json.to_string())),
            Value::Opaque(_) => self.bind(value, out),
            Value::Array(_) => self.write_value(value, out)?,
        }
        Ok(())
    }
}

/// Fold `args` into `query` as literals for the given dialect.
///
/// Byte payloads are encoded too, so the result needs no bound values.
/// Opaque values have no literal form and fail with `NotSupported`.
pub fn interpolate_for_dialect(query: &str, args: impl IntoArgs, dialect: Dialect) -> Result<String> {
    let args = args.into_args();
    let mut out = Statement::default();
    Interpolator::new(dialect)
        .mode(Mode::Literal)
        .ignore_binary(false)
        .write_sql(query, &args, &mut out)?;
    if let Some(value) = out.values.first() {
        return Err(Error::not_supported(format!(
            "{} value without a literal form",
            value.type_name()
        )));
    }
    Ok(out.sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::condition::{eq, gt};
    use crate::{expr, ident, select, update, Opaque};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn literal(dialect: Dialect) -> Interpolator {
        Interpolator::new(dialect).mode(Mode::Literal)
    }

    #[test]
    fn test_default_options() {
        let options = InterpolateOptions::default();
        assert_eq!(options.mode, Mode::Literal);
        assert!(options.ignore_binary);

        let parsed: InterpolateOptions = serde_json::from_str(r#"{"mode":"placeholders"}"#).unwrap();
        assert_eq!(parsed.mode, Mode::Placeholders);
        assert!(parsed.ignore_binary);
    }

    #[test]
    fn test_literal_alias_query() {
        let query = select((ident("t1.a"), ident("t2.b").as_alias("t2__b"), "c AS t2__c"))
            .from(ident("table1").as_alias("t1"))
            .left_join(ident("table2").as_alias("t2"), "t1.id = t2.id");

        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT `t1`.`a` AS t1__a, `t2`.`b` AS `t2__b`, c AS t2__c FROM `table1` AS `t1` LEFT JOIN `table2` AS `t2` ON t1.id = t2.id"
        );
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_literal_values() {
        let t = NaiveDate::from_ymd_opt(2006, 1, 2)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        let query = expr(
            "SELECT ?, ?, ?, ?, ?, ?, ?",
            (Value::Null, true, 42, -1.5, "it's", t, u64::MAX),
        );

        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(
            stmt.sql,
            r"SELECT NULL, 1, 42, -1.5, 'it\'s', '2006-01-02 15:04:05.000000', 18446744073709551615"
        );

        let stmt = literal(Dialect::PostgreSql).interpolate(&query).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT NULL, TRUE, 42, -1.5, 'it''s', '2006-01-02 15:04:05.000000', 18446744073709551615"
        );
    }

    #[test]
    fn test_literal_arrays() {
        let query = expr("a IN ?", (vec![1i64, 2, 3],));
        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(stmt.sql, "a IN (1,2,3)");

        let query = expr("a IN ?", (Vec::<i64>::new(),));
        assert!(matches!(
            literal(Dialect::MySql).interpolate(&query),
            Err(Error::InvalidSliceLength { .. })
        ));
    }

    #[test]
    fn test_binary_passthrough() {
        let query = expr("INSERT INTO t (b) VALUES (?)", (vec![0xde_u8, 0xad],));

        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO t (b) VALUES (?)");
        assert_eq!(stmt.values, vec![Value::Bytes(vec![0xde, 0xad])]);

        let stmt = literal(Dialect::PostgreSql).interpolate(&query).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO t (b) VALUES ($1)");

        let stmt = literal(Dialect::MySql)
            .ignore_binary(false)
            .interpolate(&query)
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO t (b) VALUES (0xdead)");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_opaque_is_always_bound() {
        let query = expr("x = ?", (Value::Opaque(Opaque::new(7u8)),));
        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(stmt.sql, "x = ?");
        assert_eq!(stmt.values.len(), 1);
    }

    #[test]
    fn test_non_finite_float() {
        let query = expr("x = ?", (f64::NAN,));
        assert!(matches!(
            literal(Dialect::MySql).interpolate(&query),
            Err(Error::NotSupported { .. })
        ));
    }

    #[test]
    fn test_placeholder_numbering_across_subqueries() {
        let query = select("*")
            .from("t")
            .where_(eq("a", 1))
            .where_(eq("b", select("id").from("u").where_(gt("c", 2))))
            .where_(eq("d", vec![3i64, 4]));

        let stmt = query.to_sql(Dialect::PostgreSql).unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT * FROM "t" WHERE ("a" = $1) AND ("b" = (SELECT id FROM "u" WHERE ("c" > $2))) AND ("d" IN ($3,$4))"#
        );
        assert_eq!(
            stmt.values,
            vec![Value::I32(1), Value::I32(2), Value::I64(3), Value::I64(4)]
        );

        let stmt = query.to_sql(Dialect::MySql).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `t` WHERE (`a` = ?) AND (`b` = (SELECT id FROM `u` WHERE (`c` > ?))) AND (`d` IN (?,?))"
        );
    }

    #[test]
    fn test_nested_expr_is_not_parenthesized() {
        let query = update("t").set("n", expr("n + ?", (1,))).where_(eq("id", 2));
        let stmt = literal(Dialect::MySql).interpolate(&query).unwrap();
        assert_eq!(stmt.sql, "UPDATE `t` SET `n` = n + 1 WHERE (`id` = 2)");
    }

    #[test]
    fn test_interpolate_for_dialect() {
        let sql = interpolate_for_dialect(
            "SELECT * FROM t WHERE a = ? AND b = ?",
            ("x'y", vec![0x01_u8]),
            Dialect::PostgreSql,
        )
        .unwrap();
        assert_eq!(sql, r"SELECT * FROM t WHERE a = 'x''y' AND b = E'\\x01'");

        let err = interpolate_for_dialect("a = ? AND b = ?", (1,), Dialect::MySql).unwrap_err();
        assert!(matches!(
            err,
            Error::PlaceholderCount {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_interpolate_for_dialect_rejects_opaque() {
        let err = interpolate_for_dialect(
            "x = ?",
            (Value::Opaque(Opaque::new(7u8)),),
            Dialect::MySql,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotSupported { .. }));
    }
}
