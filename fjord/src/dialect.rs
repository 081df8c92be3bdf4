//! SQL dialects: identifier quoting, literal encoding and placeholders

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The database family a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB: backtick identifiers, `?` placeholders
    MySql,
    /// PostgreSQL: double-quoted identifiers, `$N` placeholders
    PostgreSql,
}

impl Dialect {
    /// Map a driver name to its dialect.
    pub fn from_driver(driver: &str) -> Result<Self> {
        match driver {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::PostgreSql),
            other => Err(Error::not_supported(format!("driver `{other}`"))),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::PostgreSql => '"',
        }
    }

    /// Quote an identifier, each dot-separated segment on its own.
    ///
    /// `t1.a` becomes `` `t1`.`a` `` on MySQL and `"t1"."a"` on PostgreSQL.
    pub fn quote_ident(self, name: &str) -> String {
        let quote = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push(quote);
            for c in part.chars() {
                if c == quote {
                    out.push(quote);
                }
                out.push(c);
            }
            out.push(quote);
        }
        out
    }

    /// Encode a string as a quoted SQL literal.
    pub fn encode_string(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        match self {
            Dialect::MySql => {
                for c in s.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x08' => out.push_str("\\b"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        '\x1a' => out.push_str("\\Z"),
                        '\\' => out.push_str("\\\\"),
                        c => out.push(c),
                    }
                }
            }
            Dialect::PostgreSql => {
                for c in s.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
            }
        }
        out.push('\'');
        out
    }

    pub fn encode_bool(self, b: bool) -> &'static str {
        match (self, b) {
            (Dialect::MySql, true) => "1",
            (Dialect::MySql, false) => "0",
            (Dialect::PostgreSql, true) => "TRUE",
            (Dialect::PostgreSql, false) => "FALSE",
        }
    }

    /// Timestamps are rendered as UTC with microsecond precision.
    pub fn encode_time(self, t: &NaiveDateTime) -> String {
        format!("'{}'", t.format(TIME_FORMAT))
    }

    pub fn encode_bytes(self, b: &[u8]) -> String {
        let mut out = String::with_capacity(b.len() * 2 + 6);
        match self {
            Dialect::MySql if b.is_empty() => out.push_str("''"),
            Dialect::MySql => out.push_str("0x"),
            Dialect::PostgreSql => out.push_str("E'\\\\x"),
        }
        for byte in b {
            let _ = write!(out, "{byte:02x}");
        }
        if self == Dialect::PostgreSql {
            out.push('\'');
        }
        out
    }

    /// Write the bind marker for the `index`-th (zero based) bound value.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::PostgreSql => format!("${}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_from_driver() {
        assert_eq!(Dialect::from_driver("mysql").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_driver("postgres").unwrap(), Dialect::PostgreSql);
        assert_eq!(Dialect::from_driver("postgresql").unwrap(), Dialect::PostgreSql);
        for driver in ["sqlite3", "pgx", "MySQL", ""] {
            assert!(
                matches!(Dialect::from_driver(driver), Err(Error::NotSupported { .. })),
                "{driver:?} should be rejected"
            );
        }
        let err = Dialect::from_driver("pgx").unwrap_err();
        assert!(err.to_string().contains("pgx"));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(Dialect::MySql.quote_ident("table"), "`table`");
        assert_eq!(Dialect::MySql.quote_ident("t1.a"), "`t1`.`a`");
        assert_eq!(Dialect::PostgreSql.quote_ident("t1.a"), "\"t1\".\"a\"");
        assert_eq!(Dialect::PostgreSql.quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_encode_string() {
        assert_eq!(
            Dialect::MySql.encode_string("it's a \"test\"\n\\"),
            r#"'it\'s a \"test\"\n\\'"#
        );
        assert_eq!(
            Dialect::PostgreSql.encode_string("it's \\ fine"),
            r"'it''s \ fine'"
        );
    }

    #[test]
    fn test_encode_literals() {
        assert_eq!(Dialect::MySql.encode_bool(true), "1");
        assert_eq!(Dialect::PostgreSql.encode_bool(false), "FALSE");

        let t = NaiveDate::from_ymd_opt(2006, 1, 2)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        assert_eq!(Dialect::MySql.encode_time(&t), "'2006-01-02 15:04:05.000000'");

        assert_eq!(Dialect::MySql.encode_bytes(&[0xde, 0xad, 0x01]), "0xdead01");
        assert_eq!(Dialect::PostgreSql.encode_bytes(&[0xbe, 0xef]), r"E'\\xbeef'");
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(Dialect::MySql.placeholder(0), "?");
        assert_eq!(Dialect::MySql.placeholder(7), "?");
        assert_eq!(Dialect::PostgreSql.placeholder(0), "$1");
        assert_eq!(Dialect::PostgreSql.placeholder(9), "$10");
    }
}
