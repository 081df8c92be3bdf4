//! Error types for fjord

use thiserror::Error;

/// The main error type for fjord operations
#[derive(Error, Debug)]
pub enum Error {
    /// Driver name or value kind the engine cannot handle
    #[error("{what} is not supported")]
    NotSupported { what: String },

    /// INSERT/UPDATE/DELETE rendered without a target table
    #[error("{statement}: table not specified")]
    TableNotSpecified { statement: &'static str },

    /// Statement rendered without the columns it needs
    #[error("{statement}: column not specified")]
    ColumnNotSpecified { statement: &'static str },

    /// Number of `?` markers differs from the number of arguments
    #[error("wrong placeholder count in `{sql}`: expected {expected} argument(s), got {actual}")]
    PlaceholderCount {
        sql: String,
        expected: usize,
        actual: usize,
    },

    /// An empty list was given where at least one element is required
    #[error("invalid slice length: {context}")]
    InvalidSliceLength { context: &'static str },

    /// A VALUES row does not match the declared column list
    #[error("row has {actual} value(s) but {expected} column(s) were declared")]
    ValueCountMismatch { expected: usize, actual: usize },

    /// Destination cannot receive the row shape it was given
    #[error("invalid destination: {reason}")]
    InvalidPointer { reason: String },

    /// Value of the wrong kind where a timestamp is expected
    #[error("can't convert {found} to time")]
    CantConvertToTime { found: &'static str },

    /// Text that does not parse as a timestamp
    #[error("invalid time string: {input:?}")]
    InvalidTimestring { input: String },

    /// Generic value conversion failure
    #[error("cannot convert {found} into {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },

    /// A conversion failure while scanning a named column
    #[error("column `{column}`: {source}")]
    Scan {
        column: String,
        #[source]
        source: Box<Error>,
    },

    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for fjord operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new not-supported error
    pub fn not_supported(what: impl Into<String>) -> Self {
        Self::NotSupported { what: what.into() }
    }

    /// Create a new placeholder count error
    pub fn placeholder_count(sql: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::PlaceholderCount {
            sql: sql.into(),
            expected,
            actual,
        }
    }

    /// Create a new conversion error
    pub fn conversion(expected: &'static str, found: &'static str) -> Self {
        Self::Conversion { expected, found }
    }

    /// Create a new invalid destination error
    pub fn invalid_pointer(reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            reason: reason.into(),
        }
    }

    /// Attach the column being scanned to a conversion error
    pub fn in_column(self, column: impl Into<String>) -> Self {
        Self::Scan {
            column: column.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_supported_error() {
        let err = Error::not_supported("driver `sqlite3`");
        assert!(matches!(err, Error::NotSupported { .. }));
        assert_eq!(err.to_string(), "driver `sqlite3` is not supported");
    }

    #[test]
    fn test_placeholder_count_error() {
        let err = Error::placeholder_count("a = ? AND b = ?", 2, 1);
        assert!(matches!(
            err,
            Error::PlaceholderCount {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "wrong placeholder count in `a = ? AND b = ?`: expected 2 argument(s), got 1"
        );
    }

    #[test]
    fn test_structural_errors() {
        let err = Error::TableNotSpecified { statement: "INSERT" };
        assert_eq!(err.to_string(), "INSERT: table not specified");

        let err = Error::ColumnNotSpecified { statement: "SELECT" };
        assert_eq!(err.to_string(), "SELECT: column not specified");
    }

    #[test]
    fn test_scan_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::conversion("i64", "TEXT").in_column("age");
        assert_eq!(err.to_string(), "column `age`: cannot convert TEXT into i64");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("cannot convert TEXT into i64"));
    }
}
