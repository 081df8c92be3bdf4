//! Fjord - SQL statement builder and interpolation engine
//!
//! Statements are composed with fluent builders, rendered for a MySQL or
//! PostgreSQL [`Dialect`], and either keep driver placeholders or have their
//! values folded into the SQL text as escaped literals. Result rows are
//! scanned back into scalars, [`Null`] wrappers or `#[derive(Record)]`
//! structs.
//!
//! ```
//! use fjord::{select, eq, Builder, Dialect, Interpolator, Mode};
//!
//! let query = select(("id", "name")).from("users").where_(eq("id", 7));
//!
//! let stmt = query.to_sql(Dialect::PostgreSql).unwrap();
//! assert_eq!(stmt.sql, r#"SELECT id, name FROM "users" WHERE ("id" = $1)"#);
//!
//! let stmt = Interpolator::new(Dialect::MySql)
//!     .mode(Mode::Literal)
//!     .interpolate(&query)
//!     .unwrap();
//! assert_eq!(stmt.sql, "SELECT id, name FROM `users` WHERE (`id` = 7)");
//! ```

// Lets the derive's `::fjord::` paths resolve inside this crate.
extern crate self as fjord;

pub mod buffer;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod interpolate;
pub mod load;
pub mod null;
pub mod operator;
pub mod record;
pub mod util;
pub mod value;

// Re-export main types
pub use buffer::{Arg, Buffer, IntoArg, IntoArgs};
pub use builder::condition::{and, eq, gt, gte, like, lt, lte, neq, not_like, or};
pub use builder::delete::{delete_by_sql, delete_from};
pub use builder::insert::{insert_by_sql, insert_into};
pub use builder::select::{select, select_by_sql};
pub use builder::update::{update, update_by_sql};
pub use builder::{
    expr, ident, Alias, Builder, Condition, DeleteBuilder, Expr, Ident, InsertBuilder, IntoCondition,
    JoinType, SelectBuilder, SortDirection, UpdateBuilder,
};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use executor::{open, ExecResult, ExecutableModification, ExecutableQuery, Runner, Session, SqlxRunner};
pub use interpolate::{interpolate_for_dialect, InterpolateOptions, Interpolator, Mode, Statement};
pub use load::{FromRow, Load, Row, ScanEmbed};
pub use null::{Null, NullBool, NullFloat64, NullInt64, NullString, NullTime};
pub use operator::{op, IntoOperator, Operator};
pub use record::Record;
pub use value::{FromValue, Opaque, ToValue, Value};

#[cfg(feature = "derive")]
pub use fjord_derive::Record;
