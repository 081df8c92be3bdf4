//! Statement execution
//!
//! A [`Session`] renders builders with its dialect and interpolation options
//! and hands the result to a [`Runner`], the driver boundary. [`SqlxRunner`]
//! runs statements on a `sqlx::AnyPool`.

use crate::interpolate::{InterpolateOptions, Interpolator, Statement};
use crate::load::{Load, Row};
use crate::record::{set_id, Record};
use crate::{Builder, DeleteBuilder, Dialect, Error, InsertBuilder, Result, SelectBuilder, UpdateBuilder, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Key generated by the driver, when it reports one (MySQL)
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    /// Store the generated key in the record's `id` column.
    ///
    /// Returns `false` if there is no generated key or no `id` column.
    pub fn assign_id<R: Record + ?Sized>(&self, record: &mut R) -> Result<bool> {
        match self.last_insert_id {
            Some(id) => set_id(record, id),
            None => Ok(false),
        }
    }
}

/// Executes final SQL against a database.
pub trait Runner: Send {
    /// Run a statement that returns no rows
    fn execute(
        &mut self,
        sql: &str,
        values: &[Value],
    ) -> impl Future<Output = Result<ExecResult>> + Send;

    /// Run a statement and collect its rows
    fn query(&mut self, sql: &str, values: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send;
}

/// A runner paired with the dialect and options its statements are
/// rendered with.
#[derive(Debug)]
pub struct Session<R> {
    runner: R,
    dialect: Dialect,
    options: InterpolateOptions,
}

impl<R: Runner> Session<R> {
    pub fn new(runner: R, dialect: Dialect) -> Self {
        Self {
            runner,
            dialect,
            options: InterpolateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InterpolateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> InterpolateOptions {
        self.options
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Render a builder the way this session would run it
    pub fn render<B: Builder + ?Sized>(&self, builder: &B) -> Result<Statement> {
        Interpolator::with_options(self.dialect, self.options)
            .interpolate(builder)
            .inspect_err(|err| error!(stage = "interpolate", error = %err, "failed to render statement"))
    }

    /// Run an INSERT, UPDATE or DELETE
    pub async fn exec<B: Builder + ?Sized>(&mut self, builder: &B) -> Result<ExecResult> {
        let stmt = self.render(builder)?;
        let started = Instant::now();

        let result = self
            .runner
            .execute(&stmt.sql, &stmt.values)
            .await
            .inspect_err(|err| error!(stage = "exec", sql = %stmt.sql, error = %err, "statement failed"))?;

        debug!(
            sql = %stmt.sql,
            values = stmt.values.len(),
            rows_affected = result.rows_affected,
            elapsed = ?started.elapsed(),
            "exec"
        );
        Ok(result)
    }

    /// Run a query and scan its rows into `dest`, returning the number of
    /// rows loaded
    pub async fn load<B, D>(&mut self, builder: &B, dest: &mut D) -> Result<usize>
    where
        B: Builder + ?Sized,
        D: Load + ?Sized,
    {
        let stmt = self.render(builder)?;
        let started = Instant::now();

        let rows = self
            .runner
            .query(&stmt.sql, &stmt.values)
            .await
            .inspect_err(|err| error!(stage = "query", sql = %stmt.sql, error = %err, "query failed"))?;
        let fetched = rows.len();

        let count = dest
            .load(rows)
            .inspect_err(|err| error!(stage = "scan", sql = %stmt.sql, error = %err, "failed to load rows"))?;

        debug!(
            sql = %stmt.sql,
            values = stmt.values.len(),
            rows = fetched,
            elapsed = ?started.elapsed(),
            "load"
        );
        Ok(count)
    }
}

/// Open a pooled connection and a session for `driver`.
///
/// `driver` is `mysql`, `postgres` or `postgresql`; the matching sqlx
/// feature must be enabled.
pub async fn open(driver: &str, dsn: &str) -> Result<Session<SqlxRunner>> {
    let dialect = Dialect::from_driver(driver)?;
    sqlx::any::install_default_drivers();
    let pool = sqlx::AnyPool::connect(dsn).await?;
    info!(driver, "connected");
    Ok(Session::new(SqlxRunner::new(pool), dialect))
}

/// [`Runner`] backed by a `sqlx::AnyPool`
#[derive(Debug, Clone)]
pub struct SqlxRunner {
    pool: sqlx::AnyPool,
}

impl SqlxRunner {
    pub fn new(pool: sqlx::AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::AnyPool {
        &self.pool
    }
}

impl Runner for SqlxRunner {
    async fn execute(&mut self, sql: &str, values: &[Value]) -> Result<ExecResult> {
        let query = bind_values(sqlx::query(sql), values)?;
        let result = query.execute(&self.pool).await?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    async fn query(&mut self, sql: &str, values: &[Value]) -> Result<Vec<Row>> {
        let query = bind_values(sqlx::query(sql), values)?;
        let rows = query.fetch_all(&self.pool).await?;
        decode_rows(&rows)
    }
}

type AnyQuery<'q> = sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>;

fn bind_values<'q>(mut query: AnyQuery<'q>, values: &[Value]) -> Result<AnyQuery<'q>> {
    for value in values {
        query = bind_value(query, value)?;
    }
    Ok(query)
}

fn bind_value<'q>(query: AnyQuery<'q>, value: &Value) -> Result<AnyQuery<'q>> {
    let query = match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::I32(n) => query.bind(*n),
        Value::I64(n) => query.bind(*n),
        Value::U64(n) => {
            let n = i64::try_from(*n)
                .map_err(|_| Error::not_supported(format!("binding u64 value {n} above i64::MAX")))?;
            query.bind(n)
        }
        Value::F32(f) => query.bind(*f),
        Value::F64(f) => query.bind(*f),
        Value::String(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Time(t) => query.bind(t.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        Value::Json(json) => query.bind(json.to_string()),
        Value::Array(_) | Value::Opaque(_) => {
            return Err(Error::not_supported(format!(
                "binding {} values through sqlx::Any",
                value.type_name()
            )))
        }
    };
    Ok(query)
}

fn decode_rows(rows: &[sqlx::any::AnyRow]) -> Result<Vec<Row>> {
    use sqlx::{Column, Row as _};

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    rows.iter()
        .map(|row| Ok(Row::new(Arc::clone(&columns), decode_row(row)?)))
        .collect()
}

/// Column types reported by `sqlx::Any`, keyed by their type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Null,
    Bool,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Text,
    Blob,
}

impl ColumnType {
    fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "NULL" => ColumnType::Null,
            "BOOLEAN" => ColumnType::Bool,
            "SMALLINT" => ColumnType::SmallInt,
            "INTEGER" => ColumnType::Integer,
            "BIGINT" => ColumnType::BigInt,
            "REAL" => ColumnType::Real,
            "DOUBLE" => ColumnType::Double,
            "TEXT" => ColumnType::Text,
            "BLOB" => ColumnType::Blob,
            _ => return None,
        };
        Some(ty)
    }
}

fn decode_row(row: &sqlx::any::AnyRow) -> Result<Vec<Value>> {
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};

    let mut values = Vec::with_capacity(row.columns().len());
    for (i, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(i)?.is_null() {
            values.push(Value::Null);
            continue;
        }
        let type_name = column.type_info().name();
        let Some(ty) = ColumnType::from_name(type_name) else {
            return Err(Error::not_supported(format!(
                "column `{}` of type {type_name}",
                column.name()
            )));
        };
        let value = match ty {
            ColumnType::Null => Value::Null,
            ColumnType::Bool => Value::Bool(row.try_get(i)?),
            ColumnType::SmallInt => Value::I32(i32::from(row.try_get::<i16, _>(i)?)),
            ColumnType::Integer => Value::I32(row.try_get(i)?),
            ColumnType::BigInt => Value::I64(row.try_get(i)?),
            ColumnType::Real => Value::F32(row.try_get(i)?),
            ColumnType::Double => Value::F64(row.try_get(i)?),
            ColumnType::Text => Value::String(row.try_get(i)?),
            ColumnType::Blob => Value::Bytes(row.try_get(i)?),
        };
        values.push(value);
    }
    Ok(values)
}

/// Extension trait to run a SELECT through a session
pub trait ExecutableQuery: Builder {
    /// Run the query and scan its rows into `dest`
    fn load<R, D>(&self, session: &mut Session<R>, dest: &mut D) -> impl Future<Output = Result<usize>> + Send
    where
        R: Runner,
        D: Load + Send + ?Sized;
}

impl ExecutableQuery for SelectBuilder {
    async fn load<R, D>(&self, session: &mut Session<R>, dest: &mut D) -> Result<usize>
    where
        R: Runner,
        D: Load + Send + ?Sized,
    {
        session.load(self, dest).await
    }
}

/// Extension trait to run INSERT, UPDATE and DELETE through a session
pub trait ExecutableModification: Builder {
    /// Run the statement
    fn exec<R: Runner>(&self, session: &mut Session<R>) -> impl Future<Output = Result<ExecResult>> + Send;
}

macro_rules! impl_executable_modification {
    ($($ty:ty),*) => {
        $(
            impl ExecutableModification for $ty {
                async fn exec<R: Runner>(&self, session: &mut Session<R>) -> Result<ExecResult> {
                    session.exec(self).await
                }
            }
        )*
    };
}

impl_executable_modification!(InsertBuilder, UpdateBuilder, DeleteBuilder);
