//! Result rows and the destinations they are loaded into

use crate::record::{struct_map_mut, Record};
use crate::{Error, FromValue, Null, Result, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// One result row. Column names are shared by every row of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named `column`
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Convert the value of `column`
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .cloned()
            .ok_or_else(|| Error::invalid_pointer(format!("no column `{column}` in row")))?;
        T::from_value(value).map_err(|err| err.in_column(column))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Build a value from a single row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

/// A destination rows are scanned into.
///
/// Single destinations take the first row and report 0 or 1; `Vec<T>`
/// appends one element per row. No rows is not an error.
pub trait Load {
    fn load(&mut self, rows: Vec<Row>) -> Result<usize>;
}

fn single_value(row: &Row) -> Result<Value> {
    match row.values() {
        [value] => Ok(value.clone()),
        values => Err(Error::invalid_pointer(format!(
            "scalar destination needs exactly one column, row has {}",
            values.len()
        ))),
    }
}

fn scan_scalar<T: FromValue>(row: &Row) -> Result<T> {
    let value = single_value(row)?;
    T::from_value(value).map_err(|err| match row.columns().first() {
        Some(column) => err.in_column(column.as_str()),
        None => err,
    })
}

fn load_first<T: FromRow>(dest: &mut T, rows: Vec<Row>) -> Result<usize> {
    match rows.first() {
        Some(row) => {
            *dest = T::from_row(row)?;
            Ok(1)
        }
        None => Ok(0),
    }
}

macro_rules! impl_scalar_row {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &Row) -> Result<Self> {
                    scan_scalar(row)
                }
            }

            impl Load for $ty {
                fn load(&mut self, rows: Vec<Row>) -> Result<usize> {
                    load_first(self, rows)
                }
            }
        )*
    };
}

impl_scalar_row!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    NaiveDateTime,
    NaiveDate,
    DateTime<Utc>,
    serde_json::Value,
    Value,
);

// Loaded as a list of blobs when the destination is `Vec<Vec<u8>>`; a single
// blob loads through `Option<Vec<u8>>` or `Null<Vec<u8>>`.
impl FromRow for Vec<u8> {
    fn from_row(row: &Row) -> Result<Self> {
        scan_scalar(row)
    }
}

impl<T: FromValue> FromRow for Option<T> {
    fn from_row(row: &Row) -> Result<Self> {
        scan_scalar(row)
    }
}

impl<T: FromValue> Load for Option<T> {
    fn load(&mut self, rows: Vec<Row>) -> Result<usize> {
        load_first(self, rows)
    }
}

impl<T: FromValue> FromRow for Null<T> {
    fn from_row(row: &Row) -> Result<Self> {
        scan_scalar(row)
    }
}

impl<T: FromValue> Load for Null<T> {
    fn load(&mut self, rows: Vec<Row>) -> Result<usize> {
        load_first(self, rows)
    }
}

impl<T: FromRow> Load for Vec<T> {
    fn load(&mut self, rows: Vec<Row>) -> Result<usize> {
        let count = rows.len();
        self.reserve(count);
        for row in &rows {
            self.push(T::from_row(row)?);
        }
        Ok(count)
    }
}

/// Scan the first row into a record.
pub fn load_record<R: Record + ?Sized>(record: &mut R, rows: Vec<Row>) -> Result<usize> {
    match rows.first() {
        Some(row) => {
            scan_record(record, row)?;
            Ok(1)
        }
        None => Ok(0),
    }
}

/// Assign each column to the record field it maps to.
///
/// Joined columns match by alias (`t1__col`); columns with no matching field
/// are skipped. Plain fields claim their columns before optional embeds do.
pub fn scan_record<R: Record + ?Sized>(record: &mut R, row: &Row) -> Result<()> {
    scan_unclaimed(record, row, &HashSet::new())
}

fn scan_unclaimed<R: Record + ?Sized>(record: &mut R, row: &Row, claimed: &HashSet<String>) -> Result<()> {
    let mut claimed = claimed.clone();
    {
        let mut targets = struct_map_mut(record, false);
        targets.retain(|column, _| !claimed.contains(column));
        for (column, value) in row.columns().iter().zip(row.values()) {
            if let Some(target) = targets.get_mut(column.as_str()) {
                target
                    .scan(value.clone())
                    .map_err(|err| err.in_column(column.as_str()))?;
            }
        }
        claimed.extend(targets.into_keys());
    }

    let mut embeds = Vec::new();
    record.describe_embeds(&mut embeds);
    for embed in embeds {
        embed.scan_embed(row, &claimed)?;
    }
    Ok(())
}

/// An optional embedded record.
///
/// It is filled only when one of its own columns is non-NULL. If all of them
/// are NULL (an unmatched LEFT JOIN) it becomes `None`; if the row has none of
/// them it is left as it was.
pub trait ScanEmbed {
    fn scan_embed(&mut self, row: &Row, claimed: &HashSet<String>) -> Result<()>;
}

impl<T: Record + Default> ScanEmbed for Option<T> {
    fn scan_embed(&mut self, row: &Row, claimed: &HashSet<String>) -> Result<()> {
        let mut shape = T::default();
        let columns: HashSet<String> = struct_map_mut(&mut shape, false).into_keys().collect();

        let mut present = row
            .columns()
            .iter()
            .zip(row.values())
            .filter(|(column, _)| columns.contains(column.as_str()) && !claimed.contains(column.as_str()))
            .map(|(_, value)| value)
            .peekable();
        if present.peek().is_none() {
            return Ok(());
        }
        if present.all(Value::is_null) {
            *self = None;
            return Ok(());
        }

        let mut inner = self.take().unwrap_or_default();
        scan_unclaimed(&mut inner, row, claimed)?;
        *self = Some(inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NullString, Record};

    #[derive(Debug, Default, PartialEq, Record)]
    struct Person {
        #[db = "p.id"]
        id: i64,
        #[db = "p.name"]
        name: String,
        #[db = "p.email"]
        email: NullString,
    }

    #[derive(Debug, Default, PartialEq, Record)]
    struct Role {
        #[db = "r.person_id"]
        person_id: i64,
        #[db = "r.title"]
        title: String,
    }

    #[derive(Debug, Default, PartialEq, Record)]
    struct PersonWithRole {
        #[db(embed)]
        person: Person,
        #[db(embed)]
        role: Option<Role>,
    }

    fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> Vec<Row> {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        data.into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }

    fn person_rows() -> Vec<Row> {
        rows(
            &["p__id", "p__name", "p__email", "r__person_id", "r__title", "extra"],
            vec![
                vec![
                    Value::I64(1),
                    Value::String("Ann".into()),
                    Value::Null,
                    Value::I64(1),
                    Value::String("admin".into()),
                    Value::I32(0),
                ],
                vec![
                    Value::I64(2),
                    Value::String("Bob".into()),
                    Value::String("bob@example.com".into()),
                    Value::I64(2),
                    Value::String("dev".into()),
                    Value::I32(0),
                ],
            ],
        )
    }

    #[test]
    fn test_load_joined_struct() {
        let mut dest = PersonWithRole::default();
        assert_eq!(dest.load(person_rows()).unwrap(), 1);
        assert_eq!(dest.person.id, 1);
        assert_eq!(dest.person.name, "Ann");
        assert!(!dest.person.email.valid());
        assert_eq!(
            dest.role,
            Some(Role {
                person_id: 1,
                title: "admin".into()
            })
        );
    }

    #[test]
    fn test_unmatched_left_join_leaves_embed_empty() {
        let data = rows(
            &["p__id", "p__name", "p__email", "r__person_id", "r__title"],
            vec![vec![
                Value::I64(3),
                Value::String("Cy".into()),
                Value::Null,
                Value::Null,
                Value::Null,
            ]],
        );
        let mut dest = PersonWithRole {
            role: Some(Role::default()),
            ..PersonWithRole::default()
        };
        assert_eq!(dest.load(data).unwrap(), 1);
        assert_eq!(dest.person.id, 3);
        assert_eq!(dest.role, None);
    }

    #[test]
    fn test_embed_without_columns_is_untouched() {
        let data = rows(&["p__id"], vec![vec![Value::I64(4)]]);

        let mut dest = PersonWithRole::default();
        dest.load(data.clone()).unwrap();
        assert_eq!(dest.role, None);

        let existing = Role {
            person_id: 9,
            title: "ops".into(),
        };
        let mut dest = PersonWithRole {
            role: Some(existing),
            ..PersonWithRole::default()
        };
        dest.load(data).unwrap();
        assert_eq!(dest.role.map(|r| r.person_id), Some(9));
    }

    #[test]
    fn test_partially_null_embed_is_scanned() {
        let data = rows(
            &["r__person_id", "r__title"],
            vec![vec![Value::I64(5), Value::Null]],
        );
        let mut dest = PersonWithRole::default();
        let err = dest.load(data).unwrap_err();
        match err {
            Error::Scan { column, .. } => assert_eq!(column, "r__title"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_vec_of_structs() {
        let mut dest: Vec<PersonWithRole> = Vec::new();
        assert_eq!(dest.load(person_rows()).unwrap(), 2);
        assert_eq!(dest[1].person.name, "Bob");
        assert_eq!(dest[1].person.email, NullString::new("bob@example.com".into()));
        assert_eq!(dest[1].role.as_ref().map(|r| r.title.as_str()), Some("dev"));
    }

    #[test]
    fn test_zero_rows_is_not_an_error() {
        let mut person = Person::default();
        assert_eq!(person.load(Vec::new()).unwrap(), 0);
        assert_eq!(person, Person::default());

        let mut ids: Vec<i64> = Vec::new();
        assert_eq!(ids.load(Vec::new()).unwrap(), 0);

        let mut count = 0i64;
        assert_eq!(count.load(Vec::new()).unwrap(), 0);
    }

    #[test]
    fn test_load_scalars() {
        let mut count = 0i64;
        let n = count
            .load(rows(&["count(*)"], vec![vec![Value::I64(3)]]))
            .unwrap();
        assert_eq!((n, count), (1, 3));

        let mut names: Vec<String> = Vec::new();
        names
            .load(rows(
                &["name"],
                vec![vec![Value::String("a".into())], vec![Value::String("b".into())]],
            ))
            .unwrap();
        assert_eq!(names, vec!["a", "b"]);

        let mut email = NullString::new("stale".into());
        email
            .load(rows(&["email"], vec![vec![Value::Null]]))
            .unwrap();
        assert!(!email.valid());

        let mut maybe: Option<i32> = Some(1);
        maybe.load(rows(&["n"], vec![vec![Value::Null]])).unwrap();
        assert_eq!(maybe, None);
    }

    #[test]
    fn test_scalar_needs_one_column() {
        let mut id = 0i64;
        let err = id
            .load(rows(&["a", "b"], vec![vec![Value::I64(1), Value::I64(2)]]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPointer { .. }));
    }

    #[test]
    fn test_scan_error_names_column() {
        let mut person = Person::default();
        let err = person
            .load(rows(&["p__id"], vec![vec![Value::String("nope".into())]]))
            .unwrap_err();
        match err {
            Error::Scan { column, .. } => assert_eq!(column, "p__id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_accessors() {
        let row = rows(&["id", "name"], vec![vec![Value::I64(7), Value::String("x".into())]])
            .remove(0);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some(&Value::String("x".into())));
        assert_eq!(row.try_get::<i64>("id").unwrap(), 7);
        assert!(row.try_get::<i64>("missing").is_err());
    }

    #[test]
    fn test_from_row_for_derived_record() {
        let row = person_rows().remove(1);
        let person = Person::from_row(&row).unwrap();
        assert_eq!(person.id, 2);
        assert_eq!(person.name, "Bob");
    }
}
