//! Record mapping: column names to struct fields
//!
//! A [`Record`] lists its fields in declaration order, each with its Rust
//! name, its optional `db` tag and a handle to read or overwrite it.
//! `#[derive(Record)]` writes the impl; the column names are resolved here
//! so derived and hand-written impls follow the same rules.

use crate::load::ScanEmbed;
use crate::util::column_name;
use crate::{FromValue, Result, ToValue, Value};
use std::collections::{HashMap, HashSet};

/// A readable field
pub struct Field<'a> {
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub value: &'a dyn ToValue,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, tag: Option<&'static str>, value: &'a dyn ToValue) -> Self {
        Self { name, tag, value }
    }
}

/// A writable field
pub struct FieldMut<'a> {
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub target: &'a mut dyn Scan,
}

impl<'a> FieldMut<'a> {
    pub fn new(name: &'static str, tag: Option<&'static str>, target: &'a mut dyn Scan) -> Self {
        Self { name, tag, target }
    }
}

/// Overwrite a destination with a column value.
pub trait Scan {
    fn scan(&mut self, value: Value) -> Result<()>;
}

impl<T: FromValue> Scan for T {
    fn scan(&mut self, value: Value) -> Result<()> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// A struct whose fields map onto columns.
///
/// Embedded records append their own fields in place, so the flattened list
/// is in declaration order, depth first. Optional embeds are readable through
/// `describe` when present, but are written only through `describe_embeds`
/// so that scanning decides whether they exist.
pub trait Record {
    fn describe<'a>(&'a self, fields: &mut Vec<Field<'a>>);

    fn describe_mut<'a>(&'a mut self, fields: &mut Vec<FieldMut<'a>>);

    /// Optional embedded records, in declaration order
    fn describe_embeds<'a>(&'a mut self, _embeds: &mut Vec<&'a mut dyn ScanEmbed>) {}
}

/// A missing embedded record contributes no columns.
impl<T: Record> Record for Option<T> {
    fn describe<'a>(&'a self, fields: &mut Vec<Field<'a>>) {
        if let Some(inner) = self {
            inner.describe(fields);
        }
    }

    fn describe_mut<'a>(&'a mut self, fields: &mut Vec<FieldMut<'a>>) {
        if let Some(inner) = self {
            inner.describe_mut(fields);
        }
    }

    fn describe_embeds<'a>(&'a mut self, embeds: &mut Vec<&'a mut dyn ScanEmbed>) {
        if let Some(inner) = self {
            inner.describe_embeds(embeds);
        }
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn describe<'a>(&'a self, fields: &mut Vec<Field<'a>>) {
        (**self).describe(fields);
    }

    fn describe_mut<'a>(&'a mut self, fields: &mut Vec<FieldMut<'a>>) {
        (**self).describe_mut(fields);
    }

    fn describe_embeds<'a>(&'a mut self, embeds: &mut Vec<&'a mut dyn ScanEmbed>) {
        (**self).describe_embeds(embeds);
    }
}

/// Column name to field value, in declaration order. The first field to
/// claim a column name wins.
pub fn struct_map<R: Record + ?Sized>(record: &R, ignore_prefix: bool) -> Vec<(String, &dyn ToValue)> {
    let mut fields = Vec::new();
    record.describe(&mut fields);

    let mut seen = HashSet::new();
    let mut map = Vec::with_capacity(fields.len());
    for field in fields {
        if let Some(column) = column_name(field.name, field.tag, ignore_prefix) {
            if seen.insert(column.clone()) {
                map.push((column, field.value));
            }
        }
    }
    map
}

/// Column name to writable field. The first field to claim a column name
/// wins.
pub fn struct_map_mut<R: Record + ?Sized>(
    record: &mut R,
    ignore_prefix: bool,
) -> HashMap<String, &mut dyn Scan> {
    let mut fields = Vec::new();
    record.describe_mut(&mut fields);

    let mut map = HashMap::with_capacity(fields.len());
    for field in fields {
        if let Some(column) = column_name(field.name, field.tag, ignore_prefix) {
            map.entry(column).or_insert(field.target);
        }
    }
    map
}

/// Owned `(column, value)` pairs for an INSERT row.
pub fn column_values<R: Record + ?Sized>(record: &R, ignore_prefix: bool) -> Vec<(String, Value)> {
    struct_map(record, ignore_prefix)
        .into_iter()
        .map(|(column, value)| (column, value.to_value()))
        .collect()
}

/// Store a driver-assigned key in the record's `id` column.
///
/// Returns `false` when the record has no `id` column. Optional embeds are
/// left untouched.
pub fn set_id<R: Record + ?Sized>(record: &mut R, id: i64) -> Result<bool> {
    let mut map = struct_map_mut(record, true);
    match map.get_mut("id") {
        Some(target) => {
            target
                .scan(Value::I64(id))
                .map_err(|err| err.in_column("id"))?;
            Ok(true)
        }
        None => Ok(false),
    }
}
