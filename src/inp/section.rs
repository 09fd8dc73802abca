//! Object section container
//!
//! [`SectionContainer`] holds the records of one object section in insertion
//! order, unique by [`Key`]. Putting a record whose key already exists replaces
//! the old one in place, so the section keeps its original ordering.

use crate::inp::coercion::Value;
use crate::inp::error::ValidationError;
use crate::inp::record::{Key, Record};
use crate::inp::schema::{RecordType, Schema, TypedSchema};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

pub const TABLE_HEADER_PREFIX: &str = ";;";

#[derive(Clone)]
pub struct SectionContainer {
    schema: Arc<dyn Schema>,
    records: IndexMap<Key, Box<dyn Record>>,
}

impl SectionContainer {
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        SectionContainer {
            schema,
            records: IndexMap::new(),
        }
    }

    /// Empty container for a typed record.
    pub fn of<T: RecordType>() -> Self {
        Self::new(TypedSchema::<T>::shared())
    }

    pub fn schema(&self) -> &Arc<dyn Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert or replace by key. Returns the replaced record.
    pub fn put(
        &mut self,
        record: Box<dyn Record>,
    ) -> Result<Option<Box<dyn Record>>, ValidationError> {
        if record.kind() != self.schema.kind() {
            return Err(ValidationError::SchemaMismatch {
                expected: self.schema.kind().to_string(),
                found: record.kind().to_string(),
            });
        }
        Ok(self.records.insert(record.key(), record))
    }

    /// [`SectionContainer::put`] for an unboxed record.
    pub fn insert<R: Record>(&mut self, record: R) -> Result<Option<Box<dyn Record>>, ValidationError> {
        self.put(Box::new(record))
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&dyn Record> {
        self.records.get(&key.into()).map(|record| record.as_ref())
    }

    /// Mutable access to a record. Changing identifier fields through this
    /// reference leaves the record filed under its old key; use
    /// [`SectionContainer::set_field`] for that.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Box<dyn Record>> {
        self.records.get_mut(&key.into())
    }

    pub fn get_as<T: Record>(&self, key: impl Into<Key>) -> Option<&T> {
        self.records.get(&key.into())?.as_any().downcast_ref::<T>()
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.records.contains_key(&key.into())
    }

    /// Set one field of a record, re-keying it in place when the field is part
    /// of its identifier.
    pub fn set_field(
        &mut self,
        key: impl Into<Key>,
        field: &str,
        value: Value,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        let Some((mut index, _, mut record)) = self.records.shift_remove_full(&key) else {
            return Err(ValidationError::UnknownKey(key.to_string()));
        };
        let result = record.set(field, value);
        let new_key = record.key();
        if new_key != key {
            if let Some((taken, _, _)) = self.records.shift_remove_full(&new_key) {
                tracing::warn!(old = %key, new = %new_key, "re-keyed record replaces an existing one");
                if taken < index {
                    index -= 1;
                }
            }
        }
        self.records.shift_insert(index.min(self.records.len()), new_key, record);
        result
    }

    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Box<dyn Record>> {
        self.records.shift_remove(&key.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Record> {
        self.records.values().map(|record| record.as_ref())
    }

    /// Records matching `predicate`, as a new container over the same schema.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&dyn Record) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|&(_, record)| predicate(record.as_ref()))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        SectionContainer {
            schema: Arc::clone(&self.schema),
            records,
        }
    }

    /// Records whose key is among `keys`.
    pub fn filter_keys<I, K>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let wanted: Vec<Key> = keys.into_iter().map(Into::into).collect();
        self.filter(|record| wanted.contains(&record.key()))
    }

    /// Records whose `field` renders to one of `values`.
    pub fn filter_by<I, S>(&self, field: &str, values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.schema.field_names().contains(&field) {
            return Err(ValidationError::UnknownField {
                record: "section",
                field: field.to_string(),
            });
        }
        let wanted: Vec<String> = values.into_iter().map(Into::into).collect();
        Ok(self.filter(|record| {
            record
                .get(field)
                .map(|value| wanted.contains(&value.render()))
                .unwrap_or(false)
        }))
    }

    /// Field-aligned view of the section.
    pub fn to_table(&self) -> Table {
        let columns: Vec<String> = self
            .schema
            .field_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let rows = self
            .iter()
            .map(|record| record.values().iter().map(Value::render).collect())
            .collect();
        Table { columns, rows }
    }
}

impl fmt::Debug for SectionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionContainer")
            .field("kind", &self.schema.kind())
            .field("records", &self.records)
            .finish()
    }
}

impl PartialEq for SectionContainer {
    fn eq(&self, other: &Self) -> bool {
        self.schema.kind() == other.schema.kind() && self.records.iter().eq(other.records.iter())
    }
}

struct RecordFields<'a>(&'a dyn Record);

impl Serialize for RecordFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.field_names().len()))?;
        for (name, value) in self.0.field_names().iter().zip(self.0.values()) {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl Serialize for SectionContainer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.records
                .iter()
                .map(|(key, record)| (key.to_string(), RecordFields(record.as_ref()))),
        )
    }
}

/// Rendered cells of a section, one column per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Whitespace-aligned text with a commented header row.
    pub fn render(&self, gap: usize) -> String {
        let mut header = self.columns.clone();
        if let Some(first) = header.first_mut() {
            first.insert_str(0, TABLE_HEADER_PREFIX);
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|column| {
                std::iter::once(&header)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        std::iter::once(&header)
            .chain(self.rows.iter())
            .map(|row| render_row(row, &widths, gap))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_row(cells: &[String], widths: &[usize], gap: usize) -> String {
    let separator = " ".repeat(gap);
    let mut line = String::new();
    for (column, cell) in cells.iter().enumerate() {
        if column > 0 {
            line.push_str(&separator);
        }
        let width = widths.get(column).copied().unwrap_or(0);
        line.push_str(&format!("{cell:<width$}"));
    }
    line.trim_end().to_string()
}
