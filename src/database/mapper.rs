//! Declarative struct-to-column mapping.
//!
//! Entities describe their persisted shape through [`Mapped::fields`]; the
//! functions here turn that description into ordered column/value lists that
//! the statement builder consumes.

use chrono::{DateTime, Utc};

/// Reserved column carrying the windowed total of a counted SELECT.
pub const COUNT_COLUMN: &str = "_count";

/// A bindable value for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    NullableTimestamp(Option<DateTime<Utc>>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        SqlValue::NullableTimestamp(v)
    }
}

/// One entry of an entity's persisted shape.
pub enum Field<'a> {
    /// A named column and its current value.
    Column(&'static str, SqlValue),
    /// A struct member that is never persisted.
    Skip(&'static str),
    /// A sub-entity whose columns are flattened into the parent.
    Embedded(&'a dyn Mapped),
}

impl<'a> Field<'a> {
    pub fn column(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Field::Column(name, value.into())
    }
}

/// Implemented by every persisted struct. Declaration order is column order.
pub trait Mapped {
    fn fields(&self) -> Vec<Field<'_>>;
}

/// Filters applied while mapping. Each setter accumulates.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    select: Vec<String>,
    ignore: Vec<String>,
    auto_timestamp: Vec<String>,
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict output to these columns (auto-timestamp columns still pass).
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Drop these columns no matter what else is configured.
    pub fn ignore<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Emit these columns with the current UTC time instead of the entity value.
    pub fn auto_timestamp<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auto_timestamp.extend(columns.into_iter().map(Into::into));
        self
    }

    fn is_ignored(&self, column: &str) -> bool {
        self.ignore.iter().any(|c| c == column)
    }

    fn is_auto_timestamp(&self, column: &str) -> bool {
        self.auto_timestamp.iter().any(|c| c == column)
    }

    fn is_selected(&self, column: &str) -> bool {
        self.select.is_empty() || self.select.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column: &'static str,
    pub value: SqlValue,
}

/// Flatten an entity into ordered column/value pairs.
///
/// Precedence per column: skip, then ignore, then auto-timestamp, then select.
/// A column name produced twice by embedding keeps its first occurrence.
pub fn map_columns(entity: &dyn Mapped, options: &MapOptions) -> Vec<ColumnValue> {
    let now = Utc::now();
    let mut out = Vec::new();
    collect(entity, options, now, &mut out);
    out
}

fn collect(entity: &dyn Mapped, options: &MapOptions, now: DateTime<Utc>, out: &mut Vec<ColumnValue>) {
    for field in entity.fields() {
        match field {
            Field::Skip(_) => {}
            Field::Embedded(inner) => collect(inner, options, now, out),
            Field::Column(column, value) => {
                if options.is_ignored(column) || out.iter().any(|c| c.column == column) {
                    continue;
                }
                if options.is_auto_timestamp(column) {
                    out.push(ColumnValue { column, value: SqlValue::Timestamp(now) });
                } else if options.is_selected(column) {
                    out.push(ColumnValue { column, value });
                }
            }
        }
    }
}

/// Same mapping split into parallel column and value lists.
pub fn columns_and_values(entity: &dyn Mapped, options: &MapOptions) -> (Vec<&'static str>, Vec<SqlValue>) {
    map_columns(entity, options)
        .into_iter()
        .map(|c| (c.column, c.value))
        .unzip()
}

/// Column names only, for SELECT lists.
pub fn column_names(entity: &dyn Mapped, options: &MapOptions) -> Vec<&'static str> {
    map_columns(entity, options).into_iter().map(|c| c.column).collect()
}
